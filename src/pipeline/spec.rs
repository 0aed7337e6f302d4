//! Pipeline specification data structures.
//!
//! A spec bundles the choices a user makes for one pass over a batch of files,
//! so the same pass can be saved as JSON and replayed from the command line.

use crate::cleaning::CleaningOptions;
use crate::export::ConversionRequest;
use crate::selection::ColumnSelection;
use crate::upload::FileFormat;
use anyhow::{Context as _, Result, ensure};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current pipeline spec version
pub const SPEC_VERSION: &str = "0.1";

/// Root pipeline specification structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSpec {
    /// Specification version for future migrations
    pub version: String,

    /// Human-readable pipeline name
    pub name: String,

    /// Cleaning operations to apply, de-duplication first
    #[serde(default)]
    pub cleaning: CleaningOptions,

    /// Columns to keep
    #[serde(default)]
    pub columns: ColumnSelection,

    /// Whether to produce chart data for each file
    #[serde(default)]
    pub visualize: bool,

    /// Export configuration
    #[serde(default)]
    pub output: OutputConfig,
}

impl PipelineSpec {
    /// Create a new pipeline spec with default settings
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: SPEC_VERSION.to_owned(),
            name: name.into(),
            cleaning: CleaningOptions::default(),
            columns: ColumnSelection::All,
            visualize: false,
            output: OutputConfig::default(),
        }
    }

    /// Load a pipeline spec from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline spec {}", path.display()))?;
        Self::from_json(&content)
    }

    /// Parse a pipeline spec from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: Self = serde_json::from_str(json).context("Failed to parse pipeline spec JSON")?;
        ensure!(
            spec.version == SPEC_VERSION,
            "Unsupported pipeline spec version '{}' (expected {SPEC_VERSION})",
            spec.version
        );
        Ok(spec)
    }

    /// Save pipeline spec to a JSON file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json()?;
        std::fs::write(path.as_ref(), json).context("Failed to write pipeline spec file")
    }

    /// Serialize pipeline spec to JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize pipeline spec")
    }

    pub fn conversion(&self) -> ConversionRequest {
        ConversionRequest::new(self.output.format)
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Target format (`csv` or `xlsx`, `excel` is accepted as an alias)
    pub format: FileFormat,

    /// Directory artifacts are written to by the command line
    pub dir: Option<PathBuf>,

    /// Replace existing artifacts
    pub overwrite: bool,
}
