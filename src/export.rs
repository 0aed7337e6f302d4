//! Turning the current table into a downloadable artifact.

use crate::error::{Result, ResultExt as _, SweeperError};
use crate::io;
use crate::upload::FileFormat;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Target of a conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionRequest {
    pub target_format: FileFormat,
}

impl ConversionRequest {
    pub fn new(target_format: FileFormat) -> Self {
        Self { target_format }
    }
}

/// Bytes ready to hand to the user, with their name and MIME type.
#[derive(Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ExportArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportArtifact")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ExportArtifact {
    /// Save the artifact under `dir`, creating the directory if needed.
    ///
    /// An existing file is only replaced when `overwrite` is set.
    pub fn write_to(&self, dir: &Path, overwrite: bool) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;

        let path = dir.join(&self.file_name);
        if path.exists() && !overwrite {
            return Err(SweeperError::export(
                &self.file_name,
                format!("{} already exists", path.display()),
            ));
        }

        std::fs::write(&path, &self.bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), bytes = self.bytes.len(), "Wrote artifact");
        Ok(path)
    }
}

/// Replace every non-alphanumeric character with `_`.
///
/// Letters and digits from any script are kept, so `Café 2` becomes `Café_2`.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// Name of the exported file: the sanitised source name plus the target
/// extension. The source extension is kept, sanitised, in the stem.
pub fn artifact_name(source_name: &str, format: FileFormat) -> String {
    format!("{}.{}", sanitize_name(source_name), format.extension())
}

/// Serialise `df` in the requested format.
pub fn export(
    source_name: &str,
    df: &DataFrame,
    request: &ConversionRequest,
) -> Result<ExportArtifact> {
    let format = request.target_format;
    let bytes = io::write_table(source_name, df, format)?;
    let artifact = ExportArtifact {
        file_name: artifact_name(source_name, format),
        mime_type: format.mime_type(),
        bytes,
    };

    tracing::info!(
        file = source_name,
        artifact = artifact.file_name.as_str(),
        format = format.label(),
        "Exported table"
    );
    Ok(artifact)
}
