//! State of a single uploaded file as it moves through the pipeline.

use super::session::FileId;
use crate::cleaning::{self, CleanReport, CleaningOptions};
use crate::error::{Result, SweeperError};
use crate::export::{self, ConversionRequest, ExportArtifact};
use crate::io;
use crate::selection::{self, ColumnSelection};
use crate::table;
use crate::upload::{FileFormat, UploadedFile};
use crate::visualize::{self, Chart};
use polars::prelude::DataFrame;
use serde::Serialize;

/// Last stage a file reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    Parsed,
    Cleaned,
    ColumnsSelected,
    Visualized,
    Exported,
}

/// One parsed file and the user's choices for it.
///
/// Cleaning replaces the base table; the column selection is a view applied
/// on top, so it never hides columns from de-duplication.
#[derive(Debug)]
pub struct FileContext {
    id: FileId,
    name: String,
    format: FileFormat,
    base: DataFrame,
    selection: ColumnSelection,
    stage: Stage,
}

impl FileContext {
    pub fn new(id: FileId, name: impl Into<String>, format: FileFormat, df: DataFrame) -> Self {
        let name = name.into();
        tracing::info!(
            file = name.as_str(),
            %id,
            rows = df.height(),
            columns = df.width(),
            "File parsed"
        );
        Self {
            id,
            name,
            format,
            base: df,
            selection: ColumnSelection::All,
            stage: Stage::Parsed,
        }
    }

    /// Detect and parse an upload.
    pub fn from_upload(id: FileId, upload: &UploadedFile) -> Result<Self> {
        let (format, df) = io::read_upload(upload)?;
        Ok(Self::new(id, upload.name(), format, df))
    }

    pub fn id(&self) -> FileId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Format the file was uploaded in.
    pub fn format(&self) -> FileFormat {
        self.format
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn selection(&self) -> &ColumnSelection {
        &self.selection
    }

    /// The cleaned table with every column, ignoring the selection.
    pub fn base(&self) -> &DataFrame {
        &self.base
    }

    fn advance(&mut self, to: Stage) {
        tracing::info!(
            file = self.name.as_str(),
            from = ?self.stage,
            to = ?to,
            "Stage change"
        );
        self.stage = to;
    }

    /// Run the requested cleaning operations on the base table.
    ///
    /// The table is only replaced when every operation succeeds.
    pub fn clean(&mut self, options: &CleaningOptions) -> Result<CleanReport> {
        let (cleaned, report) = cleaning::clean(&self.base, options)
            .map_err(|e| SweeperError::Other(format!("Failed to clean {}: {e:#}", self.name)))?;

        self.base = cleaned;
        tracing::info!(
            file = self.name.as_str(),
            duplicates_removed = report.duplicates_removed,
            cells_filled = report.cells_filled,
            "Cleaned"
        );
        self.advance(Stage::Cleaned);
        Ok(report)
    }

    /// Choose the columns that later stages see.
    ///
    /// Returns requested names that are not in the table; they are ignored.
    pub fn select(&mut self, selection: ColumnSelection) -> Result<Vec<String>> {
        let (_, unknown) = selection::select_columns(&self.base, &selection)?;
        for name in &unknown {
            tracing::warn!(
                file = self.name.as_str(),
                column = name.as_str(),
                "Ignoring unknown column"
            );
        }

        self.selection = selection;
        self.advance(Stage::ColumnsSelected);
        Ok(unknown)
    }

    /// The table as later stages see it: the base with the selection applied.
    pub fn current(&self) -> Result<DataFrame> {
        let (df, _) = selection::select_columns(&self.base, &self.selection)?;
        Ok(df)
    }

    pub fn preview(&self, rows: usize) -> Result<DataFrame> {
        Ok(table::preview(&self.current()?, rows))
    }

    pub fn chart(&mut self) -> Result<Chart> {
        let chart = visualize::chart(&self.current()?)?;
        if chart.is_empty() {
            tracing::info!(file = self.name.as_str(), "No numeric columns to chart");
        }
        self.advance(Stage::Visualized);
        Ok(chart)
    }

    pub fn export(&mut self, request: &ConversionRequest) -> Result<ExportArtifact> {
        let artifact = export::export(&self.name, &self.current()?, request)?;
        self.advance(Stage::Exported);
        Ok(artifact)
    }
}
