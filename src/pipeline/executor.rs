//! Pipeline execution engine.
//!
//! Runs a pipeline spec over a batch of uploads, one file at a time, and collects a
//! report per file. A failing file is recorded and the batch carries on.

use super::context::FileContext;
use super::session::{FileId, Session};
use super::spec::PipelineSpec;
use crate::cleaning::CleanReport;
use crate::error::{Result, SweeperError};
use crate::export::ExportArtifact;
use crate::upload::UploadedFile;
use crate::visualize::Chart;
use std::time::{Duration, Instant};

/// Report generated after processing one file
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Number of rows before processing
    pub rows_before: usize,

    /// Number of columns before processing
    pub columns_before: usize,

    /// Number of rows after processing
    pub rows_after: usize,

    /// Number of columns after processing
    pub columns_after: usize,

    pub duplicates_removed: usize,

    pub cells_filled: usize,

    /// Warnings generated during execution
    pub warnings: Vec<String>,

    /// Time taken for execution
    pub duration: Duration,
}

impl RunReport {
    /// Create a summary message
    pub fn summary(&self) -> String {
        format!(
            "{} -> {} rows, {} -> {} columns, {} duplicates removed, {} cells filled, {:.2}s",
            self.rows_before,
            self.rows_after,
            self.columns_before,
            self.columns_after,
            self.duplicates_removed,
            self.cells_filled,
            self.duration.as_secs_f64()
        )
    }
}

/// Everything produced for one successfully processed file.
#[derive(Debug)]
pub struct FileRun {
    pub report: RunReport,
    pub artifact: ExportArtifact,
    pub chart: Option<Chart>,
}

#[derive(Debug)]
pub struct FileOutcome {
    pub id: FileId,
    pub name: String,
    pub result: Result<FileRun>,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-file outcomes of a batch, in upload order.
#[derive(Debug)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
    pub duration: Duration,
}

impl BatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(FileOutcome::is_ok)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &SweeperError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.name.as_str(), e)))
    }

    pub fn summary(&self) -> String {
        let failed = self.failures().count();
        if self.outcomes.is_empty() {
            "No files to process".to_owned()
        } else if failed == 0 {
            "All files processed successfully".to_owned()
        } else {
            format!(
                "{failed} of {} files failed ({:.2}s)",
                self.outcomes.len(),
                self.duration.as_secs_f64()
            )
        }
    }
}

/// Process every upload with the same spec.
pub fn run_batch(
    files: impl IntoIterator<Item = UploadedFile>,
    spec: &PipelineSpec,
) -> BatchReport {
    let start = Instant::now();
    let mut session = Session::new();
    session.upload(files);

    let outcomes: Vec<FileOutcome> = session
        .into_slots()
        .into_iter()
        .map(|slot| {
            let (id, name, state) = slot.into_parts();
            let result = state.and_then(|mut context| run_file(&mut context, spec));
            match &result {
                Ok(run) => tracing::info!(file = name.as_str(), "{}", run.report.summary()),
                Err(err) => tracing::warn!(file = name.as_str(), "File failed: {err}"),
            }
            FileOutcome { id, name, result }
        })
        .collect();

    let report = BatchReport {
        outcomes,
        duration: start.elapsed(),
    };
    tracing::info!("{}", report.summary());
    report
}

/// Run clean, select, chart and export on one parsed file.
pub fn run_file(context: &mut FileContext, spec: &PipelineSpec) -> Result<FileRun> {
    let start = Instant::now();
    let mut warnings = Vec::new();

    let rows_before = context.base().height();
    let columns_before = context.base().width();

    let clean = if spec.cleaning.any() {
        context.clean(&spec.cleaning)?
    } else {
        CleanReport::default()
    };

    if !spec.columns.is_all() {
        for name in context.select(spec.columns.clone())? {
            warnings.push(format!("Column '{name}' not found, ignored"));
        }
    }

    let current = context.current()?;
    if current.width() == 0 {
        warnings.push("No columns selected".to_owned());
    }

    let chart = if spec.visualize {
        let chart = context.chart()?;
        if chart.is_empty() {
            warnings.push("No numeric columns to chart".to_owned());
        }
        Some(chart)
    } else {
        None
    };

    let artifact = context.export(&spec.conversion())?;

    Ok(FileRun {
        report: RunReport {
            rows_before,
            columns_before,
            rows_after: current.height(),
            columns_after: current.width(),
            duplicates_removed: clean.duplicates_removed,
            cells_filled: clean.cells_filled,
            warnings,
            duration: start.elapsed(),
        },
        artifact,
        chart,
    })
}
