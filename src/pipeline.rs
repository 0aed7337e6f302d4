//! Per-file processing state and headless batch runs.
//!
//! A [`Session`] holds every uploaded file in upload order, each in its own
//! slot. Files that parsed successfully get a [`FileContext`], which walks
//! through the stages
//!
//! ```text
//! Uploaded -> Parsed -> (Cleaned)? -> (ColumnsSelected)? -> (Visualized)? -> Exported
//! ```
//!
//! Stages can be re-run in any order; charts and exports always reflect the
//! table at the moment they are produced. A file that fails never affects the
//! other files of the session.
//!
//! # Example: converting a batch headlessly
//!
//! ```no_run
//! use datasweeper::pipeline::{PipelineSpec, run_batch};
//! use datasweeper::upload::{FileFormat, UploadedFile};
//!
//! let mut spec = PipelineSpec::new("tidy");
//! spec.cleaning.remove_duplicates = true;
//! spec.output.format = FileFormat::Xlsx;
//!
//! let files = vec![UploadedFile::from_path("sales.csv")?];
//! let report = run_batch(files, &spec);
//! println!("{}", report.summary());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod context;
pub mod executor;
pub mod session;
pub mod spec;

pub use context::{FileContext, Stage};
pub use executor::{BatchReport, FileOutcome, FileRun, RunReport, run_batch, run_file};
pub use session::{FileId, FileSlot, Session};
pub use spec::{OutputConfig, PipelineSpec, SPEC_VERSION};
