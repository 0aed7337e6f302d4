//! # Data Sweeper
//!
//! Upload CSV and Excel files, clean them, keep the columns you need, chart
//! their numbers and convert them to the other format.
//!
//! ## Quick Start
//!
//! ```no_run
//! use datasweeper::cleaning::CleaningOptions;
//! use datasweeper::export::ConversionRequest;
//! use datasweeper::pipeline::Session;
//! use datasweeper::selection::ColumnSelection;
//! use datasweeper::upload::{FileFormat, UploadedFile};
//!
//! let mut session = Session::new();
//! let ids = session.upload([UploadedFile::from_path("sales.csv")?]);
//!
//! let file = session.get_mut(ids[0])?;
//! file.clean(&CleaningOptions { remove_duplicates: true, fill_missing_numeric: true })?;
//! file.select(ColumnSelection::only(["region", "revenue"]))?;
//! let artifact = file.export(&ConversionRequest::new(FileFormat::Xlsx))?;
//! println!("{} ({} bytes)", artifact.file_name, artifact.bytes.len());
//! # Ok::<(), datasweeper::error::SweeperError>(())
//! ```
//!
//! ## Core Modules
//!
//! - [`upload`]: uploaded files and format detection
//! - [`io`]: CSV and XLSX parsing with explicit type inference, and writing
//! - [`cleaning`]: de-duplication and mean imputation
//! - [`selection`]: column selection
//! - [`visualize`]: chart data for numeric columns
//! - [`export`]: conversion into downloadable artifacts
//! - [`pipeline`]: per-file state, sessions and batch runs
//! - [`error`]: error types and handling utilities

#![warn(clippy::all, rust_2018_idioms)]

pub mod cleaning;
pub mod config;
pub mod error;
pub mod export;
pub mod io;
pub mod logging;
pub mod pipeline;
pub mod selection;
pub mod table;
pub mod upload;
pub mod visualize;
