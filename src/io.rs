//! Reading uploads into tables and serialising tables back to bytes.
//!
//! Both directions are file-scoped: failures come back as
//! [`SweeperError::Parse`] or [`SweeperError::Export`] naming the file, so the
//! caller can report them and move on to the next upload.

pub mod csv;
pub mod infer;
pub mod xlsx;

use crate::error::{Result, SweeperError};
use crate::upload::{FileFormat, UploadedFile};
use polars::prelude::DataFrame;

/// Parse raw bytes of a detected format into a table.
pub fn read_table(file_name: &str, format: FileFormat, bytes: &[u8]) -> Result<DataFrame> {
    let parsed = match format {
        FileFormat::Csv => self::csv::read(bytes),
        FileFormat::Xlsx => self::xlsx::read(bytes),
    };

    parsed.map_err(|e| SweeperError::parse(file_name, format!("{e:#}")))
}

/// Detect an upload's format and parse it.
pub fn read_upload(upload: &UploadedFile) -> Result<(FileFormat, DataFrame)> {
    let format = upload.detect_format()?;
    let df = read_table(upload.name(), format, upload.bytes())?;
    tracing::info!(
        file = upload.name(),
        %format,
        rows = df.height(),
        columns = df.width(),
        "Parsed upload"
    );
    Ok((format, df))
}

/// Serialise a table into the bytes of the target format.
pub fn write_table(file_name: &str, df: &DataFrame, format: FileFormat) -> Result<Vec<u8>> {
    let written = match format {
        FileFormat::Csv => self::csv::write(df),
        FileFormat::Xlsx => self::xlsx::write(df),
    };

    written.map_err(|e| SweeperError::export(file_name, format!("{e:#}")))
}
