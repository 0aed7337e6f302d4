use super::infer::{self, Cell};
use crate::table::ColumnKind;
use anyhow::{Context as _, Result, anyhow};
use calamine::{Data, Reader, Xlsx};
use polars::prelude::{Column, DataFrame, DataType, PolarsResult, TimeUnit};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::io::Cursor;

/// Days between the spreadsheet epoch (1899-12-30) and the Unix epoch.
const UNIX_EPOCH_SERIAL: f64 = 25_569.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Parse the first worksheet of an XLSX workbook into a typed table.
///
/// The first row of the sheet's used range is the header.
pub fn read(bytes: &[u8]) -> Result<DataFrame> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| anyhow!("Not a readable XLSX workbook: {e}"))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("Workbook has no worksheets"))?
        .map_err(|e| anyhow!("Failed to read first worksheet: {e}"))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };

    let names = infer::header_names(header.iter().map(header_text));
    let mut cells: Vec<Vec<Cell>> = vec![Vec::new(); names.len()];
    for row in rows {
        for (column, value) in cells.iter_mut().zip(row) {
            column.push(cell_from_data(value));
        }
    }

    let columns = names
        .iter()
        .zip(&cells)
        .map(|(name, column_cells)| {
            let kind = infer::classify(column_cells);
            tracing::debug!(column = name.as_str(), ?kind, "Classified XLSX column");
            infer::build_column(name, column_cells, kind)
        })
        .collect::<PolarsResult<Vec<_>>>()?;

    let df = DataFrame::new(columns).context("Failed to assemble table")?;
    tracing::debug!(rows = df.height(), columns = df.width(), "Parsed XLSX");
    Ok(df)
}

fn header_text(value: &Data) -> String {
    match value {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(v) => whole_number(*v).map_or_else(|| v.to_string(), |n| n.to_string()),
        other => other.to_string(),
    }
}

/// Classify a cell from its stored metadata.
fn cell_from_data(value: &Data) -> Cell {
    match value {
        Data::Empty | Data::Error(_) => Cell::Missing,
        Data::Int(v) => Cell::Int(*v),
        // numbers are stored as floats; whole ones read back as integers
        Data::Float(v) => whole_number(*v).map_or(Cell::Float(*v), Cell::Int),
        Data::Bool(v) => Cell::Bool(*v),
        Data::String(s) => Cell::Text(s.clone()),
        Data::DateTime(dt) if dt.is_datetime() => Cell::DateTime(serial_to_millis(dt.as_f64())),
        Data::DateTime(dt) => Cell::Float(dt.as_f64()),
        Data::DateTimeIso(s) => {
            infer::parse_datetime(s).map_or_else(|| Cell::Text(s.clone()), Cell::DateTime)
        }
        Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

fn whole_number(v: f64) -> Option<i64> {
    // beyond 2^53 floats stop being exact integers
    if v.fract() == 0.0 && v.abs() < 9_007_199_254_740_992.0 {
        Some(v as i64)
    } else {
        None
    }
}

fn serial_to_millis(serial: f64) -> i64 {
    ((serial - UNIX_EPOCH_SERIAL) * MILLIS_PER_DAY).round() as i64
}

fn millis_to_serial(ms: i64) -> f64 {
    ms as f64 / MILLIS_PER_DAY + UNIX_EPOCH_SERIAL
}

/// Serialise a table as a single-sheet workbook with a bold header row.
pub fn write(df: &DataFrame) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    for (col_idx, column) in df.get_columns().iter().enumerate() {
        let col_idx = u16::try_from(col_idx).context("Too many columns for a worksheet")?;
        worksheet
            .write_string_with_format(0, col_idx, column.name().as_str(), &header_format)
            .with_context(|| format!("Failed to write header at column {col_idx}"))?;
        write_column(worksheet, col_idx, column, &date_format)
            .with_context(|| format!("Failed to write column '{}'", column.name()))?;
    }

    worksheet.autofit();

    workbook
        .save_to_buffer()
        .context("Failed to save workbook to buffer")
}

fn write_column(
    worksheet: &mut Worksheet,
    col_idx: u16,
    column: &Column,
    date_format: &Format,
) -> Result<()> {
    let series = column.as_materialized_series();

    match series.dtype() {
        DataType::Datetime(..) | DataType::Date => {
            let millis = series
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
                .cast(&DataType::Int64)?;
            for (row_idx, value) in millis.i64()?.into_iter().enumerate() {
                if let Some(ms) = value {
                    worksheet.write_number_with_format(
                        excel_row(row_idx)?,
                        col_idx,
                        millis_to_serial(ms),
                        date_format,
                    )?;
                }
            }
        }
        dtype if ColumnKind::of(dtype) == ColumnKind::Numeric => {
            let values = series.cast(&DataType::Float64)?;
            for (row_idx, value) in values.f64()?.into_iter().enumerate() {
                // blank cells for missing and non-finite values
                if let Some(v) = value.filter(|v| v.is_finite()) {
                    worksheet.write_number(excel_row(row_idx)?, col_idx, v)?;
                }
            }
        }
        DataType::Boolean => {
            for (row_idx, value) in series.bool()?.into_iter().enumerate() {
                if let Some(v) = value {
                    worksheet.write_boolean(excel_row(row_idx)?, col_idx, v)?;
                }
            }
        }
        _ => {
            let text = series.cast(&DataType::String)?;
            for (row_idx, value) in text.str()?.into_iter().enumerate() {
                if let Some(v) = value {
                    worksheet.write_string(excel_row(row_idx)?, col_idx, v)?;
                }
            }
        }
    }

    Ok(())
}

/// Sheet row for a table row; row 0 holds the header.
fn excel_row(row_idx: usize) -> Result<u32> {
    u32::try_from(row_idx + 1).context("Too many rows for a worksheet")
}
