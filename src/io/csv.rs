use super::infer::{self, Cell, Inferred};
use anyhow::{Context as _, Result, bail};
use polars::prelude::*;

/// Parse comma-delimited bytes with a header row into a typed table.
pub fn read(bytes: &[u8]) -> Result<DataFrame> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .context("Failed to read CSV header")?
        .clone();
    if headers.is_empty() {
        bail!("No columns to parse from file");
    }

    let names = infer::header_names(headers.iter());
    let width = names.len();
    let mut tokens: Vec<Vec<String>> = vec![Vec::new(); width];

    for (row_idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV record {}", row_idx + 1))?;
        if record.len() > width {
            let line = record.position().map_or(row_idx as u64 + 2, ::csv::Position::line);
            bail!(
                "Expected {width} fields in line {line}, saw {}",
                record.len()
            );
        }
        // short rows are padded with missing cells
        for (col_idx, column) in tokens.iter_mut().enumerate() {
            column.push(record.get(col_idx).unwrap_or("").to_owned());
        }
    }

    let columns = names
        .iter()
        .zip(tokens)
        .map(|(name, column_tokens)| token_column(name, column_tokens))
        .collect::<PolarsResult<Vec<_>>>()?;

    let df = DataFrame::new(columns).context("Failed to assemble table")?;
    tracing::debug!(rows = df.height(), columns = df.width(), "Parsed CSV");
    Ok(df)
}

fn token_column(name: &str, tokens: Vec<String>) -> PolarsResult<Column> {
    let cells: Vec<Cell> = tokens.iter().map(|t| Cell::from_token(t)).collect();
    let kind = infer::classify(&cells);
    tracing::debug!(column = name, ?kind, "Classified CSV column");

    // text columns keep the source tokens rather than re-rendered numbers
    let cells = if kind == Inferred::Text {
        cells
            .iter()
            .zip(tokens)
            .map(|(cell, token)| {
                if cell.is_missing() {
                    Cell::Missing
                } else {
                    Cell::Text(token)
                }
            })
            .collect()
    } else {
        cells
    };

    infer::build_column(name, &cells, kind)
}

/// Serialise a table as CSV with a header row and no index column.
///
/// A table without columns produces an empty payload.
pub fn write(df: &DataFrame) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if df.width() == 0 {
        return Ok(buffer);
    }

    let mut df = df.clone();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .finish(&mut df)
        .context("Failed to write CSV")?;

    Ok(buffer)
}
