//! Row de-duplication and mean imputation of numeric gaps.
//!
//! Every operation takes the table by reference and returns a new one, so a
//! failure never leaves a half-cleaned table behind.

use crate::table::ColumnKind;
use anyhow::{Context as _, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Which cleaning operations to apply. Both are off unless requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningOptions {
    pub remove_duplicates: bool,
    pub fill_missing_numeric: bool,
}

impl CleaningOptions {
    pub fn any(&self) -> bool {
        self.remove_duplicates || self.fill_missing_numeric
    }
}

/// What a cleaning pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub duplicates_removed: usize,
    pub cells_filled: usize,
}

/// Apply the requested operations: de-duplication first, then filling.
pub fn clean(df: &DataFrame, options: &CleaningOptions) -> Result<(DataFrame, CleanReport)> {
    let mut report = CleanReport::default();
    let mut current = df.clone();

    if options.remove_duplicates {
        let deduped = deduplicate(&current)?;
        report.duplicates_removed = current.height() - deduped.height();
        current = deduped;
    }

    if options.fill_missing_numeric {
        let (filled, cells) = fill_missing_numeric(&current)?;
        report.cells_filled = cells;
        current = filled;
    }

    Ok((current, report))
}

/// Drop rows that repeat an earlier row across every column.
///
/// The first occurrence wins and row order is kept. Missing cells compare
/// equal to each other.
pub fn deduplicate(df: &DataFrame) -> Result<DataFrame> {
    if df.width() == 0 || df.height() < 2 {
        return Ok(df.clone());
    }

    let deduped = df
        .clone()
        .lazy()
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()
        .context("Failed to remove duplicate rows")?;

    tracing::debug!(
        before = df.height(),
        after = deduped.height(),
        "Removed duplicate rows"
    );
    Ok(deduped)
}

/// Replace missing numeric cells with their column's mean.
///
/// Only numeric columns that have both missing and present values are
/// touched; those become `Float64`. Returns the new table and the number of
/// cells filled.
pub fn fill_missing_numeric(df: &DataFrame) -> Result<(DataFrame, usize)> {
    let mut out = df.clone();
    let mut filled = 0;

    for column in df.get_columns() {
        if ColumnKind::of(column.dtype()) != ColumnKind::Numeric {
            continue;
        }
        let missing = column.null_count();
        if missing == 0 || missing == column.len() {
            continue;
        }

        let name = column.name().clone();
        let values = column
            .as_materialized_series()
            .cast(&DataType::Float64)
            .with_context(|| format!("Failed to cast '{name}' to float"))?;
        let Some(mean) = values.mean() else {
            continue;
        };

        let imputed = values
            .f64()?
            .fill_null_with_values(mean)
            .with_context(|| format!("Failed to fill '{name}'"))?
            .into_series();
        out.with_column(imputed)?;

        tracing::debug!(column = name.as_str(), missing, mean, "Filled missing values");
        filled += missing;
    }

    Ok((out, filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::csv;

    fn csv_text(df: &DataFrame) -> Result<String> {
        Ok(String::from_utf8(csv::write(df)?)?)
    }

    #[test]
    fn test_fill_uses_mean_of_present_values() -> Result<()> {
        let df = csv::read(b"a,b\n1,\n1,3\n2,4\n")?;
        let (filled, report) = clean(
            &df,
            &CleaningOptions {
                fill_missing_numeric: true,
                ..Default::default()
            },
        )?;

        assert_eq!(report.cells_filled, 1);
        assert_eq!(report.duplicates_removed, 0);
        assert_eq!(csv_text(&filled)?, "a,b\n1,3.5\n1,3.0\n2,4.0\n");
        // gap-free integer column stays integer
        assert_eq!(filled.column("a")?.dtype(), &DataType::Int64);
        Ok(())
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() -> Result<()> {
        let df = csv::read(b"x,y\n1,2\n1,2\n3,4\n")?;
        let (deduped, report) = clean(
            &df,
            &CleaningOptions {
                remove_duplicates: true,
                ..Default::default()
            },
        )?;

        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(csv_text(&deduped)?, "x,y\n1,2\n3,4\n");
        Ok(())
    }

    #[test]
    fn test_dedup_is_idempotent() -> Result<()> {
        let df = df!(
            "k" => &[Some(3i64), None, Some(3), None, Some(1)],
            "v" => &["c", "n", "c", "n", "a"]
        )?;
        let once = deduplicate(&df)?;
        let twice = deduplicate(&once)?;

        assert_eq!(once.height(), 3);
        assert!(once.equals_missing(&twice));
        // order of first occurrences is kept
        let keys: Vec<Option<i64>> = once
            .column("k")?
            .as_materialized_series()
            .i64()?
            .into_iter()
            .collect();
        assert_eq!(keys, vec![Some(3), None, Some(1)]);
        Ok(())
    }

    #[test]
    fn test_dedup_zero_columns_is_noop() -> Result<()> {
        let df = DataFrame::empty();
        assert_eq!(deduplicate(&df)?.shape(), (0, 0));
        Ok(())
    }

    #[test]
    fn test_fill_leaves_other_columns_alone() -> Result<()> {
        let df = df!(
            "empty" => &[None::<f64>, None],
            "text" => &[None, Some("x")],
            "full" => &[1i64, 2]
        )?;
        let (filled, cells) = fill_missing_numeric(&df)?;

        assert_eq!(cells, 0);
        assert!(filled.equals_missing(&df));
        assert_eq!(filled.column("empty")?.null_count(), 2);
        Ok(())
    }

    #[test]
    fn test_clean_without_options_is_identity() -> Result<()> {
        let df = df!("a" => &[Some(1i64), Some(1), None])?;
        let (out, report) = clean(&df, &CleaningOptions::default())?;
        assert!(out.equals_missing(&df));
        assert_eq!(report, CleanReport::default());
        assert!(!CleaningOptions::default().any());
        Ok(())
    }
}
