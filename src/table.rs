//! Column classification and small helpers over polars tables.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Semantic type of a column, derived from its polars dtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ColumnKind {
    Numeric,
    Boolean,
    Temporal,
    Text,
}

impl ColumnKind {
    pub fn of(dtype: &DataType) -> Self {
        if dtype.is_primitive_numeric() {
            Self::Numeric
        } else if dtype.is_bool() {
            Self::Boolean
        } else if dtype.is_temporal() {
            Self::Temporal
        } else {
            Self::Text
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "Numeric",
            Self::Boolean => "Boolean",
            Self::Temporal => "Temporal",
            Self::Text => "Text",
        }
    }
}

/// Column names with their kinds, in column order.
pub fn column_kinds(df: &DataFrame) -> Vec<(String, ColumnKind)> {
    df.get_columns()
        .iter()
        .map(|c| (c.name().to_string(), ColumnKind::of(c.dtype())))
        .collect()
}

/// Names of the numeric columns, in column order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| ColumnKind::of(c.dtype()) == ColumnKind::Numeric)
        .map(|c| c.name().to_string())
        .collect()
}

/// First `rows` rows of the table.
pub fn preview(df: &DataFrame, rows: usize) -> DataFrame {
    df.head(Some(rows))
}

/// Number of missing cells across all columns.
pub fn missing_cells(df: &DataFrame) -> usize {
    df.get_columns().iter().map(Column::null_count).sum()
}
