//! Cell classification shared by the CSV and XLSX readers.
//!
//! Both readers turn their raw input into [`Cell`]s first: the CSV reader by
//! parsing text tokens, the XLSX reader from stored cell metadata. Column
//! types are then decided here, so both formats agree on what "numeric" means.

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::collections::HashSet;

/// Tokens read as missing values, matching the usual CSV conventions.
pub const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// A single classified input value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Milliseconds since the Unix epoch, no time zone.
    DateTime(i64),
    Text(String),
}

impl Cell {
    /// Classify a CSV text token.
    pub fn from_token(token: &str) -> Self {
        if NA_TOKENS.contains(&token) {
            return Self::Missing;
        }
        if let Ok(v) = token.parse::<i64>() {
            return Self::Int(v);
        }
        if let Ok(v) = token.parse::<f64>() {
            return Self::Float(v);
        }
        match token {
            "true" | "True" | "TRUE" => return Self::Bool(true),
            "false" | "False" | "FALSE" => return Self::Bool(false),
            _ => {}
        }
        if let Some(ms) = parse_datetime(token) {
            return Self::DateTime(ms);
        }
        Self::Text(token.to_owned())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    fn as_millis(&self) -> Option<i64> {
        match self {
            Self::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    /// Text rendering used when a column falls back to text.
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Missing => None,
            Self::Int(v) => Some(v.to_string()),
            Self::Float(v) => Some(v.to_string()),
            Self::Bool(v) => Some(v.to_string()),
            Self::DateTime(ms) => Some(
                chrono::DateTime::from_timestamp_millis(*ms)
                    .map(|dt| dt.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| ms.to_string()),
            ),
            Self::Text(s) => Some(s.clone()),
        }
    }
}

/// Parse an ISO date or date-time into epoch milliseconds.
pub fn parse_datetime(token: &str) -> Option<i64> {
    // cheap reject before trying every format
    if token.len() < 10 || !token.as_bytes().get(4).is_some_and(|b| *b == b'-') {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(token, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(token, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Column type decided from a column's cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inferred {
    Integer,
    Float,
    Boolean,
    Temporal,
    Text,
}

/// Decide a column's type from its non-missing cells.
///
/// Integers widen to floats. Any other mix, or a column with no values at
/// all, is text.
pub fn classify(cells: &[Cell]) -> Inferred {
    let mut kind = None;
    for cell in cells {
        let cell_kind = match cell {
            Cell::Missing => continue,
            Cell::Int(_) => Inferred::Integer,
            Cell::Float(_) => Inferred::Float,
            Cell::Bool(_) => Inferred::Boolean,
            Cell::DateTime(_) => Inferred::Temporal,
            Cell::Text(_) => return Inferred::Text,
        };
        kind = Some(match (kind, cell_kind) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (
                Some(Inferred::Integer | Inferred::Float),
                Inferred::Integer | Inferred::Float,
            ) => Inferred::Float,
            _ => return Inferred::Text,
        });
    }
    kind.unwrap_or(Inferred::Text)
}

/// Build a typed polars column from classified cells.
pub fn build_column(name: &str, cells: &[Cell], kind: Inferred) -> PolarsResult<Column> {
    let name = PlSmallStr::from(name);
    let series = match kind {
        Inferred::Integer => Series::new(name, cells.iter().map(Cell::as_i64).collect::<Vec<_>>()),
        Inferred::Float => Series::new(name, cells.iter().map(Cell::as_f64).collect::<Vec<_>>()),
        Inferred::Boolean => {
            Series::new(name, cells.iter().map(Cell::as_bool).collect::<Vec<_>>())
        }
        Inferred::Temporal => {
            Series::new(name, cells.iter().map(Cell::as_millis).collect::<Vec<_>>())
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        }
        Inferred::Text => Series::new(
            name,
            cells.iter().map(Cell::render).collect::<Vec<Option<String>>>(),
        ),
    };
    Ok(Column::from(series))
}

/// Make header names usable as unique column names.
///
/// Empty names become `Unnamed: {index}`. Repeats of `a` become `a.1`,
/// `a.2` and so on.
pub fn header_names<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut taken = HashSet::new();
    let mut names = Vec::new();

    for (idx, name) in raw.into_iter().enumerate() {
        let base = match name.as_ref() {
            "" => format!("Unnamed: {idx}"),
            other => other.to_owned(),
        };
        let mut candidate = base.clone();
        let mut suffix = 0;
        while taken.contains(&candidate) {
            suffix += 1;
            candidate = format!("{base}.{suffix}");
        }
        taken.insert(candidate.clone());
        names.push(candidate);
    }

    names
}
