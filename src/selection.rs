//! Column selection as a view over a table.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Columns the user wants to keep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnSelection {
    /// Every column, in table order.
    #[default]
    All,
    /// The named columns, in the order given.
    Only(Vec<String>),
}

impl ColumnSelection {
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(names.into_iter().map(Into::into).collect())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// Project `df` onto the selected columns.
///
/// Returns the projected table and the requested names that do not exist in
/// `df`. Repeated names are kept once, at their first position. An empty
/// list yields a table with no columns.
pub fn select_columns(
    df: &DataFrame,
    selection: &ColumnSelection,
) -> PolarsResult<(DataFrame, Vec<String>)> {
    let ColumnSelection::Only(names) = selection else {
        return Ok((df.clone(), Vec::new()));
    };

    let mut seen = HashSet::new();
    let mut keep = Vec::new();
    let mut unknown = Vec::new();

    for name in names {
        if !seen.insert(name.as_str()) {
            continue;
        }
        if df.get_column_index(name).is_some() {
            keep.push(df.column(name)?.clone());
        } else {
            unknown.push(name.clone());
        }
    }

    if keep.is_empty() {
        return Ok((DataFrame::empty(), unknown));
    }

    Ok((DataFrame::new(keep)?, unknown))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PolarsResult<DataFrame> {
        df!(
            "a" => &[1i64, 2, 3],
            "b" => &["x", "y", "z"],
            "c" => &[0.5f64, 1.5, 2.5]
        )
    }

    fn names(df: &DataFrame) -> Vec<String> {
        df.get_column_names()
            .into_iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_all_is_identity() -> anyhow::Result<()> {
        let df = sample()?;
        let (out, unknown) = select_columns(&df, &ColumnSelection::All)?;
        assert!(out.equals_missing(&df));
        assert!(unknown.is_empty());
        Ok(())
    }

    #[test]
    fn test_requested_order_is_kept() -> anyhow::Result<()> {
        let df = sample()?;
        let (out, _) = select_columns(&df, &ColumnSelection::only(["c", "a"]))?;

        assert_eq!(names(&out), vec!["c", "a"]);
        assert_eq!(out.height(), df.height());
        assert!(
            out.column("a")?
                .as_materialized_series()
                .equals_missing(df.column("a")?.as_materialized_series())
        );
        Ok(())
    }

    #[test]
    fn test_unknown_and_repeated_names() -> anyhow::Result<()> {
        let df = sample()?;
        let selection = ColumnSelection::only(["b", "missing", "b", "a"]);
        let (out, unknown) = select_columns(&df, &selection)?;

        assert_eq!(names(&out), vec!["b", "a"]);
        assert_eq!(unknown, vec!["missing"]);
        Ok(())
    }

    #[test]
    fn test_empty_selection_has_no_columns() -> anyhow::Result<()> {
        let df = sample()?;
        let (out, unknown) = select_columns(&df, &ColumnSelection::Only(Vec::new()))?;
        assert_eq!(out.width(), 0);
        assert!(unknown.is_empty());
        Ok(())
    }

    #[test]
    fn test_serde_shape() -> anyhow::Result<()> {
        assert_eq!(serde_json::to_string(&ColumnSelection::All)?, "\"all\"");
        let parsed: ColumnSelection = serde_json::from_str(r#"{"only":["a","b"]}"#)?;
        assert_eq!(parsed, ColumnSelection::only(["a", "b"]));
        Ok(())
    }
}
