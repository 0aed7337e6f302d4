//! Bar-chart data for the first numeric columns of a table.

use crate::table;
use polars::prelude::*;
use serde::Serialize;

/// Maximum number of numeric columns plotted.
pub const MAX_SERIES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Row index.
    pub x: usize,
    /// `None` where the cell is missing.
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub points: Vec<ChartPoint>,
}

/// Renderer-neutral chart data: one series per column, x is the row index.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Chart {
    pub series: Vec<ChartSeries>,
}

impl Chart {
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Build a chart from up to [`MAX_SERIES`] numeric columns, in column order.
///
/// A table without numeric columns gives an empty chart.
pub fn chart(df: &DataFrame) -> PolarsResult<Chart> {
    let mut series = Vec::new();

    for name in table::numeric_column_names(df).into_iter().take(MAX_SERIES) {
        let values = df
            .column(&name)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let points = values
            .f64()?
            .into_iter()
            .enumerate()
            .map(|(x, y)| ChartPoint { x, y })
            .collect();
        series.push(ChartSeries { name, points });
    }

    Ok(Chart { series })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_two_numeric_columns() -> anyhow::Result<()> {
        let df = df!(
            "label" => &["a", "b"],
            "x" => &[Some(1i64), None],
            "y" => &[0.5f64, 1.5],
            "z" => &[9i64, 9]
        )?;
        let chart = chart(&df)?;

        let names: Vec<&str> = chart.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(
            chart.series[0].points,
            vec![
                ChartPoint { x: 0, y: Some(1.0) },
                ChartPoint { x: 1, y: None }
            ]
        );
        Ok(())
    }

    #[test]
    fn test_no_numeric_columns_is_empty() -> anyhow::Result<()> {
        let df = df!("label" => &["a", "b"], "flag" => &[true, false])?;
        assert!(chart(&df)?.is_empty());
        assert!(chart(&DataFrame::empty())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_serialises_for_renderers() -> anyhow::Result<()> {
        let df = df!("n" => &[2i64])?;
        let json = serde_json::to_string(&chart(&df)?)?;
        assert_eq!(json, r#"{"series":[{"name":"n","points":[{"x":0,"y":2.0}]}]}"#);
        Ok(())
    }
}
