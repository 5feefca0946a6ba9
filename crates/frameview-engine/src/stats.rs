//! Per-column summary statistics of a view.

use frameview_model::{Column, Value, format_numeric};
use polars::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::view::View;

/// Summary of one column. Numeric aggregates are `None` for non-numeric
/// columns and for numeric columns without enough values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub name: String,
    pub dtype: &'static str,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnStats {
    /// Cells for a summary table row, empty where an aggregate is missing.
    pub fn row(&self) -> [String; 7] {
        let fmt = |v: Option<f64>| v.map(format_numeric).unwrap_or_default();
        [
            self.name.clone(),
            self.dtype.to_string(),
            self.count.to_string(),
            fmt(self.mean),
            fmt(self.std),
            fmt(self.min),
            fmt(self.max),
        ]
    }
}

/// Header matching [`ColumnStats::row`].
pub const STATS_HEADER: [&str; 7] = ["Column", "Type", "Count", "Mean", "StdDev", "Min", "Max"];

/// Summarizes every column of `view`, in column order.
pub fn describe(view: &View<'_>) -> Result<Vec<ColumnStats>> {
    let rows = view.source_rows();
    (0..view.width())
        .filter_map(|col| view.column(col))
        .map(|column| describe_column(column, rows))
        .collect()
}

fn describe_column(column: &Column, rows: &[usize]) -> Result<ColumnStats> {
    let name = column.name();
    let dtype = column.dtype();
    let values = rows.iter().map(|&row| &column.values()[row]);

    if !dtype.is_numeric() {
        return Ok(ColumnStats {
            name,
            dtype: dtype.label(),
            count: values.filter(|value| !value.is_null()).count(),
            mean: None,
            std: None,
            min: None,
            max: None,
        });
    }

    let numbers: Vec<Option<f64>> = values.map(Value::as_f64).collect();
    let series = Series::new(name.as_str().into(), numbers);
    let chunked = series.f64()?;
    let count = chunked.len() - chunked.null_count();
    Ok(ColumnStats {
        dtype: dtype.label(),
        count,
        mean: chunked.mean(),
        // sample std-dev is undefined below two values
        std: if count > 1 { chunked.std(1) } else { None },
        min: chunked.min(),
        max: chunked.max(),
        name,
    })
}
