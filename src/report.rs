//! Report rows and matrices consumed by chart and spreadsheet writers.
//!
//! Growth and funnel figures are ratios (`newer / older`), not percent
//! changes. Callers that want a change subtract one themselves.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::time_key;
use crate::set::TimeSeriesSet;

/// A single matrix cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// A canonical instant.
    Time(DateTime<Utc>),
    /// An integer reading.
    Int(i64),
    /// A float reading or ratio.
    Float(f64),
    /// A label.
    Text(String),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Time(t) => f.write_str(&time_key(t)),
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

/// Column headers plus rows of cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Column headers.
    pub columns: Vec<String>,
    /// Rows, each as wide as `columns`.
    pub rows: Vec<Vec<Cell>>,
}

/// One series' integer values over a window of canonical times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowInt64 {
    /// Series name.
    pub name: String,
    /// Canonical time of each value.
    pub times: Vec<DateTime<Utc>>,
    /// Values, chronological when `low_first`, newest first otherwise.
    pub values: Vec<i64>,
    /// Value of the period just before the window, when the window is not
    /// the full timeline.
    pub value_plus_one: Option<i64>,
    /// Whether `values` are in chronological order.
    pub low_first: bool,
}

/// One row of derived float figures, aligned with the source row's `times`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowFloat64 {
    /// Row name.
    pub name: String,
    /// Canonical time of each value.
    pub times: Vec<DateTime<Utc>>,
    /// Derived values.
    pub values: Vec<f64>,
}

/// Pairs an actual series with its target series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActualTarget {
    /// Name of the series holding actuals.
    pub actual: String,
    /// Name of the series holding targets.
    pub target: String,
}

impl ActualTarget {
    /// Creates a pair.
    pub fn new(actual: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            actual: actual.into(),
            target: target.into(),
        }
    }
}

/// Builds one row per series (in display order) over the last `cols` canonical times.
///
/// `cols == 0` or `cols >= times.len()` selects every time. When the window
/// skips earlier times, `value_plus_one` carries the value just before it so
/// a growth figure can be computed for the oldest column. Missing items
/// count as zero. The set must be inflated.
pub fn report(set: &TimeSeriesSet, cols: usize, low_first: bool) -> Vec<RowInt64> {
    let times = set.times();
    let total = times.len();
    let take = if cols == 0 || cols >= total { total } else { cols };
    let start = total - take;
    let window = &times[start..];

    set.order()
        .iter()
        .map(|name| {
            let value_at = |t: &DateTime<Utc>| set.get_item(name, t).map_or(0, |item| item.value);
            let mut values: Vec<i64> = window.iter().map(value_at).collect();
            let mut row_times = window.to_vec();
            let value_plus_one = start.checked_sub(1).map(|prior| value_at(&times[prior]));
            if !low_first {
                values.reverse();
                row_times.reverse();
            }
            RowInt64 {
                name: name.clone(),
                times: row_times,
                values,
                value_plus_one,
                low_first,
            }
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: i64, denominator: Option<i64>) -> f64 {
    match denominator {
        Some(d) if d != 0 => numerator as f64 / d as f64,
        _ => 0.0,
    }
}

/// Divides every value by its chronological predecessor.
///
/// The oldest value is divided by `value_plus_one` when present. A zero or
/// absent predecessor yields `0.0`. Output order follows the input row.
pub fn report_growth_pct(rows: &[RowInt64]) -> Vec<RowFloat64> {
    rows.iter()
        .map(|row| {
            let mut chronological = row.values.clone();
            if !row.low_first {
                chronological.reverse();
            }
            let mut values: Vec<f64> = chronological
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let prior = match i {
                        0 => row.value_plus_one,
                        _ => Some(chronological[i - 1]),
                    };
                    ratio(*v, prior)
                })
                .collect();
            if !row.low_first {
                values.reverse();
            }
            RowFloat64 {
                name: row.name.clone(),
                times: row.times.clone(),
                values,
            }
        })
        .collect()
}

/// Stage-to-stage conversion: each row divided, column by column, by the row before it.
///
/// Returns one row per adjacent pair, named after the later stage. A zero
/// earlier stage yields `0.0`.
pub fn report_funnel_pct(rows: &[RowInt64]) -> Vec<RowFloat64> {
    rows.windows(2)
        .map(|pair| {
            let (current, next) = (&pair[0], &pair[1]);
            let values = next
                .values
                .iter()
                .zip(&current.values)
                .map(|(n, c)| ratio(*n, Some(*c)))
                .collect();
            RowFloat64 {
                name: next.name.clone(),
                times: next.times.clone(),
                values,
            }
        })
        .collect()
}

/// Emits three rows per pair over every canonical time: actual, target and
/// `(actual - target) / target`.
///
/// A missing actual or target (or a zero target) yields a `0` difference
/// cell; missing readings themselves render as zero. The set must be
/// inflated.
pub fn table_actual_target(set: &TimeSeriesSet, pairs: &[ActualTarget]) -> Table {
    let times = set.times();
    let mut columns = Vec::with_capacity(times.len() + 1);
    columns.push(String::from("Series"));
    columns.extend(times.iter().map(time_key));

    let mut rows = Vec::with_capacity(pairs.len() * 3);
    for pair in pairs {
        let mut actual_row = vec![Cell::Text(pair.actual.clone())];
        let mut target_row = vec![Cell::Text(pair.target.clone())];
        let mut diff_row = vec![Cell::Text(format!("{} vs {}", pair.actual, pair.target))];
        for time in times {
            actual_row.push(set.value_cell(&pair.actual, time));
            target_row.push(set.value_cell(&pair.target, time));
            let actual = set.get_item(&pair.actual, time).map(|item| item.value_f64());
            let target = set.get_item(&pair.target, time).map(|item| item.value_f64());
            let diff = match (actual, target) {
                (Some(a), Some(t)) if t != 0.0 => (a - t) / t,
                _ => 0.0,
            };
            diff_row.push(Cell::Float(diff));
        }
        rows.push(actual_row);
        rows.push(target_row);
        rows.push(diff_row);
    }
    Table { columns, rows }
}
