//! # interval-series
//!
//! Calendar interval engine for reporting time series.
//!
//! Raw timestamped counts are bucketed onto canonical calendar instants
//! (year, quarter, month or week starts), gaps are filled with zeros so every
//! series in a set shares one timeline, and reporting views are derived from
//! the result.
//!
//! ## Features
//!
//! - **Sorted storage**: Items keyed by their RFC3339 time, summed on collision
//! - **Normalization**: Bucket and zero-fill series onto a shared canonical timeline
//! - **Reports**: Windowed rows, growth and funnel ratios, actual-vs-target tables
//! - **Growth analytics**: MoM, QoQ and YoY ratios plus YTD/QTD comparisons
//! - **Projection**: Least-squares trend fitting and yearly projection
//! - **Ingestion**: Column-index configuration for split text records
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use interval_series::{Interval, TimeItem, TimeSeriesSet, report, report_growth_pct};
//!
//! # fn main() -> Result<(), interval_series::SeriesError> {
//! let mut raw = TimeSeriesSet::new("signups");
//! raw.add_item(TimeItem::new_int("web", Utc.with_ymd_and_hms(2024, 1, 12, 9, 0, 0).unwrap(), 4));
//! raw.add_item(TimeItem::new_int("web", Utc.with_ymd_and_hms(2024, 3, 2, 9, 0, 0).unwrap(), 6));
//! raw.add_item(TimeItem::new_int("app", Utc.with_ymd_and_hms(2024, 2, 20, 9, 0, 0).unwrap(), 5));
//!
//! let monthly = raw.to_interval(Interval::Month, interval_series::DEFAULT_WEEK_START)?;
//! assert_eq!(monthly.times().len(), 3);
//!
//! let rows = report(&monthly, 0, true);
//! let growth = report_growth_pct(&rows);
//! assert_eq!(growth.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! With the `logging` feature enabled, normalization, projection and
//! destructive edits emit `log` records at debug level.

#![deny(missing_docs)]
#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod error;
pub mod ingest;
pub mod interval;
pub mod intervals;
pub mod item;
pub mod regression;
pub mod report;
pub mod series;
pub mod set;
pub mod xox;

pub use error::SeriesError;
pub use ingest::{ColumnConfig, TimeFormat};
pub use interval::{
    DEFAULT_WEEK_START, Interval, KEY_YEARS, check_key_year, month_index, parse_time_key, time_key,
};
pub use intervals::SeriesIntervals;
pub use item::TimeItem;
pub use report::{
    ActualTarget, Cell, RowFloat64, RowInt64, Table, report, report_funnel_pct,
    report_growth_pct, table_actual_target,
};
pub use series::TimeSeries;
pub use set::TimeSeriesSet;
pub use xox::{XoxGrowth, XoxPoint, YoyQoqGrowth, aggregate_prior_months, yoy_qoq_growth};
