//! Error type shared by every fallible operation in the crate.

use std::fmt;

use crate::interval::Interval;

/// Errors returned by series, set, normalizer, regression and ingestion operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesError {
    /// An interval name could not be parsed into an [`Interval`].
    UnsupportedInterval(String),
    /// The operation does not support the series' interval.
    IntervalNotSupported {
        /// Name of the rejected operation.
        operation: &'static str,
        /// Interval the series carried, if any.
        interval: Option<Interval>,
    },
    /// `pop`/`last` on a series (or set) holding no items.
    EmptySeries(String),
    /// A value query found no items to inspect.
    NoItems(String),
    /// The normalizer was finalized before observing any timestamp.
    NoEndpoints,
    /// A series with this name already exists in the set.
    SeriesNameCollision(String),
    /// The named series does not exist in the set.
    SeriesNotFound(String),
    /// The column configuration is malformed.
    InvalidColumnConfig(String),
    /// A configured column index is past the end of a record.
    ColumnOutOfRange {
        /// Configured column index.
        index: usize,
        /// Number of fields in the record.
        len: usize,
    },
    /// A time field could not be parsed.
    ParseTime {
        /// Raw field contents.
        input: String,
        /// Parser message.
        reason: String,
    },
    /// A count field could not be parsed.
    ParseCount {
        /// Raw field contents.
        input: String,
        /// Parser message.
        reason: String,
    },
    /// Not enough distinct points to fit a regression.
    InsufficientData {
        /// Minimum number of points required.
        needed: usize,
        /// Number of usable points found.
        found: usize,
    },
    /// A growth projection needs the value of the year before the given year.
    MissingPriorYear(i32),
    /// An instant outside years 0000-9999, which series keys cannot order.
    YearOutOfRange(i32),
}

impl fmt::Display for SeriesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesError::UnsupportedInterval(name) => {
                write!(f, "interval '{name}' not supported")
            }
            SeriesError::IntervalNotSupported {
                operation,
                interval,
            } => match interval {
                Some(interval) => {
                    write!(f, "{operation}: interval '{interval}' not supported")
                }
                None => write!(f, "{operation}: series has no interval"),
            },
            SeriesError::EmptySeries(name) => write!(f, "series '{name}' has no items"),
            SeriesError::NoItems(name) => write!(f, "no items in '{name}'"),
            SeriesError::NoEndpoints => write!(f, "interval endpoints not set, no data observed"),
            SeriesError::SeriesNameCollision(name) => {
                write!(f, "series '{name}' already exists")
            }
            SeriesError::SeriesNotFound(name) => write!(f, "series '{name}' not found"),
            SeriesError::InvalidColumnConfig(msg) => {
                write!(f, "invalid column configuration: {msg}")
            }
            SeriesError::ColumnOutOfRange { index, len } => {
                write!(f, "column index {index} out of range for record of {len} fields")
            }
            SeriesError::ParseTime { input, reason } => {
                write!(f, "cannot parse time '{input}': {reason}")
            }
            SeriesError::ParseCount { input, reason } => {
                write!(f, "cannot parse count '{input}': {reason}")
            }
            SeriesError::InsufficientData { needed, found } => {
                write!(f, "insufficient data: need {needed} points, found {found}")
            }
            SeriesError::MissingPriorYear(year) => {
                write!(f, "no value for year {} prior to {year}", year - 1)
            }
            SeriesError::YearOutOfRange(year) => {
                write!(f, "year {year} outside the supported range 0000-9999")
            }
        }
    }
}

impl std::error::Error for SeriesError {}
