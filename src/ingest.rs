//! Column-index configuration for turning split text records into observations.
//!
//! Reading files is left to the caller; this module only maps fields of an
//! already-split record (a CSV line, a spreadsheet row) onto a [`TimeItem`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SeriesError;
use crate::interval::{check_key_year, parse_time_key};
use crate::item::TimeItem;
use crate::set::TimeSeriesSet;

/// How the time column is written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFormat {
    /// RFC3339 timestamps such as `2024-01-31T12:00:00Z`.
    #[default]
    Rfc3339,
    /// A chrono `strftime` pattern such as `%Y-%m-%d`.
    ///
    /// Patterns without an offset are read as UTC; date-only patterns as
    /// midnight UTC.
    Pattern(String),
}

impl TimeFormat {
    /// Parses one time field.
    pub fn parse(&self, input: &str) -> Result<DateTime<Utc>, SeriesError> {
        let pattern = match self {
            Self::Rfc3339 => return parse_time_key(input),
            Self::Pattern(pattern) => pattern.as_str(),
        };
        if let Ok(dt) = DateTime::parse_from_str(input, pattern) {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, pattern) {
            return Ok(dt.and_utc());
        }
        NaiveDate::parse_from_str(input, pattern)
            .map_err(|e| SeriesError::ParseTime {
                input: input.to_string(),
                reason: e.to_string(),
            })?
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| SeriesError::ParseTime {
                input: input.to_string(),
                reason: String::from("date has no midnight"),
            })
    }
}

/// Maps record fields onto [`TimeItem`]s.
///
/// # Example
///
/// ```rust
/// use interval_series::{ColumnConfig, TimeFormat};
///
/// # fn main() -> Result<(), interval_series::SeriesError> {
/// let config = ColumnConfig::new()
///     .time_column(0)
///     .series_name_column(1)
///     .count_column(2)
///     .time_format(TimeFormat::Pattern(String::from("%Y-%m-%d")));
///
/// let item = config.parse_record(&["2024-03-07", "orders", "12"])?;
/// assert_eq!(item.series_name, "orders");
/// assert_eq!(item.value, 12);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Index of the time field.
    pub time_col_idx: usize,
    /// Index of the count field; without one every record counts as 1.
    pub count_col_idx: Option<usize>,
    /// Index of the series name field; without one `series_name` is used.
    pub series_name_col_idx: Option<usize>,
    /// Series name for records without a (non-empty) name field.
    pub series_name: String,
    /// Set name stamped onto every item.
    pub series_set_name: String,
    /// Format of the time field.
    pub time_format: TimeFormat,
    /// Whether counts are floats.
    pub is_float: bool,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            time_col_idx: 0,
            count_col_idx: None,
            series_name_col_idx: None,
            series_name: String::from("count"),
            series_set_name: String::new(),
            time_format: TimeFormat::default(),
            is_float: false,
        }
    }
}

impl ColumnConfig {
    /// Creates a configuration reading RFC3339 times from column 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the time column.
    #[must_use]
    pub fn time_column(mut self, idx: usize) -> Self {
        self.time_col_idx = idx;
        self
    }

    /// Sets the count column.
    #[must_use]
    pub fn count_column(mut self, idx: usize) -> Self {
        self.count_col_idx = Some(idx);
        self
    }

    /// Sets the series name column.
    #[must_use]
    pub fn series_name_column(mut self, idx: usize) -> Self {
        self.series_name_col_idx = Some(idx);
        self
    }

    /// Sets the fallback series name.
    #[must_use]
    pub fn series_name(mut self, name: impl Into<String>) -> Self {
        self.series_name = name.into();
        self
    }

    /// Sets the set name stamped onto items.
    #[must_use]
    pub fn series_set_name(mut self, name: impl Into<String>) -> Self {
        self.series_set_name = name.into();
        self
    }

    /// Sets the time format.
    #[must_use]
    pub fn time_format(mut self, format: TimeFormat) -> Self {
        self.time_format = format;
        self
    }

    /// Reads counts as floats.
    #[must_use]
    pub fn float(mut self, is_float: bool) -> Self {
        self.is_float = is_float;
        self
    }

    /// Checks that no two configured columns share an index and that every
    /// record can be named.
    pub fn validate(&self) -> Result<(), SeriesError> {
        let columns = [
            ("time", Some(self.time_col_idx)),
            ("count", self.count_col_idx),
            ("series name", self.series_name_col_idx),
        ];
        for (i, (name_a, idx_a)) in columns.iter().enumerate() {
            for (name_b, idx_b) in &columns[i + 1..] {
                if let (Some(a), Some(b)) = (idx_a, idx_b)
                    && a == b
                {
                    return Err(SeriesError::InvalidColumnConfig(format!(
                        "{name_a} and {name_b} columns share index {a}"
                    )));
                }
            }
        }
        if self.series_name_col_idx.is_none() && self.series_name.is_empty() {
            return Err(SeriesError::InvalidColumnConfig(String::from(
                "no series name column and no default series name",
            )));
        }
        if let TimeFormat::Pattern(pattern) = &self.time_format
            && pattern.is_empty()
        {
            return Err(SeriesError::InvalidColumnConfig(String::from(
                "empty time format pattern",
            )));
        }
        Ok(())
    }

    /// Parses one record into an item.
    ///
    /// Times outside years 0000-9999 are rejected with
    /// [`SeriesError::YearOutOfRange`].
    pub fn parse_record<S: AsRef<str>>(&self, record: &[S]) -> Result<TimeItem, SeriesError> {
        self.validate()?;
        let field = |index: usize| {
            record
                .get(index)
                .map(|s| s.as_ref().trim())
                .ok_or(SeriesError::ColumnOutOfRange {
                    index,
                    len: record.len(),
                })
        };

        let time = check_key_year(self.time_format.parse(field(self.time_col_idx)?)?)?;
        let name = match self.series_name_col_idx {
            Some(idx) => match field(idx)? {
                "" => self.series_name.clone(),
                name => name.to_string(),
            },
            None => self.series_name.clone(),
        };
        let count = self.count_col_idx.map(field).transpose()?;

        let item = match (count, self.is_float) {
            (None, false) => TimeItem::new_int(name, time, 1),
            (None, true) => TimeItem::new_float(name, time, 1.0),
            (Some(raw), false) => {
                let value = raw.parse::<i64>().map_err(|e| SeriesError::ParseCount {
                    input: raw.to_string(),
                    reason: e.to_string(),
                })?;
                TimeItem::new_int(name, time, value)
            }
            (Some(raw), true) => {
                let value = raw.parse::<f64>().map_err(|e| SeriesError::ParseCount {
                    input: raw.to_string(),
                    reason: e.to_string(),
                })?;
                TimeItem::new_float(name, time, value)
            }
        };
        Ok(item.with_set_name(self.series_set_name.clone()))
    }
}

impl TimeSeriesSet {
    /// Parses every record and adds the resulting items.
    ///
    /// Nothing is added unless every record parses. Returns the number of
    /// items added.
    pub fn add_records<S, R>(
        &mut self,
        config: &ColumnConfig,
        records: impl IntoIterator<Item = R>,
    ) -> Result<usize, SeriesError>
    where
        S: AsRef<str>,
        R: AsRef<[S]>,
    {
        let items = records
            .into_iter()
            .map(|record| config.parse_record(record.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let added = items.len();
        self.add_items(items);
        Ok(added)
    }
}
