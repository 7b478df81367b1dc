//! Calendar intervals and the RFC3339 keys used to index series.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, SecondsFormat, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::SeriesError;

/// Week start used when none is configured.
pub const DEFAULT_WEEK_START: Weekday = Weekday::Mon;

/// Calendar granularity defining both bucket size and step size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    /// Calendar years, stepped by 12 months.
    Year,
    /// Calendar quarters starting January, April, July and October.
    Quarter,
    /// Calendar months.
    Month,
    /// Seven-day weeks starting on a configurable weekday.
    Week,
}

impl Interval {
    /// Returns the number of months one step spans, or `None` for weeks.
    pub fn months(&self) -> Option<u32> {
        match self {
            Self::Year => Some(12),
            Self::Quarter => Some(3),
            Self::Month => Some(1),
            Self::Week => None,
        }
    }

    /// Returns the lowercase name of this interval.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Year => "year",
            Self::Quarter => "quarter",
            Self::Month => "month",
            Self::Week => "week",
        }
    }

    /// Snaps a timestamp down to midnight UTC at the start of its interval.
    ///
    /// For example, with `Interval::Quarter`, `2024-05-17T13:45:00Z` becomes
    /// `2024-04-01T00:00:00Z`. `week_start` is only consulted for weeks.
    pub fn start_of(&self, t: DateTime<Utc>, week_start: Weekday) -> DateTime<Utc> {
        let date = t.date_naive();
        let start = match self {
            Self::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
            Self::Quarter => NaiveDate::from_ymd_opt(date.year(), (date.month0() / 3) * 3 + 1, 1),
            Self::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1),
            Self::Week => {
                let back = days_since_week_start(date.weekday(), week_start);
                date.checked_sub_signed(Duration::days(back))
            }
        };
        // Only fails at the lower edge of chrono's representable range.
        start
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map_or(t, |dt| dt.and_utc())
    }

    /// Steps `t` by `n` intervals (negative `n` steps backwards).
    ///
    /// Returns `None` when the result is not representable.
    pub fn add(&self, t: DateTime<Utc>, n: i32) -> Option<DateTime<Utc>> {
        match self.months() {
            Some(months) => {
                let span = u32::try_from(u64::from(months) * u64::from(n.unsigned_abs())).ok()?;
                if n >= 0 {
                    t.checked_add_months(Months::new(span))
                } else {
                    t.checked_sub_months(Months::new(span))
                }
            }
            None => t.checked_add_signed(Duration::weeks(i64::from(n))),
        }
    }

    /// Number of whole steps from `start` to `end`, both assumed snapped.
    pub fn steps_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
        match self.months() {
            Some(months) => (month_index(end) - month_index(start)) / i64::from(months),
            None => (end - start).num_days() / 7,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "year" => Ok(Self::Year),
            "quarter" => Ok(Self::Quarter),
            "month" => Ok(Self::Month),
            "week" => Ok(Self::Week),
            _ => Err(SeriesError::UnsupportedInterval(s.to_string())),
        }
    }
}

fn days_since_week_start(day: Weekday, week_start: Weekday) -> i64 {
    i64::from((day.num_days_from_monday() + 7 - week_start.num_days_from_monday()) % 7)
}

/// Continuous month index (`year * 12 + zero-based month`).
pub fn month_index(t: DateTime<Utc>) -> i64 {
    i64::from(t.year()) * 12 + i64::from(t.month0())
}

/// Formats an instant as its series key: RFC3339 in UTC, whole seconds, `Z` suffix.
///
/// All keys share one fixed width for years 0000-9999, so byte order equals
/// chronological order. Instants outside that range get signed, wider keys
/// that break the ordering; see [`check_key_year`].
pub fn time_key(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// First and last year whose keys sort chronologically.
pub const KEY_YEARS: (i32, i32) = (0, 9999);

/// Accepts `t` only if its year lies within [`KEY_YEARS`].
pub fn check_key_year(t: DateTime<Utc>) -> Result<DateTime<Utc>, SeriesError> {
    let (first, last) = KEY_YEARS;
    if (first..=last).contains(&t.year()) {
        Ok(t)
    } else {
        Err(SeriesError::YearOutOfRange(t.year()))
    }
}

/// Parses a series key (or any RFC3339 string) into a UTC instant.
pub fn parse_time_key(key: &str) -> Result<DateTime<Utc>, SeriesError> {
    DateTime::parse_from_rfc3339(key)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SeriesError::ParseTime {
            input: key.to_string(),
            reason: e.to_string(),
        })
}
