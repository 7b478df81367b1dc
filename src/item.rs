//! A single timestamped observation.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One observation of a named series at an instant.
///
/// Integer and float readings live side by side; `is_float` says which one is
/// meaningful. Both fields are summed when two items collide on one instant.
///
/// `time` must fall within years 0000-9999 ([`crate::interval::KEY_YEARS`]);
/// series order items by their RFC3339 key, which only sorts chronologically
/// in that range. Record ingestion rejects other years, callers building
/// items directly can use [`crate::interval::check_key_year`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeItem {
    /// Name of the series this item belongs to.
    pub series_name: String,
    /// Name of the set the series belongs to, if any.
    pub series_set_name: String,
    /// Observation instant.
    pub time: DateTime<Utc>,
    /// Whether `value_float` carries the reading.
    pub is_float: bool,
    /// Integer reading.
    pub value: i64,
    /// Float reading.
    pub value_float: f64,
}

impl TimeItem {
    /// Creates an integer observation. The time is normalized to UTC.
    pub fn new_int<Tz: TimeZone>(
        series_name: impl Into<String>,
        time: DateTime<Tz>,
        value: i64,
    ) -> Self {
        Self {
            series_name: series_name.into(),
            series_set_name: String::new(),
            time: time.with_timezone(&Utc),
            is_float: false,
            value,
            value_float: 0.0,
        }
    }

    /// Creates a float observation. The time is normalized to UTC.
    pub fn new_float<Tz: TimeZone>(
        series_name: impl Into<String>,
        time: DateTime<Tz>,
        value: f64,
    ) -> Self {
        Self {
            series_name: series_name.into(),
            series_set_name: String::new(),
            time: time.with_timezone(&Utc),
            is_float: true,
            value: 0,
            value_float: value,
        }
    }

    /// Sets the owning set name.
    #[must_use]
    pub fn with_set_name(mut self, series_set_name: impl Into<String>) -> Self {
        self.series_set_name = series_set_name.into();
        self
    }

    /// Creates a zero-valued item used to fill an empty bucket.
    pub(crate) fn zero(
        series_name: &str,
        series_set_name: &str,
        time: DateTime<Utc>,
        is_float: bool,
    ) -> Self {
        Self {
            series_name: series_name.to_string(),
            series_set_name: series_set_name.to_string(),
            time,
            is_float,
            value: 0,
            value_float: 0.0,
        }
    }

    /// Returns the reading as `f64`, whichever field carries it.
    #[allow(clippy::cast_precision_loss)]
    pub fn value_f64(&self) -> f64 {
        if self.is_float {
            self.value_float
        } else {
            self.value as f64
        }
    }

    /// Adds another item's readings into this one.
    ///
    /// Integer and float fields are summed independently; `is_float` is not
    /// reconciled. Integer sums wrap on overflow.
    pub fn accumulate(&mut self, other: &TimeItem) {
        self.value = self.value.wrapping_add(other.value);
        self.value_float += other.value_float;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_new_normalizes_to_utc() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = offset.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap();
        let item = TimeItem::new_int("A", local, 3);
        assert_eq!(item.time, Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap());
        assert!(!item.is_float);
    }

    #[test]
    fn test_accumulate_sums_both_fields() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut a = TimeItem::new_int("A", t, 10);
        let mut b = TimeItem::new_float("A", t, 2.5);
        b.value = 5;
        a.accumulate(&b);
        assert_eq!(a.value, 15);
        assert_eq!(a.value_float, 2.5);
        assert!(!a.is_float);
    }

    #[test]
    fn test_accumulate_wraps_on_overflow() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut a = TimeItem::new_int("A", t, i64::MAX);
        a.accumulate(&TimeItem::new_int("A", t, 1));
        assert_eq!(a.value, i64::MIN);
    }

    #[test]
    fn test_value_f64() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(TimeItem::new_int("A", t, 7).value_f64(), 7.0);
        assert_eq!(TimeItem::new_float("A", t, 1.25).value_f64(), 1.25);
    }
}
