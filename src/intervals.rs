//! Canonical timeline construction and zero-filled normalization.
//!
//! A [`SeriesIntervals`] runs in two phases:
//!
//! 1. **Accumulation**: `proc_*` calls widen the observed minimum and maximum.
//! 2. **Finalize**: [`SeriesIntervals::inflate`] snaps both endpoints down to
//!    interval starts and walks from the minimum to the maximum inclusive,
//!    producing the canonical series every source series is rebuilt onto.
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use interval_series::{Interval, SeriesIntervals, TimeSeries};
//!
//! # fn main() -> Result<(), interval_series::SeriesError> {
//! let mut ts = TimeSeries::new("signups");
//! ts.add_int64(Utc.with_ymd_and_hms(2024, 1, 9, 0, 0, 0).unwrap(), 3);
//! ts.add_int64(Utc.with_ymd_and_hms(2024, 4, 2, 0, 0, 0).unwrap(), 5);
//!
//! let mut intervals = SeriesIntervals::new(Interval::Month);
//! intervals.proc_series(&ts);
//! intervals.inflate()?;
//! assert_eq!(intervals.len(), 4);
//!
//! let monthly = intervals.normalize_series(&ts);
//! assert_eq!(monthly.len(), 4);
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::SeriesError;
use crate::interval::{DEFAULT_WEEK_START, Interval};
use crate::item::TimeItem;
use crate::series::TimeSeries;
use crate::set::TimeSeriesSet;

/// Canonical, gap-free timeline for one interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesIntervals {
    interval: Interval,
    week_start: Weekday,
    min: Option<DateTime<Utc>>,
    max: Option<DateTime<Utc>>,
    canonical_series: Vec<DateTime<Utc>>,
}

impl SeriesIntervals {
    /// Creates an empty normalizer for `interval`.
    pub fn new(interval: Interval) -> Self {
        Self {
            interval,
            week_start: DEFAULT_WEEK_START,
            min: None,
            max: None,
            canonical_series: Vec::new(),
        }
    }

    /// Sets the weekday weeks start on. Only affects [`Interval::Week`].
    ///
    /// Default: Monday
    #[must_use]
    pub fn with_week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = week_start;
        self
    }

    /// Builds an inflated normalizer covering every series of `set`.
    pub fn for_set(
        interval: Interval,
        week_start: Weekday,
        set: &TimeSeriesSet,
    ) -> Result<Self, SeriesError> {
        let mut intervals = Self::new(interval).with_week_start(week_start);
        for series in set.series.values() {
            intervals.proc_series(series);
        }
        intervals.inflate()?;
        Ok(intervals)
    }

    /// Returns the interval.
    pub fn interval(&self) -> Interval {
        self.interval
    }

    /// Returns the configured week start.
    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    /// Returns the lower endpoint; snapped once inflated.
    pub fn min(&self) -> Option<DateTime<Utc>> {
        self.min
    }

    /// Returns the upper endpoint; snapped once inflated.
    pub fn max(&self) -> Option<DateTime<Utc>> {
        self.max
    }

    /// Returns the canonical series. Empty until [`Self::inflate`] succeeds.
    pub fn canonical_series(&self) -> &[DateTime<Utc>] {
        &self.canonical_series
    }

    /// Returns the number of canonical steps.
    pub fn len(&self) -> usize {
        self.canonical_series.len()
    }

    /// Returns `true` if no canonical series has been built.
    pub fn is_empty(&self) -> bool {
        self.canonical_series.is_empty()
    }

    /// Widens the endpoints to cover `time`.
    pub fn proc_time(&mut self, time: DateTime<Utc>) {
        self.min = Some(self.min.map_or(time, |min| min.min(time)));
        self.max = Some(self.max.map_or(time, |max| max.max(time)));
    }

    /// Widens the endpoints to cover every item of a series map.
    pub fn proc_items_map(&mut self, item_map: &BTreeMap<String, TimeItem>) {
        // Keys are ordered, so the extremes are the first and last entries.
        if let Some(first) = item_map.values().next() {
            self.proc_time(first.time);
        }
        if let Some(last) = item_map.values().next_back() {
            self.proc_time(last.time);
        }
    }

    /// Widens the endpoints to cover every item of `series`.
    pub fn proc_series(&mut self, series: &TimeSeries) {
        self.proc_items_map(&series.item_map);
    }

    /// Snaps the endpoints and builds the canonical series.
    pub fn inflate(&mut self) -> Result<(), SeriesError> {
        self.build_min_max_endpoints()?;
        self.build_canonical_series()
    }

    fn build_min_max_endpoints(&mut self) -> Result<(), SeriesError> {
        let (Some(min), Some(max)) = (self.min, self.max) else {
            return Err(SeriesError::NoEndpoints);
        };
        self.min = Some(self.interval.start_of(min, self.week_start));
        self.max = Some(self.interval.start_of(max, self.week_start));
        Ok(())
    }

    fn build_canonical_series(&mut self) -> Result<(), SeriesError> {
        let (Some(min), Some(max)) = (self.min, self.max) else {
            return Err(SeriesError::NoEndpoints);
        };
        self.canonical_series.clear();
        let mut cursor = Some(min);
        while let Some(time) = cursor.filter(|t| *t <= max) {
            self.canonical_series.push(time);
            cursor = self.interval.add(time, 1);
        }
        #[cfg(feature = "logging")]
        log::debug!(
            "canonical {} series: {} steps from {min} to {max}",
            self.interval,
            self.canonical_series.len()
        );
        Ok(())
    }

    /// Rebuilds `series` onto the canonical series.
    ///
    /// Items are re-keyed onto their interval start and summed; every
    /// canonical bucket without data holds a zero item.
    pub fn normalize_series(&self, series: &TimeSeries) -> TimeSeries {
        let mut out = series.rebucket(self.interval, self.week_start);
        out.fill_missing(&self.canonical_series);
        out
    }

    /// Rebuilds every series of `set` onto the canonical series.
    ///
    /// The returned set is inflated; its times equal the canonical series
    /// when the grid was built over the same set.
    pub fn normalize_set(&self, set: &TimeSeriesSet) -> TimeSeriesSet {
        let mut out = set.empty_like();
        out.interval = Some(self.interval);
        for (name, series) in &set.series {
            out.series.insert(name.clone(), self.normalize_series(series));
        }
        out.times.clone_from(&self.canonical_series);
        out.inflate();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::time_key;
    use chrono::TimeZone;
    use rand::Rng;

    fn ymd(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_inflate_without_data() {
        let mut intervals = SeriesIntervals::new(Interval::Month);
        assert_eq!(intervals.inflate(), Err(SeriesError::NoEndpoints));
        assert!(intervals.is_empty());
    }

    #[test]
    fn test_endpoints_snap_down() {
        let mut intervals = SeriesIntervals::new(Interval::Quarter);
        intervals.proc_time(ymd(2023, 8, 19));
        intervals.proc_time(ymd(2024, 2, 11));
        intervals.inflate().unwrap();
        assert_eq!(intervals.min(), Some(ymd(2023, 7, 1)));
        assert_eq!(intervals.max(), Some(ymd(2024, 1, 1)));
        let keys: Vec<String> = intervals.canonical_series().iter().map(time_key).collect();
        assert_eq!(
            keys,
            vec!["2023-07-01T00:00:00Z", "2023-10-01T00:00:00Z", "2024-01-01T00:00:00Z"]
        );
    }

    #[test]
    fn test_inflate_twice_is_stable() {
        let mut intervals = SeriesIntervals::new(Interval::Year);
        intervals.proc_time(ymd(2019, 5, 1));
        intervals.proc_time(ymd(2022, 12, 31));
        intervals.inflate().unwrap();
        let first = intervals.canonical_series().to_vec();
        intervals.inflate().unwrap();
        assert_eq!(intervals.canonical_series(), first.as_slice());
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_week_grid() {
        let mut intervals = SeriesIntervals::new(Interval::Week).with_week_start(Weekday::Sun);
        intervals.proc_time(ymd(2024, 1, 3));
        intervals.proc_time(ymd(2024, 1, 22));
        intervals.inflate().unwrap();
        let keys: Vec<String> = intervals.canonical_series().iter().map(time_key).collect();
        assert_eq!(
            keys,
            vec![
                "2023-12-31T00:00:00Z",
                "2024-01-07T00:00:00Z",
                "2024-01-14T00:00:00Z",
                "2024-01-21T00:00:00Z",
            ]
        );
    }

    #[test]
    fn test_canonical_series_complete_random() {
        let mut rng = rand::rng();
        for interval in [Interval::Year, Interval::Quarter, Interval::Month, Interval::Week] {
            for _ in 0..50 {
                let start = ymd(
                    rng.random_range(1990..2030),
                    rng.random_range(1..=12),
                    rng.random_range(1..=28),
                );
                let end = start + chrono::Duration::days(rng.random_range(0..3_000));
                let mut intervals = SeriesIntervals::new(interval);
                intervals.proc_time(end);
                intervals.proc_time(start);
                intervals.inflate().unwrap();

                let grid = intervals.canonical_series();
                let min = intervals.min().unwrap();
                let max = intervals.max().unwrap();
                let expected = interval.steps_between(min, max) + 1;
                assert_eq!(grid.len() as i64, expected);
                assert_eq!(grid.first(), Some(&min));
                assert_eq!(grid.last(), Some(&max));
                for pair in grid.windows(2) {
                    assert_eq!(interval.add(pair[0], 1), Some(pair[1]));
                }
            }
        }
    }

    #[test]
    fn test_normalize_series_zero_fills() {
        let mut ts = TimeSeries::new("A");
        ts.add_int64(ymd(2024, 1, 31), 2);
        ts.add_int64(ymd(2024, 4, 1), 8);

        let mut intervals = SeriesIntervals::new(Interval::Month);
        intervals.proc_series(&ts);
        intervals.inflate().unwrap();
        let monthly = intervals.normalize_series(&ts);

        let values: Vec<i64> = monthly.items_sorted().map(|i| i.value).collect();
        assert_eq!(values, vec![2, 0, 0, 8]);
        assert_eq!(monthly.interval, Some(Interval::Month));
        assert!(monthly.items_sorted().all(|i| i.series_name == "A"));
    }
}
