//! Named series of observations, deduplicated by instant.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::SeriesError;
use crate::interval::{DEFAULT_WEEK_START, Interval, time_key};
use crate::intervals::SeriesIntervals;
use crate::item::TimeItem;

/// A named collection of [`TimeItem`]s holding at most one item per instant.
///
/// Items are keyed by [`time_key`], so iterating the map walks the series in
/// chronological order. Inserting an item at an instant that is already
/// present sums the readings instead of replacing them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    /// Name of the series.
    pub series_name: String,
    /// Name of the owning set, if any.
    pub series_set_name: String,
    /// Whether readings are floats.
    pub is_float: bool,
    /// Interval the items are bucketed on, `None` for raw observations.
    pub interval: Option<Interval>,
    pub(crate) item_map: BTreeMap<String, TimeItem>,
}

impl TimeSeries {
    /// Creates an empty series of raw observations.
    pub fn new(series_name: impl Into<String>) -> Self {
        Self {
            series_name: series_name.into(),
            ..Self::default()
        }
    }

    /// Creates an empty series already bucketed on `interval`.
    pub fn with_interval(series_name: impl Into<String>, interval: Interval) -> Self {
        Self {
            series_name: series_name.into(),
            interval: Some(interval),
            ..Self::default()
        }
    }

    /// Creates an empty series carrying this series' names, float flag and interval.
    pub(crate) fn empty_like(&self) -> Self {
        Self {
            series_name: self.series_name.clone(),
            series_set_name: self.series_set_name.clone(),
            is_float: self.is_float,
            interval: self.interval,
            item_map: BTreeMap::new(),
        }
    }

    /// Inserts an item, summing it into any item already stored at the same instant.
    pub fn add_item(&mut self, item: TimeItem) {
        match self.item_map.entry(time_key(&item.time)) {
            Entry::Occupied(mut existing) => existing.get_mut().accumulate(&item),
            Entry::Vacant(slot) => {
                let mut item = item;
                if item.series_name.is_empty() {
                    item.series_name.clone_from(&self.series_name);
                }
                if item.series_set_name.is_empty() {
                    item.series_set_name.clone_from(&self.series_set_name);
                }
                slot.insert(item);
            }
        }
    }

    /// Inserts every item in order, summing collisions.
    pub fn add_items(&mut self, items: impl IntoIterator<Item = TimeItem>) {
        for item in items {
            self.add_item(item);
        }
    }

    /// Inserts an integer reading at `time`.
    pub fn add_int64(&mut self, time: DateTime<Utc>, value: i64) {
        let item = TimeItem::new_int(self.series_name.clone(), time, value);
        self.add_item(item);
    }

    /// Inserts a float reading at `time`.
    pub fn add_float64(&mut self, time: DateTime<Utc>, value: f64) {
        let item = TimeItem::new_float(self.series_name.clone(), time, value);
        self.add_item(item);
    }

    /// Returns the items in ascending key order.
    pub fn items_sorted(&self) -> impl Iterator<Item = &TimeItem> {
        self.item_map.values()
    }

    /// Returns the keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.item_map.keys().map(String::as_str)
    }

    /// Returns the item instants in ascending order.
    pub fn times(&self) -> Vec<DateTime<Utc>> {
        self.item_map.values().map(|item| item.time).collect()
    }

    /// Returns the number of distinct instants.
    pub fn len(&self) -> usize {
        self.item_map.len()
    }

    /// Returns `true` if the series holds no items.
    pub fn is_empty(&self) -> bool {
        self.item_map.is_empty()
    }

    /// Returns the item stored at `time`.
    pub fn get(&self, time: &DateTime<Utc>) -> Option<&TimeItem> {
        self.item_map.get(&time_key(time))
    }

    /// Returns the item stored under an RFC3339 key.
    pub fn get_by_key(&self, key: &str) -> Option<&TimeItem> {
        self.item_map.get(key)
    }

    /// Returns `true` if an item is stored at `time`.
    pub fn contains_time(&self, time: &DateTime<Utc>) -> bool {
        self.item_map.contains_key(&time_key(time))
    }

    /// Returns the reading at `time` as `f64`.
    pub fn value_f64_at(&self, time: &DateTime<Utc>) -> Option<f64> {
        self.get(time).map(TimeItem::value_f64)
    }

    /// Returns the chronologically last item.
    pub fn last(&self) -> Result<&TimeItem, SeriesError> {
        self.item_map
            .values()
            .next_back()
            .ok_or_else(|| SeriesError::EmptySeries(self.series_name.clone()))
    }

    /// Removes and returns the chronologically last item.
    ///
    /// Used to drop a period that is still in progress before reporting.
    pub fn pop(&mut self) -> Result<TimeItem, SeriesError> {
        let (_key, item) = self
            .item_map
            .pop_last()
            .ok_or_else(|| SeriesError::EmptySeries(self.series_name.clone()))?;
        #[cfg(feature = "logging")]
        log::debug!("series '{}': popped trailing item {_key}", self.series_name);
        Ok(item)
    }

    /// Removes the item stored at `time`.
    pub fn delete_by_time(&mut self, time: &DateTime<Utc>) -> Option<TimeItem> {
        self.item_map.remove(&time_key(time))
    }

    /// Returns the smallest and largest integer readings.
    ///
    /// An empty series yields `(0, 0)`, which means "no data" rather than a
    /// reading of zero.
    pub fn min_max_values(&self) -> (i64, i64) {
        let mut values = self.item_map.values().map(|item| item.value);
        let Some(first) = values.next() else {
            return (0, 0);
        };
        values.fold((first, first), |(min, max), v| (min.min(v), max.max(v)))
    }

    /// Returns the smallest and largest readings as `f64`; `(0.0, 0.0)` when empty.
    pub fn min_max_values_f64(&self) -> (f64, f64) {
        let mut values = self.item_map.values().map(TimeItem::value_f64);
        let Some(first) = values.next() else {
            return (0.0, 0.0);
        };
        values.fold((first, first), |(min, max), v| (min.min(v), max.max(v)))
    }

    /// Returns the item with the largest reading, the earliest one on ties.
    pub fn max_item(&self) -> Result<&TimeItem, SeriesError> {
        let mut best: Option<&TimeItem> = None;
        for item in self.item_map.values() {
            if best.is_none_or(|b| item.value_f64() > b.value_f64()) {
                best = Some(item);
            }
        }
        best.ok_or_else(|| SeriesError::NoItems(self.series_name.clone()))
    }

    /// Sums the integer readings, wrapping on overflow.
    pub fn sum_i64(&self) -> i64 {
        self.item_map
            .values()
            .fold(0_i64, |sum, item| sum.wrapping_add(item.value))
    }

    /// Sums the readings as `f64`.
    pub fn sum_f64(&self) -> f64 {
        self.item_map.values().map(TimeItem::value_f64).sum()
    }

    /// Re-keys every item onto its interval start, summing items that land together.
    pub(crate) fn rebucket(&self, interval: Interval, week_start: Weekday) -> TimeSeries {
        let mut out = self.empty_like();
        out.interval = Some(interval);
        for item in self.item_map.values() {
            let mut bucketed = item.clone();
            bucketed.time = interval.start_of(item.time, week_start);
            out.add_item(bucketed);
        }
        out
    }

    /// Inserts a zero item at each instant that has none.
    pub(crate) fn fill_missing(&mut self, times: &[DateTime<Utc>]) {
        for time in times {
            self.item_map
                .entry(time_key(time))
                .or_insert_with(|| {
                    TimeItem::zero(&self.series_name, &self.series_set_name, *time, self.is_float)
                });
        }
    }

    /// Re-buckets the series onto `interval`.
    ///
    /// Items falling into the same bucket are summed. With `inflate`, every
    /// bucket between the first and last observed one is present, missing
    /// buckets holding zero.
    pub fn to_interval(&self, interval: Interval, week_start: Weekday, inflate: bool) -> TimeSeries {
        if !inflate {
            return self.rebucket(interval, week_start);
        }
        let mut intervals = SeriesIntervals::new(interval).with_week_start(week_start);
        intervals.proc_series(self);
        if intervals.inflate().is_err() {
            // Nothing observed, nothing to fill.
            return self.rebucket(interval, week_start);
        }
        intervals.normalize_series(self)
    }

    /// Re-buckets onto calendar months.
    pub fn to_month(&self, inflate: bool) -> TimeSeries {
        self.to_interval(Interval::Month, DEFAULT_WEEK_START, inflate)
    }

    /// Re-buckets onto calendar quarters.
    pub fn to_quarter(&self, inflate: bool) -> TimeSeries {
        self.to_interval(Interval::Quarter, DEFAULT_WEEK_START, inflate)
    }

    /// Re-buckets onto calendar years.
    pub fn to_year(&self, inflate: bool) -> TimeSeries {
        self.to_interval(Interval::Year, DEFAULT_WEEK_START, inflate)
    }

    /// Returns the running sum over the existing keys. Integer sums wrap on overflow.
    pub fn to_cumulative(&self) -> TimeSeries {
        let mut out = self.empty_like();
        let mut sum = 0_i64;
        let mut sum_float = 0.0_f64;
        for (key, item) in &self.item_map {
            sum = sum.wrapping_add(item.value);
            sum_float += item.value_float;
            let mut running = item.clone();
            running.value = sum;
            running.value_float = sum_float;
            out.item_map.insert(key.clone(), running);
        }
        out
    }

    /// Returns the monthly running sum.
    ///
    /// `times` adds buckets (snapped to the month start) that may hold no
    /// data; such buckets carry the previous cumulative value forward. With
    /// `inflate`, every month between the first and last bucket is present.
    pub fn to_month_cumulative(&self, inflate: bool, times: &[DateTime<Utc>]) -> TimeSeries {
        let mut monthly = self.to_month(false);
        let extra: Vec<DateTime<Utc>> = times
            .iter()
            .map(|t| Interval::Month.start_of(*t, DEFAULT_WEEK_START))
            .collect();
        monthly.fill_missing(&extra);
        if inflate {
            monthly = monthly.to_month(true);
        }
        monthly.to_cumulative()
    }
}
