//! Named collections of series sharing one canonical timeline.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::SeriesError;
use crate::interval::{DEFAULT_WEEK_START, Interval, time_key};
use crate::intervals::SeriesIntervals;
use crate::item::TimeItem;
use crate::report::{Cell, Table};
use crate::series::TimeSeries;

/// A set of named [`TimeSeries`] and the timeline they share.
///
/// Items are added incrementally; [`TimeSeriesSet::inflate`] then derives the
/// canonical `times` and the display `order`. Call it before reading either.
/// The set owns its series, mutate them in place via [`TimeSeriesSet::series_mut`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesSet {
    /// Name of the set.
    pub name: String,
    /// Whether new series hold float readings.
    pub is_float: bool,
    /// Interval shared by the member series, if bucketed.
    pub interval: Option<Interval>,
    pub(crate) series: BTreeMap<String, TimeSeries>,
    pub(crate) times: Vec<DateTime<Utc>>,
    pub(crate) order: Vec<String>,
}

impl TimeSeriesSet {
    /// Creates an empty set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates an empty set whose series are bucketed on `interval`.
    pub fn with_interval(name: impl Into<String>, interval: Interval) -> Self {
        Self {
            name: name.into(),
            interval: Some(interval),
            ..Self::default()
        }
    }

    pub(crate) fn empty_like(&self) -> Self {
        Self {
            name: self.name.clone(),
            is_float: self.is_float,
            interval: self.interval,
            series: BTreeMap::new(),
            times: Vec::new(),
            order: self.order.clone(),
        }
    }

    /// Routes an item into its named series, creating the series if needed.
    pub fn add_item(&mut self, item: TimeItem) {
        let mut item = item;
        if item.series_set_name.is_empty() {
            item.series_set_name.clone_from(&self.name);
        }
        self.times.push(item.time);
        let name = item.series_name.clone();
        let series = self.series.entry(name.clone()).or_insert_with(|| TimeSeries {
            series_set_name: self.name.clone(),
            is_float: self.is_float,
            interval: self.interval,
            ..TimeSeries::new(name)
        });
        series.add_item(item);
    }

    /// Routes every item in order.
    pub fn add_items(&mut self, items: impl IntoIterator<Item = TimeItem>) {
        for item in items {
            self.add_item(item);
        }
    }

    /// Adds a complete series. Fails if a series with the same name exists.
    pub fn add_series(&mut self, series: TimeSeries) -> Result<(), SeriesError> {
        if self.series.contains_key(&series.series_name) {
            return Err(SeriesError::SeriesNameCollision(series.series_name));
        }
        self.times.extend(series.items_sorted().map(|item| item.time));
        self.series.insert(series.series_name.clone(), series);
        Ok(())
    }

    /// Removes a series and its display order entry.
    ///
    /// `times` keeps the removed series' instants until the next
    /// [`Self::inflate`].
    pub fn remove_series(&mut self, name: &str) -> Result<TimeSeries, SeriesError> {
        let series = self
            .series
            .remove(name)
            .ok_or_else(|| SeriesError::SeriesNotFound(name.to_string()))?;
        self.order.retain(|n| n != name);
        Ok(series)
    }

    /// Derives `times` and `order`.
    ///
    /// `times` becomes the sorted, distinct union of every member series'
    /// instants. Series missing from `order` are appended to it in name
    /// order, so an explicit order set earlier is kept. Running it again
    /// changes nothing.
    pub fn inflate(&mut self) {
        let mut union: BTreeMap<String, DateTime<Utc>> = BTreeMap::new();
        for series in self.series.values() {
            for (key, item) in &series.item_map {
                union.entry(key.clone()).or_insert(item.time);
            }
        }
        self.times = union.into_values().collect();
        for name in self.series.keys() {
            if !self.order.contains(name) {
                self.order.push(name.clone());
            }
        }
        #[cfg(feature = "logging")]
        log::debug!(
            "set '{}': inflated {} series over {} times",
            self.name,
            self.series.len(),
            self.times.len()
        );
    }

    /// Sets the display order of the series.
    pub fn set_order<S: Into<String>>(&mut self, names: impl IntoIterator<Item = S>) {
        self.order = names.into_iter().map(Into::into).collect();
    }

    /// Returns the canonical times. Current only after [`Self::inflate`].
    pub fn times(&self) -> &[DateTime<Utc>] {
        &self.times
    }

    /// Returns the display order of the series.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Returns the named series.
    pub fn series(&self, name: &str) -> Option<&TimeSeries> {
        self.series.get(name)
    }

    /// Returns the named series for in-place mutation.
    pub fn series_mut(&mut self, name: &str) -> Option<&mut TimeSeries> {
        self.series.get_mut(name)
    }

    /// Returns the series names in ascending order.
    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// Returns the number of series.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Returns `true` if the set holds no series.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Looks up the item of series `name` at `time`.
    pub fn get_item(&self, name: &str, time: &DateTime<Utc>) -> Option<&TimeItem> {
        self.series.get(name).and_then(|series| series.get(time))
    }

    /// Looks up the item of series `name` under an RFC3339 key.
    pub fn get_item_by_key(&self, name: &str, key: &str) -> Option<&TimeItem> {
        self.series.get(name).and_then(|series| series.get_by_key(key))
    }

    /// Inserts zero items so every series has an item at every canonical time.
    pub fn align(&mut self) {
        for series in self.series.values_mut() {
            series.fill_missing(&self.times);
        }
    }

    /// Removes the chronologically last instant from every series and from `times`.
    ///
    /// Returns the removed instant.
    pub fn pop_last(&mut self) -> Result<DateTime<Utc>, SeriesError> {
        let last = self
            .series
            .values()
            .filter_map(|series| series.last().ok())
            .map(|item| item.time)
            .max()
            .ok_or_else(|| SeriesError::EmptySeries(self.name.clone()))?;
        self.delete_by_time(&last);
        #[cfg(feature = "logging")]
        log::debug!("set '{}': dropped trailing period {}", self.name, time_key(&last));
        Ok(last)
    }

    /// Removes `time` from every series and from `times`.
    ///
    /// Returns the number of items removed.
    pub fn delete_by_time(&mut self, time: &DateTime<Utc>) -> usize {
        let key = time_key(time);
        let removed = self
            .series
            .values_mut()
            .filter_map(|series| series.item_map.remove(&key))
            .count();
        self.times.retain(|t| time_key(t) != key);
        removed
    }

    /// Rebuilds every series onto one canonical, zero-filled grid.
    pub fn to_interval(
        &self,
        interval: Interval,
        week_start: Weekday,
    ) -> Result<TimeSeriesSet, SeriesError> {
        let intervals = SeriesIntervals::for_set(interval, week_start, self)?;
        Ok(intervals.normalize_set(self))
    }

    /// Rebuilds every series onto one canonical monthly grid.
    pub fn to_month(&self) -> Result<TimeSeriesSet, SeriesError> {
        self.to_interval(Interval::Month, DEFAULT_WEEK_START)
    }

    /// Renders the set as a matrix: one row per canonical time, one column per
    /// series in display order. Missing values render as zero.
    pub fn to_table(&self) -> Table {
        let mut columns = Vec::with_capacity(self.order.len() + 1);
        columns.push(String::from("Time"));
        columns.extend(self.order.iter().cloned());

        let rows = self
            .times
            .iter()
            .map(|time| {
                let mut row = Vec::with_capacity(columns.len());
                row.push(Cell::Time(*time));
                for name in &self.order {
                    row.push(self.value_cell(name, time));
                }
                row
            })
            .collect();
        Table { columns, rows }
    }

    /// Returns the value of series `name` at `time` as a cell, zero when absent.
    pub(crate) fn value_cell(&self, name: &str, time: &DateTime<Utc>) -> Cell {
        let is_float = self.series.get(name).map_or(self.is_float, |s| s.is_float);
        match self.get_item(name, time) {
            Some(item) if is_float => Cell::Float(item.value_float),
            Some(item) => Cell::Int(item.value),
            None if is_float => Cell::Float(0.0),
            None => Cell::Int(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ymd(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn sample_set() -> TimeSeriesSet {
        let mut set = TimeSeriesSet::new("sales");
        set.add_items([
            TimeItem::new_int("west", ymd(2024, 2, 1), 4),
            TimeItem::new_int("east", ymd(2024, 1, 1), 1),
            TimeItem::new_int("east", ymd(2024, 2, 1), 2),
            TimeItem::new_int("west", ymd(2024, 2, 1), 1),
        ]);
        set
    }

    #[test]
    fn test_add_items_routes_and_defers_dedup() {
        let set = sample_set();
        assert_eq!(set.len(), 2);
        assert_eq!(set.times().len(), 4);
        assert_eq!(set.get_item("west", &ymd(2024, 2, 1)).unwrap().value, 5);
        assert_eq!(set.series("east").unwrap().series_set_name, "sales");
        assert_eq!(set.get_item("east", &ymd(2024, 1, 1)).unwrap().series_set_name, "sales");
    }

    #[test]
    fn test_inflate_is_idempotent() {
        let mut set = sample_set();
        set.inflate();
        let times = set.times().to_vec();
        let order = set.order().to_vec();
        set.inflate();
        assert_eq!(set.times(), times.as_slice());
        assert_eq!(set.order(), order.as_slice());
        assert_eq!(times, vec![ymd(2024, 1, 1), ymd(2024, 2, 1)]);
        assert_eq!(order, vec!["east", "west"]);
    }

    #[test]
    fn test_explicit_order_survives_inflate() {
        let mut set = sample_set();
        set.set_order(["west", "east"]);
        set.inflate();
        assert_eq!(set.order(), ["west", "east"]);
    }

    #[test]
    fn test_add_series_collision() {
        let mut set = sample_set();
        let err = set.add_series(TimeSeries::new("east")).unwrap_err();
        assert_eq!(err, SeriesError::SeriesNameCollision(String::from("east")));
        assert!(set.add_series(TimeSeries::new("north")).is_ok());
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_remove_series() {
        let mut set = sample_set();
        set.inflate();
        assert_eq!(set.remove_series("east").unwrap().len(), 2);
        assert_eq!(set.order(), ["west"]);
        assert_eq!(
            set.remove_series("east"),
            Err(SeriesError::SeriesNotFound(String::from("east")))
        );
        set.inflate();
        assert_eq!(set.times(), [ymd(2024, 2, 1)]);
    }

    #[test]
    fn test_align_fills_every_time() {
        let mut set = sample_set();
        set.inflate();
        assert!(set.get_item("west", &ymd(2024, 1, 1)).is_none());
        set.align();
        assert_eq!(set.get_item("west", &ymd(2024, 1, 1)).unwrap().value, 0);
        assert_eq!(set.series("west").unwrap().len(), 2);
    }

    #[test]
    fn test_pop_last_and_delete() {
        let mut set = sample_set();
        set.inflate();
        assert_eq!(set.pop_last().unwrap(), ymd(2024, 2, 1));
        assert_eq!(set.times(), [ymd(2024, 1, 1)]);
        assert!(set.series("west").unwrap().is_empty());

        assert_eq!(set.delete_by_time(&ymd(2024, 1, 1)), 1);
        assert!(set.times().is_empty());
        assert_eq!(
            set.pop_last(),
            Err(SeriesError::EmptySeries(String::from("sales")))
        );
    }

    #[test]
    fn test_lookup_by_key() {
        let set = sample_set();
        let item = set.get_item_by_key("east", "2024-02-01T00:00:00Z").unwrap();
        assert_eq!(item.value, 2);
        assert!(set.get_item_by_key("south", "2024-02-01T00:00:00Z").is_none());
    }

    #[test]
    fn test_to_table() {
        let mut set = sample_set();
        set.inflate();
        let table = set.to_table();
        assert_eq!(table.columns, vec!["Time", "east", "west"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(
            table.rows[0],
            vec![Cell::Time(ymd(2024, 1, 1)), Cell::Int(1), Cell::Int(0)]
        );
        assert_eq!(
            table.rows[1],
            vec![Cell::Time(ymd(2024, 2, 1)), Cell::Int(2), Cell::Int(5)]
        );
    }

    #[test]
    fn test_to_month_shares_grid() {
        let mut set = TimeSeriesSet::new("visits");
        set.add_item(TimeItem::new_int("a", ymd(2024, 1, 9), 1));
        set.add_item(TimeItem::new_int("b", ymd(2024, 4, 2), 1));
        let monthly = set.to_month().unwrap();
        assert_eq!(monthly.times().len(), 4);
        assert_eq!(monthly.series("a").unwrap().len(), 4);
        assert_eq!(monthly.series("b").unwrap().len(), 4);
        assert_eq!(monthly.interval, Some(Interval::Month));

        assert_eq!(TimeSeriesSet::new("empty").to_month(), Err(SeriesError::NoEndpoints));
    }
}
