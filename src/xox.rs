//! Period-over-period growth (MoM, QoQ, YoY).
//!
//! Comparisons look up the point exactly one interval, three months and
//! twelve months earlier by key, so the input should be gap-filled (see
//! [`TimeSeries::to_month`]). Weekly series compare against 13 and 52 weeks
//! earlier instead. A missing or zero comparison point leaves the delta at
//! `0.0`; it is never an error.
//!
//! Deltas here are percent changes, `(now - past) / past`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interval::{DEFAULT_WEEK_START, Interval, time_key};
use crate::report::{Cell, Table};
use crate::series::TimeSeries;
use crate::set::TimeSeriesSet;

/// Growth figures for one canonical time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XoxPoint {
    /// Canonical time.
    pub time: DateTime<Utc>,
    /// Reading at `time`.
    pub value: f64,
    /// Sum of the readings over the quarter ending at `time`.
    pub aggregate_quarter: f64,
    /// Sum of the readings over the year ending at `time`.
    pub aggregate_year: f64,
    /// Change against the reading one interval earlier (one month for raw
    /// series).
    pub mom: f64,
    /// Change against the reading three months (13 weeks) earlier.
    pub qoq: f64,
    /// Change against the reading twelve months (52 weeks) earlier.
    pub yoy: f64,
    /// Change of `aggregate_quarter` against its value three months earlier.
    pub qoq_aggregate: f64,
    /// Change of `aggregate_year` against its value twelve months earlier.
    pub yoy_aggregate: f64,
}

/// Growth figures for every point of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XoxGrowth {
    series_name: String,
    points: BTreeMap<String, XoxPoint>,
}

fn delta(now: f64, past: Option<f64>) -> f64 {
    match past {
        Some(p) if p != 0.0 => (now - p) / p,
        _ => 0.0,
    }
}

fn months_before(time: DateTime<Utc>, months: u32) -> Option<DateTime<Utc>> {
    Interval::Month.add(time, -i32::try_from(months).ok()?)
}

/// Whole weeks standing in for a span of months: 1 -> 4, 3 -> 13, 12 -> 52.
fn weeks_in(months: u32) -> u32 {
    months * 52 / 12
}

/// Instant `months` before `time` on the grid of `interval`.
fn period_before(
    interval: Option<Interval>,
    time: DateTime<Utc>,
    months: u32,
) -> Option<DateTime<Utc>> {
    match interval {
        Some(Interval::Week) => Interval::Week.add(time, -i32::try_from(weeks_in(months)).ok()?),
        _ => months_before(time, months),
    }
}

/// Sum of the readings over the `months` ending at `time`, stepped on the series interval.
fn trailing_sum(series: &TimeSeries, time: DateTime<Utc>, months: u32) -> f64 {
    match series.interval {
        Some(Interval::Week) => (0..weeks_in(months))
            .filter_map(|back| Interval::Week.add(time, -i32::try_from(back).ok()?))
            .filter_map(|t| series.value_f64_at(&t))
            .sum(),
        _ => aggregate_prior_months(series, time, months),
    }
}

/// Sums the readings at `time` and the `months - 1` monthly keys before it.
///
/// Missing months contribute nothing.
pub fn aggregate_prior_months(series: &TimeSeries, time: DateTime<Utc>, months: u32) -> f64 {
    (0..months)
        .filter_map(|back| months_before(time, back))
        .filter_map(|t| series.value_f64_at(&t))
        .sum()
}

impl XoxGrowth {
    /// Computes growth figures for every item of `series`.
    ///
    /// The first comparison steps back one `series.interval`; raw series
    /// without an interval step back one month.
    pub fn new(series: &TimeSeries) -> Self {
        let interval = series.interval;
        let points = series
            .items_sorted()
            .map(|item| {
                let time = item.time;
                let value = item.value_f64();
                let past = |months: u32| {
                    period_before(interval, time, months).and_then(|t| series.value_f64_at(&t))
                };
                let previous = match interval {
                    Some(interval) => interval.add(time, -1),
                    None => months_before(time, 1),
                }
                .and_then(|t| series.value_f64_at(&t));
                let past_aggregate = |months: u32| {
                    period_before(interval, time, months)
                        .filter(|t| series.contains_time(t))
                        .map(|t| trailing_sum(series, t, months))
                };
                let aggregate_quarter = trailing_sum(series, time, 3);
                let aggregate_year = trailing_sum(series, time, 12);
                let point = XoxPoint {
                    time,
                    value,
                    aggregate_quarter,
                    aggregate_year,
                    mom: delta(value, previous),
                    qoq: delta(value, past(3)),
                    yoy: delta(value, past(12)),
                    qoq_aggregate: delta(aggregate_quarter, past_aggregate(3)),
                    yoy_aggregate: delta(aggregate_year, past_aggregate(12)),
                };
                (time_key(&time), point)
            })
            .collect();
        Self {
            series_name: series.series_name.clone(),
            points,
        }
    }

    /// Computes growth figures for every series of `set`, keyed by series name.
    pub fn for_set(set: &TimeSeriesSet) -> BTreeMap<String, XoxGrowth> {
        set.series
            .iter()
            .map(|(name, series)| (name.clone(), Self::new(series)))
            .collect()
    }

    /// Returns the name of the source series.
    pub fn series_name(&self) -> &str {
        &self.series_name
    }

    /// Returns the points in chronological order.
    pub fn points(&self) -> impl Iterator<Item = &XoxPoint> {
        self.points.values()
    }

    /// Returns the point at `time`.
    pub fn get(&self, time: &DateTime<Utc>) -> Option<&XoxPoint> {
        self.points.get(&time_key(time))
    }

    /// Returns the most recent point.
    pub fn last(&self) -> Option<&XoxPoint> {
        self.points.values().next_back()
    }

    /// Returns the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if there are no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Renders one row per point.
    pub fn to_table(&self) -> Table {
        let columns = [
            "Time",
            "Value",
            "MoM",
            "QoQ",
            "YoY",
            "Aggregate Quarter",
            "QoQ Aggregate",
            "Aggregate Year",
            "YoY Aggregate",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        let rows = self
            .points
            .values()
            .map(|p| {
                vec![
                    Cell::Time(p.time),
                    Cell::Float(p.value),
                    Cell::Float(p.mom),
                    Cell::Float(p.qoq),
                    Cell::Float(p.yoy),
                    Cell::Float(p.aggregate_quarter),
                    Cell::Float(p.qoq_aggregate),
                    Cell::Float(p.aggregate_year),
                    Cell::Float(p.yoy_aggregate),
                ]
            })
            .collect();
        Table { columns, rows }
    }
}

/// Year-to-date and quarter-to-date totals across every series of a set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YoyQoqGrowth {
    /// Reference instant.
    pub now: DateTime<Utc>,
    /// Sum from the start of `now`'s year through `now`.
    pub ytd_current: f64,
    /// Same span one year earlier.
    pub ytd_prior: f64,
    /// Change of `ytd_current` against `ytd_prior`.
    pub yoy: f64,
    /// Sum from the start of `now`'s quarter through `now`.
    pub qtd_current: f64,
    /// Same span one quarter earlier.
    pub qtd_prior: f64,
    /// Change of `qtd_current` against `qtd_prior`.
    pub qoq: f64,
}

fn in_span(time: DateTime<Utc>, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> bool {
    matches!((start, end), (Some(s), Some(e)) if s <= time && time <= e)
}

/// Compares year-to-date and quarter-to-date sums against the same spans of
/// the prior year and quarter, summing every item of every series.
pub fn yoy_qoq_growth(set: &TimeSeriesSet, now: DateTime<Utc>) -> YoyQoqGrowth {
    let year_start = Interval::Year.start_of(now, DEFAULT_WEEK_START);
    let quarter_start = Interval::Quarter.start_of(now, DEFAULT_WEEK_START);
    let prior_year_start = Interval::Year.add(year_start, -1);
    let prior_year_now = months_before(now, 12);
    let prior_quarter_start = Interval::Quarter.add(quarter_start, -1);
    let prior_quarter_now = months_before(now, 3);

    let mut growth = YoyQoqGrowth {
        now,
        ytd_current: 0.0,
        ytd_prior: 0.0,
        yoy: 0.0,
        qtd_current: 0.0,
        qtd_prior: 0.0,
        qoq: 0.0,
    };
    for item in set.series.values().flat_map(TimeSeries::items_sorted) {
        let time = item.time;
        let value = item.value_f64();
        if in_span(time, Some(year_start), Some(now)) {
            growth.ytd_current += value;
        }
        if in_span(time, prior_year_start, prior_year_now) {
            growth.ytd_prior += value;
        }
        if in_span(time, Some(quarter_start), Some(now)) {
            growth.qtd_current += value;
        }
        if in_span(time, prior_quarter_start, prior_quarter_now) {
            growth.qtd_prior += value;
        }
    }
    growth.yoy = delta(growth.ytd_current, Some(growth.ytd_prior));
    growth.qoq = delta(growth.qtd_current, Some(growth.qtd_prior));
    growth
}
