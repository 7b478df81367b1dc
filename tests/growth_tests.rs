use chrono::{DateTime, TimeZone, Utc};
use interval_series::{
    DEFAULT_WEEK_START, Interval, SeriesError, TimeItem, TimeSeries, TimeSeriesSet, XoxGrowth,
    yoy_qoq_growth,
};

fn ymd(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

#[test]
fn test_year_projection_constant_growth() -> anyhow::Result<()> {
    let mut ts = TimeSeries::with_interval("revenue", Interval::Year);
    for (year, value) in [(2021, 100), (2022, 110), (2023, 121)] {
        ts.add_int64(ymd(year, 1, 1), value);
    }
    let projected = ts.linear_regression_year_projection(1, true)?;
    let next = projected
        .value_f64_at(&ymd(2024, 1, 1))
        .ok_or_else(|| anyhow::anyhow!("no projected year"))?;
    assert!((next - 133.1).abs() < 1e-9);
    assert_eq!(projected.len(), 4);
    Ok(())
}

#[test]
fn test_projection_from_raw_observations() -> anyhow::Result<()> {
    let mut ts = TimeSeries::new("revenue");
    ts.add_int64(ymd(2022, 3, 1), 40);
    ts.add_int64(ymd(2022, 9, 1), 60);
    ts.add_int64(ymd(2023, 5, 1), 150);

    assert!(matches!(
        ts.linear_regression_year_projection(1, false),
        Err(SeriesError::IntervalNotSupported { .. })
    ));

    let yearly = ts.to_year(true);
    let projected = yearly.linear_regression_year_projection(1, true)?;
    assert_eq!(projected.value_f64_at(&ymd(2024, 1, 1)), Some(225.0));
    Ok(())
}

#[test]
fn test_monthly_trend() -> anyhow::Result<()> {
    let mut raw = TimeSeries::new("signups");
    for month in 1..=6 {
        raw.add_int64(ymd(2024, month, 15), i64::from(month) * 10);
    }
    let (_, beta) = raw.to_month(true).linear_regression()?;
    assert!((beta - 10.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_xox_on_gap_filled_series() {
    let mut raw = TimeSeries::new("orders");
    raw.add_int64(ymd(2023, 1, 5), 50);
    raw.add_int64(ymd(2024, 1, 9), 75);
    raw.add_int64(ymd(2024, 2, 2), 30);
    let monthly = raw.to_month(true);
    assert_eq!(monthly.len(), 14);

    let growth = XoxGrowth::new(&monthly);
    assert_eq!(growth.series_name(), "orders");
    let jan = growth.get(&ymd(2024, 1, 1)).unwrap();
    assert!((jan.yoy - 0.5).abs() < 1e-12);
    // December 2023 is a zero-filled month.
    assert_eq!(jan.mom, 0.0);
    let feb = growth.last().unwrap();
    assert!((feb.mom + 0.6).abs() < 1e-12);
    assert!(growth.points().all(|p| p.mom.is_finite() && p.yoy.is_finite()));
}

#[test]
fn test_xox_on_quarterly_series() {
    let mut raw = TimeSeries::new("orders");
    raw.add_int64(ymd(2023, 11, 20), 40);
    raw.add_int64(ymd(2024, 2, 3), 30);
    raw.add_int64(ymd(2024, 3, 9), 30);
    let quarterly = raw.to_quarter(true);
    assert_eq!(quarterly.interval, Some(Interval::Quarter));

    let growth = XoxGrowth::new(&quarterly);
    let q1 = growth.get(&ymd(2024, 1, 1)).unwrap();
    assert!((q1.mom - 0.5).abs() < 1e-12);
    assert!((q1.qoq - 0.5).abs() < 1e-12);
}

#[test]
fn test_xox_on_weekly_series() {
    let mut raw = TimeSeries::new("signups");
    raw.add_int64(ymd(2024, 1, 3), 20);
    raw.add_int64(ymd(2024, 1, 10), 10);
    raw.add_int64(ymd(2024, 1, 11), 20);
    let weekly = raw.to_interval(Interval::Week, DEFAULT_WEEK_START, true);
    let growth = XoxGrowth::new(&weekly);
    assert_eq!(growth.len(), 2);
    assert!((growth.last().unwrap().mom - 0.5).abs() < 1e-12);
}

#[test]
fn test_xox_for_set() {
    let mut set = TimeSeriesSet::new("regions");
    set.add_items([
        TimeItem::new_int("north", ymd(2024, 1, 1), 10),
        TimeItem::new_int("north", ymd(2024, 2, 1), 20),
        TimeItem::new_int("south", ymd(2024, 2, 1), 5),
    ]);
    let monthly = set.to_month().unwrap();
    let growth = XoxGrowth::for_set(&monthly);
    assert_eq!(growth.len(), 2);
    assert!((growth["north"].last().unwrap().mom - 1.0).abs() < 1e-12);
    assert_eq!(growth["south"].last().unwrap().mom, 0.0);
}

#[test]
fn test_ytd_and_qtd() {
    let mut set = TimeSeriesSet::new("bookings");
    set.add_items([
        TimeItem::new_int("a", ymd(2023, 2, 1), 20),
        TimeItem::new_int("a", ymd(2024, 2, 1), 30),
        TimeItem::new_int("a", ymd(2024, 4, 2), 9),
    ]);
    let growth = yoy_qoq_growth(&set, ymd(2024, 5, 15));
    assert_eq!(growth.ytd_current, 39.0);
    assert_eq!(growth.ytd_prior, 20.0);
    assert!((growth.yoy - 0.95).abs() < 1e-12);
    assert_eq!(growth.qtd_current, 9.0);
    assert_eq!(growth.qtd_prior, 30.0);
    assert!((growth.qoq + 0.7).abs() < 1e-12);
}
