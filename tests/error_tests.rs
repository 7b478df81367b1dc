use interval_series::{Interval, SeriesError, TimeSeries, TimeSeriesSet};

#[test]
fn test_interval_error_display() {
    let err = "fortnight".parse::<Interval>().unwrap_err();
    let display = format!("{}", err);
    assert!(display.contains("fortnight"));

    let err = TimeSeries::with_interval("q", Interval::Week)
        .linear_regression()
        .unwrap_err();
    let display = format!("{}", err);
    assert!(display.contains("week"));
    assert!(display.contains("linear_regression"));
}

#[test]
fn test_set_error_display() {
    let err = SeriesError::SeriesNameCollision(String::from("revenue"));
    let display = format!("{}", err);
    assert!(display.contains("revenue"));

    let err = SeriesError::SeriesNotFound(String::from("costs"));
    let display = format!("{}", err);
    assert!(display.contains("costs"));

    let err = SeriesError::EmptySeries(String::from("visits"));
    let display = format!("{}", err);
    assert!(display.contains("visits"));
}

#[test]
fn test_parse_error_display() {
    let err = SeriesError::ParseTime {
        input: String::from("yesterday"),
        reason: String::from("input contains invalid characters"),
    };
    let display = format!("{}", err);
    assert!(display.contains("yesterday"));
    assert!(display.contains("invalid characters"));

    let err = SeriesError::InsufficientData { needed: 2, found: 0 };
    let display = format!("{}", err);
    assert!(display.contains('2'));
    assert!(display.contains('0'));
}

#[test]
fn test_error_is_std_error() {
    let err: Box<dyn std::error::Error + Send + Sync> = Box::new(SeriesError::NoEndpoints);
    assert!(err.to_string().contains("endpoints"));
    assert!(err.source().is_none());
}

#[test]
fn test_error_propagates_with_anyhow() {
    fn month_of_empty_set() -> anyhow::Result<usize> {
        let set = TimeSeriesSet::new("empty").to_month()?;
        Ok(set.times().len())
    }
    let err = month_of_empty_set().unwrap_err();
    assert_eq!(
        err.downcast_ref::<SeriesError>(),
        Some(&SeriesError::NoEndpoints)
    );
}
