//! Ordinary least-squares trend fitting and yearly projection.

use chrono::{DateTime, Datelike, Utc};

use crate::error::SeriesError;
use crate::interval::{Interval, month_index};
use crate::series::TimeSeries;

/// Fits `y = alpha + beta * x`, returning `(alpha, beta)`.
fn fit(points: &[(f64, f64)]) -> Result<(f64, f64), SeriesError> {
    if points.len() < 2 {
        return Err(SeriesError::InsufficientData {
            needed: 2,
            found: points.len(),
        });
    }
    #[allow(clippy::cast_precision_loss)]
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;
    let (sxx, sxy) = points.iter().fold((0.0, 0.0), |(sxx, sxy), (x, y)| {
        let dx = x - mean_x;
        (sxx + dx * dx, sxy + dx * (y - mean_y))
    });
    if sxx == 0.0 {
        // Every point shares one x value.
        return Err(SeriesError::InsufficientData {
            needed: 2,
            found: 1,
        });
    }
    let beta = sxy / sxx;
    Ok((mean_y - beta * mean_x, beta))
}

#[allow(clippy::cast_precision_loss)]
fn month_axis(time: DateTime<Utc>) -> f64 {
    month_index(time) as f64
}

fn year_axis(time: DateTime<Utc>) -> f64 {
    f64::from(time.year())
}

impl TimeSeries {
    /// Fits a straight line through the series by ordinary least squares.
    ///
    /// Returns `(alpha, beta)`, the intercept and slope. For monthly series
    /// the x axis is the continuous month index (`year * 12 + month0`), for
    /// yearly series it is the calendar year. Other intervals are rejected.
    pub fn linear_regression(&self) -> Result<(f64, f64), SeriesError> {
        let axis: fn(DateTime<Utc>) -> f64 = match self.interval {
            Some(Interval::Month) => month_axis,
            Some(Interval::Year) => year_axis,
            other => {
                return Err(SeriesError::IntervalNotSupported {
                    operation: "linear_regression",
                    interval: other,
                });
            }
        };
        let points: Vec<(f64, f64)> = self
            .items_sorted()
            .map(|item| (axis(item.time), item.value_f64()))
            .collect();
        fit(&points)
    }

    /// Projects a yearly series `years` years past its last point.
    ///
    /// Returns a float series holding the original points followed by the
    /// projections. Without `constant_yoy` each projected year is the fitted
    /// line at that year. With it, each projected year grows the previous one
    /// by the last observed year-over-year rate, which requires a non-zero
    /// value for the year before the last one.
    pub fn linear_regression_year_projection(
        &self,
        years: u32,
        constant_yoy: bool,
    ) -> Result<TimeSeries, SeriesError> {
        if self.interval != Some(Interval::Year) {
            return Err(SeriesError::IntervalNotSupported {
                operation: "linear_regression_year_projection",
                interval: self.interval,
            });
        }
        let (alpha, beta) = self.linear_regression()?;
        let last = self.last()?;
        let last_value = last.value_f64();

        let growth = if constant_yoy {
            let prior = Interval::Year
                .add(last.time, -1)
                .and_then(|t| self.value_f64_at(&t))
                .filter(|v| *v != 0.0)
                .ok_or(SeriesError::MissingPriorYear(last.time.year()))?;
            Some(last_value / prior)
        } else {
            None
        };
        #[cfg(feature = "logging")]
        log::debug!(
            "projecting '{}' {years} years: alpha={alpha} beta={beta} growth={growth:?}",
            self.series_name
        );

        let mut out = self.empty_like();
        out.is_float = true;
        for item in self.items_sorted() {
            out.add_float64(item.time, item.value_f64());
        }

        let mut previous = last_value;
        for step in 1..=years {
            let Some(time) = i32::try_from(step)
                .ok()
                .and_then(|step| Interval::Year.add(last.time, step))
            else {
                break;
            };
            let value = match growth {
                Some(rate) => previous * rate,
                None => alpha + beta * year_axis(time),
            };
            out.add_float64(time, value);
            previous = value;
        }
        Ok(out)
    }
}
