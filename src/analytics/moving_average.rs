//! Trailing-window moving averages
//!
//! Windows are positional: the average at index `i` covers the `window`
//! observations ending at `i`, whatever their calendar spacing. A missing
//! day in the source therefore does not widen the window.

use super::error::{AnalyticsError, AnalyticsResult};
use crate::models::SeriesPoint;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Moving average value at one position of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingAveragePoint {
    pub date: NaiveDate,

    /// `None` until `window` observations are available
    pub value: Option<f64>,
}

/// Compute the trailing mean over `window` positions for every point
///
/// The output has the same length as `series`; the first `window - 1`
/// positions are `None`.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidWindowSize`] if `window` is 0.
pub fn moving_average(
    series: &[SeriesPoint],
    window: usize,
) -> AnalyticsResult<Vec<MovingAveragePoint>> {
    if window == 0 {
        return Err(AnalyticsError::InvalidWindowSize(window));
    }

    let points = series
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let value = (i + 1 >= window).then(|| {
                let sum: f64 = series[i + 1 - window..=i].iter().map(|p| p.ratio).sum();
                sum / window as f64
            });
            MovingAveragePoint {
                date: point.date,
                value,
            }
        })
        .collect();

    Ok(points)
}

/// Moving average at the last position only
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidWindowSize`] if `window` is 0.
pub fn latest_moving_average(
    series: &[SeriesPoint],
    window: usize,
) -> AnalyticsResult<Option<f64>> {
    if window == 0 {
        return Err(AnalyticsError::InvalidWindowSize(window));
    }
    if series.len() < window {
        return Ok(None);
    }

    let tail = &series[series.len() - window..];
    let sum: f64 = tail.iter().map(|p| p.ratio).sum();
    Ok(Some(sum / window as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn series(ratios: &[f64]) -> Vec<SeriesPoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ratios
            .iter()
            .enumerate()
            .map(|(i, &ratio)| SeriesPoint {
                date: start + Duration::days(i as i64),
                ratio,
            })
            .collect()
    }

    #[test]
    fn test_moving_average_basic() {
        let ma = moving_average(&series(&[10.0, 20.0, 30.0, 40.0]), 3).unwrap();

        assert_eq!(ma.len(), 4);
        assert_eq!(ma[0].value, None);
        assert_eq!(ma[1].value, None);
        assert!((ma[2].value.unwrap() - 20.0).abs() < 1e-9);
        assert!((ma[3].value.unwrap() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_window_larger_than_series() {
        let ma = moving_average(&series(&[1.0, 2.0]), 7).unwrap();
        assert_eq!(ma.len(), 2);
        assert!(ma.iter().all(|p| p.value.is_none()));
    }

    #[test]
    fn test_window_of_one_is_identity() {
        let ma = moving_average(&series(&[4.0, 0.0, 9.0]), 1).unwrap();
        let values: Vec<_> = ma.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![Some(4.0), Some(0.0), Some(9.0)]);
    }

    #[test]
    fn test_zero_window_rejected() {
        assert_eq!(
            moving_average(&series(&[1.0]), 0),
            Err(AnalyticsError::InvalidWindowSize(0))
        );
        assert!(latest_moving_average(&series(&[1.0]), 0).is_err());
    }

    #[test]
    fn test_gap_is_positional() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        // Day 2 is missing
        let points = vec![
            SeriesPoint { date: start, ratio: 2.0 },
            SeriesPoint { date: start + Duration::days(2), ratio: 4.0 },
        ];
        let ma = moving_average(&points, 2).unwrap();
        assert_eq!(ma[1].value, Some(3.0));
    }

    #[test]
    fn test_latest_matches_full_computation() {
        let s = series(&(1..=30).map(f64::from).collect::<Vec<_>>());
        let full = moving_average(&s, 7).unwrap();
        assert_eq!(latest_moving_average(&s, 7).unwrap(), full.last().unwrap().value);
        assert_eq!(latest_moving_average(&s, 31).unwrap(), None);
    }
}
