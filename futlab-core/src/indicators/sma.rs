//! Simple Moving Average (SMA).
//!
//! Rolling arithmetic mean over exactly `period` trailing values.
//! Lookback: period - 1 (first valid value at index period-1).

use super::{ensure_defined, validate_period, Indicator};
use crate::error::CoreError;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, CoreError> {
        validate_period("length", period)?;
        Ok(Self {
            period,
            name: format!("sma_{period}"),
        })
    }
}

/// Rolling mean without the all-NaN check. Used by indicators that
/// post-process the mean before deciding whether anything is defined.
pub(crate) fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    let mut sum = 0.0;
    let mut nan_count = 0usize;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            nan_count += 1;
        } else {
            sum += v;
        }
        if i >= period {
            let leaving = values[i - period];
            if leaving.is_nan() {
                nan_count -= 1;
            } else {
                sum -= leaving;
            }
        }
        if i + 1 >= period && nan_count == 0 {
            result[i] = sum / period as f64;
        }
    }

    result
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, values: &[f64]) -> Result<Vec<f64>, CoreError> {
        ensure_defined(&self.name, rolling_mean(values, self.period), self.period)
    }
}

/// Convenience wrapper: `Sma::new(period)?.compute(values)`.
pub fn sma(values: &[f64], period: usize) -> Result<Vec<f64>, CoreError> {
    Sma::new(period)?.compute(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let result = sma(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0], 5).unwrap();

        assert_eq!(result.len(), 7);
        for (i, v) in result.iter().enumerate().take(4) {
            assert!(v.is_nan(), "expected NaN at index {i}");
        }
        // SMA[4] = mean(10,11,12,13,14) = 12.0
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        assert_approx(result[5], 13.0, DEFAULT_EPSILON);
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_identity() {
        let result = sma(&[100.0, 200.0, 300.0], 1).unwrap();
        assert_eq!(result, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn sma_nan_propagation() {
        let result = sma(&[10.0, 11.0, f64::NAN, 13.0, 14.0, 15.0], 3).unwrap();
        // Windows touching index 2 are NaN
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        assert_approx(result[5], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_window_longer_than_series_fails() {
        let err = sma(&[10.0, 11.0], 5).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientData {
                indicator: "sma_5".into(),
                required: 5,
                available: 2,
            }
        );
    }

    #[test]
    fn sma_window_equal_to_series_has_one_value() {
        let result = sma(&[1.0, 2.0, 3.0, 4.0], 4).unwrap();
        let defined: Vec<usize> = (0..4).filter(|&i| !result[i].is_nan()).collect();
        assert_eq!(defined, vec![3]);
        assert_approx(result[3], 2.5, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_lookback() {
        assert_eq!(Sma::new(20).unwrap().lookback(), 19);
        assert_eq!(Sma::new(1).unwrap().lookback(), 0);
    }

    #[test]
    fn sma_zero_period_rejected() {
        assert!(matches!(
            Sma::new(0),
            Err(CoreError::InvalidParameter { .. })
        ));
    }
}
