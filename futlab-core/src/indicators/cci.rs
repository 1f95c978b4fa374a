//! Commodity Channel Index (CCI).
//!
//! tp = (high + low + close) / 3
//! CCI[t] = (tp[t] - mean(tp)) / (0.015 * mean(|tp - mean(tp)|))
//! where both means run over the same `period`-bar window ending at t.
//! A flat window (zero mean deviation) yields 0.
//! Lookback: period - 1.

use super::sma::rolling_mean;
use super::{ensure_defined, validate_period};
use crate::error::CoreError;

const CCI_SCALE: f64 = 0.015;

#[derive(Debug, Clone)]
pub struct Cci {
    period: usize,
    name: String,
}

impl Cci {
    pub fn new(period: usize) -> Result<Self, CoreError> {
        validate_period("length", period)?;
        Ok(Self {
            period,
            name: format!("cci_{period}"),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lookback(&self) -> usize {
        self.period - 1
    }

    pub fn compute(&self, high: &[f64], low: &[f64], close: &[f64]) -> Result<Vec<f64>, CoreError> {
        let typical: Vec<f64> = high
            .iter()
            .zip(low)
            .zip(close)
            .map(|((h, l), c)| (h + l + c) / 3.0)
            .collect();
        let mean = rolling_mean(&typical, self.period);

        let mut result = vec![f64::NAN; typical.len()];
        for i in 0..typical.len() {
            if mean[i].is_nan() {
                continue;
            }
            let window = &typical[(i + 1 - self.period)..=i];
            let mean_dev =
                window.iter().map(|tp| (tp - mean[i]).abs()).sum::<f64>() / self.period as f64;
            result[i] = if mean_dev > 0.0 {
                (typical[i] - mean[i]) / (CCI_SCALE * mean_dev)
            } else {
                0.0
            };
        }

        ensure_defined(&self.name, result, self.period)
    }
}

pub fn cci(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Result<Vec<f64>, CoreError> {
    Cci::new(period)?.compute(high, low, close)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::assert_approx;

    #[test]
    fn cci_of_linear_ramp() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let result = cci(&x, &x, &x, 3).unwrap();
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        // tp window [1,2,3]: mean 2, mean dev 2/3, (3-2)/(0.015*2/3) = 100
        assert_approx(result[2], 100.0, 1e-9);
        assert_approx(result[3], 100.0, 1e-9);
    }

    #[test]
    fn cci_is_negative_in_downtrend() {
        let x = [5.0, 4.0, 3.0];
        let result = cci(&x, &x, &x, 3).unwrap();
        assert_approx(result[2], -100.0, 1e-9);
    }

    #[test]
    fn flat_window_is_zero() {
        let x = [2.0, 2.0, 2.0, 3.0];
        let result = cci(&x, &x, &x, 3).unwrap();
        assert_eq!(result[2], 0.0);
        assert!(result[3] > 0.0);
    }

    #[test]
    fn flat_series_is_defined_after_warmup() {
        let x = [100.0; 50];
        let result = cci(&x, &x, &x, 5).unwrap();
        assert!(result[..4].iter().all(|v| v.is_nan()));
        assert!(result[4..].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn input_cannot_be_shorter_than_window() {
        let high = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let low = [3.0, 5.0, 7.0, 9.0, 10.0, 2.0, 3.0];
        let close = [5.0, 6.0, 7.0, 9.0, 1.0, 10.0, 5.0];
        assert!(matches!(
            cci(&high, &low, &close, 20),
            Err(CoreError::InsufficientData { .. })
        ));
    }
}
