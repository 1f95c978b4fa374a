//! Exponential smoothing.
//!
//! Recursive: v[t] = alpha * x[t] + (1 - alpha) * v[t-1], seeded with the
//! first defined input (v[seed] = x[seed]). Two parameterisations:
//! - classic EMA: alpha = 2 / (period + 1)
//! - generalised smoothing ("SMA(x, n, m)"): alpha = weight / period
//!
//! A NaN input after the seed carries the previous value forward instead of
//! poisoning the rest of the series.
//! Lookback: 0 (defined from the first non-NaN input).

use super::{ensure_defined, validate_period, Indicator};
use crate::error::CoreError;

#[derive(Debug, Clone)]
pub struct Ema {
    alpha: f64,
    name: String,
}

impl Ema {
    /// Classic EMA with alpha = 2 / (period + 1).
    pub fn new(period: usize) -> Result<Self, CoreError> {
        validate_period("length", period)?;
        Ok(Self {
            alpha: 2.0 / (period as f64 + 1.0),
            name: format!("ema_{period}"),
        })
    }

    /// Generalised smoothing with alpha = weight / period, `1 <= weight <= period`.
    pub fn with_weight(period: usize, weight: usize) -> Result<Self, CoreError> {
        validate_period("length", period)?;
        if weight == 0 || weight > period {
            return Err(CoreError::invalid(
                "weight",
                format!("must be in 1..={period}, got {weight}"),
            ));
        }
        Ok(Self {
            alpha: weight as f64 / period as f64,
            name: format!("smoothed_{period}_{weight}"),
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, values: &[f64]) -> Result<Vec<f64>, CoreError> {
        let mut result = vec![f64::NAN; values.len()];
        let mut prev: Option<f64> = None;

        for (out, &x) in result.iter_mut().zip(values) {
            prev = match (prev, x.is_nan()) {
                (None, true) => None,
                (None, false) => Some(x),
                (Some(p), true) => Some(p),
                (Some(p), false) => Some(self.alpha * x + (1.0 - self.alpha) * p),
            };
            if let Some(v) = prev {
                *out = v;
            }
        }

        ensure_defined(&self.name, result, 1)
    }
}

/// Classic EMA over `values`.
pub fn ema(values: &[f64], period: usize) -> Result<Vec<f64>, CoreError> {
    Ema::new(period)?.compute(values)
}

/// Generalised smoothing over `values` with alpha = weight / period.
pub fn smoothed(values: &[f64], period: usize, weight: usize) -> Result<Vec<f64>, CoreError> {
    Ema::with_weight(period, weight)?.compute(values)
}
