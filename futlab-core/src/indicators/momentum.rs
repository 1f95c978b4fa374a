//! Momentum: trailing return ending one bar before the current bar.
//!
//! momentum[t] = close[t-1] / close[t-1-period] - 1
//!
//! The extra bar of lag keeps the value usable as a same-bar decision input.
//! Lookback: period + 1.

use super::{ensure_defined, validate_period, Indicator};
use crate::error::CoreError;

#[derive(Debug, Clone)]
pub struct Momentum {
    period: usize,
    name: String,
}

impl Momentum {
    pub fn new(period: usize) -> Result<Self, CoreError> {
        validate_period("period", period)?;
        Ok(Self {
            period,
            name: format!("momentum_{period}"),
        })
    }
}

impl Indicator for Momentum {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period + 1
    }

    fn compute(&self, values: &[f64]) -> Result<Vec<f64>, CoreError> {
        let n = values.len();
        let mut result = vec![f64::NAN; n];

        for t in (self.period + 1)..n {
            let base = values[t - 1 - self.period];
            let last = values[t - 1];
            // zero base would be inf; leave it undefined
            if base != 0.0 && !base.is_nan() && !last.is_nan() {
                result[t] = last / base - 1.0;
            }
        }

        ensure_defined(&self.name, result, self.period + 2)
    }
}

pub fn momentum(values: &[f64], period: usize) -> Result<Vec<f64>, CoreError> {
    Momentum::new(period)?.compute(values)
}
