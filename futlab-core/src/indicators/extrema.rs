//! Rolling extrema: highest high value (HHV) and lowest low value (LLV).
//!
//! Window of `period` trailing values including the current one. Any NaN in
//! the window makes that output NaN.
//! Lookback: period - 1.

use super::{ensure_defined, validate_period, Indicator};
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extreme {
    Max,
    Min,
}

fn rolling_extreme(values: &[f64], period: usize, which: Extreme) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &values[(i + 1 - period)..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = match which {
            Extreme::Max => window.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Extreme::Min => window.iter().copied().fold(f64::INFINITY, f64::min),
        };
    }

    result
}

/// Highest value over the trailing window.
#[derive(Debug, Clone)]
pub struct Hhv {
    period: usize,
    name: String,
}

impl Hhv {
    pub fn new(period: usize) -> Result<Self, CoreError> {
        validate_period("length", period)?;
        Ok(Self {
            period,
            name: format!("hhv_{period}"),
        })
    }
}

impl Indicator for Hhv {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, values: &[f64]) -> Result<Vec<f64>, CoreError> {
        ensure_defined(
            &self.name,
            rolling_extreme(values, self.period, Extreme::Max),
            self.period,
        )
    }
}

/// Lowest value over the trailing window.
#[derive(Debug, Clone)]
pub struct Llv {
    period: usize,
    name: String,
}

impl Llv {
    pub fn new(period: usize) -> Result<Self, CoreError> {
        validate_period("length", period)?;
        Ok(Self {
            period,
            name: format!("llv_{period}"),
        })
    }
}

impl Indicator for Llv {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, values: &[f64]) -> Result<Vec<f64>, CoreError> {
        ensure_defined(
            &self.name,
            rolling_extreme(values, self.period, Extreme::Min),
            self.period,
        )
    }
}

pub fn hhv(values: &[f64], period: usize) -> Result<Vec<f64>, CoreError> {
    Hhv::new(period)?.compute(values)
}

pub fn llv(values: &[f64], period: usize) -> Result<Vec<f64>, CoreError> {
    Llv::new(period)?.compute(values)
}
