//! True Range and Average True Range (ATR).
//!
//! TR[t] = max(high-low, |high-preclose|, |low-preclose|); where preclose is
//! NaN (first bar of a lagged close series) TR falls back to high-low.
//! ATR = simple moving average of TR over `period` bars.
//! Lookback: period - 1.

use super::sma::rolling_mean;
use super::{ensure_defined, validate_period};
use crate::error::CoreError;

/// Compute the True Range series.
pub fn true_range(high: &[f64], low: &[f64], preclose: &[f64]) -> Result<Vec<f64>, CoreError> {
    let tr: Vec<f64> = high
        .iter()
        .zip(low)
        .zip(preclose)
        .map(|((&h, &l), &pc)| {
            let range = h - l;
            if pc.is_nan() {
                range
            } else {
                range.max((h - pc).abs()).max((l - pc).abs())
            }
        })
        .collect();
    ensure_defined("true_range", tr, 1)
}

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Result<Self, CoreError> {
        validate_period("atr_length", period)?;
        Ok(Self {
            period,
            name: format!("atr_{period}"),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lookback(&self) -> usize {
        self.period - 1
    }

    pub fn compute(
        &self,
        high: &[f64],
        low: &[f64],
        preclose: &[f64],
    ) -> Result<Vec<f64>, CoreError> {
        let tr = true_range(high, low, preclose).map_err(|_| CoreError::InsufficientData {
            indicator: self.name.clone(),
            required: self.period,
            available: high.len(),
        })?;
        ensure_defined(&self.name, rolling_mean(&tr, self.period), self.period)
    }
}

pub fn atr(
    high: &[f64],
    low: &[f64],
    preclose: &[f64],
    period: usize,
) -> Result<Vec<f64>, CoreError> {
    Atr::new(period)?.compute(high, low, preclose)
}
