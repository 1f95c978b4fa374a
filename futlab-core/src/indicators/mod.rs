//! Indicator library - pure rolling-window computations over price series.
//!
//! Every indicator returns a series of the same length as its input, with
//! `f64::NAN` marking bars where the window is not yet available. An output
//! that is NaN everywhere means the window is longer than the history, which
//! is always a configuration bug, so it is reported as
//! [`CoreError::InsufficientData`] instead of being handed downstream.
//!
//! Single-series indicators implement [`Indicator`]. CCI and ATR take
//! several price columns and expose an inherent `compute` instead.

pub mod atr;
pub mod bars_since;
pub mod cci;
pub mod ema;
pub mod extrema;
pub mod momentum;
pub mod sma;

pub use atr::{atr, true_range, Atr};
pub use bars_since::bars_since;
pub use cci::{cci, Cci};
pub use ema::{ema, smoothed, Ema};
pub use extrema::{hhv, llv, Hhv, Llv};
pub use momentum::{momentum, Momentum};
pub use sma::{sma, Sma};

use crate::error::CoreError;

/// Trait for single-series indicators.
///
/// # Look-ahead contamination guard
/// No value at bar t may depend on input from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20").
    fn name(&self) -> &str;

    /// Number of leading bars that are always NaN.
    fn lookback(&self) -> usize;

    /// Compute the indicator over the whole series.
    fn compute(&self, values: &[f64]) -> Result<Vec<f64>, CoreError>;
}

/// Reject window lengths of zero.
pub(crate) fn validate_period(name: &'static str, period: usize) -> Result<(), CoreError> {
    if period == 0 {
        return Err(CoreError::invalid(name, "window length must be >= 1"));
    }
    Ok(())
}

/// Pass the output through unless every value is NaN.
pub(crate) fn ensure_defined(
    indicator: &str,
    output: Vec<f64>,
    required: usize,
) -> Result<Vec<f64>, CoreError> {
    if output.iter().all(|v| v.is_nan()) {
        return Err(CoreError::InsufficientData {
            indicator: indicator.to_string(),
            required,
            available: output.len(),
        });
    }
    Ok(output)
}

/// Shift a series forward by `n` bars: `out[t] = values[t - n]`, NaN-padded.
pub fn lag(values: &[f64], n: usize) -> Vec<f64> {
    let len = values.len();
    let mut out = vec![f64::NAN; len];
    for t in n..len {
        out[t] = values[t - n];
    }
    out
}
