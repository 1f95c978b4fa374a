//! Bar - one futures price observation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// OHLC bar for a single contract at a single timestamp.
///
/// `preclose` is the previous settlement/close of the *same* contract, so
/// `close / preclose` is the bar's true return even across a roll, where the
/// raw close jumps between contracts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub preclose: f64,
    pub volume: u64,
    pub contract_id: String,
}

impl Bar {
    /// Returns true if any price field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.preclose.is_nan()
    }

    /// Basic sanity: high/low bracket open and close, prices positive.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.close > 0.0
            && self.preclose > 0.0
    }

    /// Raw bar return `close / preclose - 1`.
    pub fn raw_return(&self) -> f64 {
        self.close / self.preclose - 1.0
    }
}
