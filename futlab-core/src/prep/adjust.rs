//! Back-adjustment of a futures series across contract rolls.
//!
//! factor[t] = prod(close[k] / preclose[k], k <= t)
//! adjusted_close[t] = factor[t] * close[0] / factor[0]
//!
//! Open, high and low are scaled by the same per-bar ratio
//! `adjusted_close / close`, so the adjusted series equals the raw series on
//! the first bar and keeps every intra-bar relationship.

use serde::{Deserialize, Serialize};

use crate::domain::{AdjustedPrices, Bar, BarTable, Field};
use crate::error::CoreError;

/// Which prices the signal generators see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBasis {
    /// Back-adjusted prices, continuous across rolls.
    #[default]
    Adjusted,
    /// Raw contract prices copied into the adjusted columns.
    Raw,
}

/// Reject any zero preclose or close before touching the data.
fn check_nonzero(bars: &[Bar]) -> Result<(), CoreError> {
    for (index, bar) in bars.iter().enumerate() {
        if bar.preclose == 0.0 {
            return Err(CoreError::DegenerateInput {
                field: Field::Preclose,
                index,
            });
        }
        if bar.close == 0.0 {
            return Err(CoreError::DegenerateInput {
                field: Field::Close,
                index,
            });
        }
    }
    Ok(())
}

/// Cumulative product of `close / preclose`.
pub fn adjustment_factor(bars: &[Bar]) -> Result<Vec<f64>, CoreError> {
    check_nonzero(bars)?;

    let mut acc = 1.0;
    let factor: Vec<f64> = bars
        .iter()
        .map(|b| {
            acc *= b.close / b.preclose;
            acc
        })
        .collect();

    // Prices of opposite sign would still produce a zero or negative factor.
    if let Some(index) = factor.iter().position(|f| *f <= 0.0) {
        return Err(CoreError::DegenerateInput {
            field: Field::Preclose,
            index,
        });
    }
    Ok(factor)
}

/// Back-adjusted OHLC for a whole series.
pub fn adjust_prices(bars: &[Bar]) -> Result<AdjustedPrices, CoreError> {
    let factor = adjustment_factor(bars)?;
    let Some(first) = bars.first() else {
        return Ok(AdjustedPrices::default());
    };
    let scale = first.close / factor[0];

    let mut prices = AdjustedPrices {
        open: Vec::with_capacity(bars.len()),
        high: Vec::with_capacity(bars.len()),
        low: Vec::with_capacity(bars.len()),
        close: Vec::with_capacity(bars.len()),
    };
    for (bar, f) in bars.iter().zip(&factor) {
        let close = f * scale;
        let ratio = close / bar.close;
        prices.open.push(bar.open * ratio);
        prices.high.push(bar.high * ratio);
        prices.low.push(bar.low * ratio);
        prices.close.push(close);
    }
    Ok(prices)
}

/// Raw OHLC in the adjusted-price layout.
pub fn raw_prices(bars: &[Bar]) -> AdjustedPrices {
    AdjustedPrices {
        open: bars.iter().map(|b| b.open).collect(),
        high: bars.iter().map(|b| b.high).collect(),
        low: bars.iter().map(|b| b.low).collect(),
        close: bars.iter().map(|b| b.close).collect(),
    }
}

/// Attach the signal price columns for the chosen basis.
///
/// The zero-price check runs for both bases: the simulator divides by
/// preclose regardless of which prices the signals were computed on.
pub fn add_prices(table: &mut BarTable, basis: PriceBasis) -> Result<(), CoreError> {
    let prices = match basis {
        PriceBasis::Adjusted => adjust_prices(table.bars())?,
        PriceBasis::Raw => {
            check_nonzero(table.bars())?;
            raw_prices(table.bars())
        }
    };
    table.set_adjusted(prices)
}
