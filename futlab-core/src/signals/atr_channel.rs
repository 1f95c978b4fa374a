//! ATR-channel exit.
//!
//! Long positions trail the highest high since entry, shorts the lowest
//! low. The stop sits `trs * ATR(atr_length)` away from that extreme. ATR is
//! computed on the signal prices with the previous signal close standing in
//! for preclose, so the channel stays continuous across rolls.
//!
//! A held position is also exited on the bar after the last bar of its
//! contract, whatever the price did.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{check_side_len, transition, Transition};
use crate::domain::{AdjustedPrices, BarTable, Direction, Field, SideFlags};
use crate::error::CoreError;
use crate::indicators::{atr, lag};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtrChannelParams {
    pub atr_length: usize,
    /// ATR multiple between the extreme and the stop.
    pub trs: f64,
}

impl AtrChannelParams {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.atr_length == 0 {
            return Err(CoreError::invalid("atr_length", "window length must be >= 1"));
        }
        if !(self.trs > 0.0 && self.trs.is_finite()) {
            return Err(CoreError::invalid("trs", format!("must be > 0, got {}", self.trs)));
        }
        Ok(())
    }
}

/// Run the ATR-channel automaton over one series and return the exit flags.
pub fn atr_channel_scan(
    prices: &AdjustedPrices,
    contract_change_next: &[bool],
    entries: &SideFlags,
    exits: SideFlags,
    params: &AtrChannelParams,
) -> Result<SideFlags, CoreError> {
    params.validate()?;

    let n = prices.close.len();
    check_side_len(entries, [Field::LongEntry, Field::ShortEntry], n)?;
    check_side_len(&exits, [Field::LongExit, Field::ShortExit], n)?;
    if contract_change_next.len() != n {
        return Err(CoreError::LengthMismatch {
            field: Field::ContractChangeNext,
            expected: n,
            actual: contract_change_next.len(),
        });
    }

    let range = atr(
        &prices.high,
        &prices.low,
        &lag(&prices.close, 1),
        params.atr_length,
    )?;

    let mut exits = exits;
    let mut direction = Direction::Flat;
    let mut extreme = f64::NAN;

    for i in 0..n {
        match transition(direction, entries, &exits, i) {
            Transition::Open(side) => {
                direction = side;
                extreme = if side == Direction::Long {
                    prices.high[i]
                } else {
                    prices.low[i]
                };
                continue;
            }
            Transition::Close => {
                direction = Direction::Flat;
                continue;
            }
            Transition::Carry if direction.is_flat() => continue,
            Transition::Carry => {}
        }

        let delta = params.trs * range[i];
        // NaN delta (ATR warm-up) compares false on both sides
        let crossed = if direction == Direction::Long {
            extreme = extreme.max(prices.high[i]);
            prices.close[i] < extreme - delta
        } else {
            extreme = extreme.min(prices.low[i]);
            prices.close[i] > extreme + delta
        };

        if (crossed || contract_change_next[i]) && i + 1 < n {
            if direction == Direction::Long {
                exits.long[i + 1] = true;
            } else {
                exits.short[i + 1] = true;
            }
        }
    }

    Ok(exits)
}

/// Attach ATR-channel exit flags, keeping any exit flags already present.
pub fn add_atr_exit(table: &mut BarTable, params: &AtrChannelParams) -> Result<(), CoreError> {
    table.require(&[
        Field::AdjustedHigh,
        Field::AdjustedLow,
        Field::AdjustedClose,
        Field::LongEntry,
        Field::ShortEntry,
        Field::ContractChangeNext,
    ])?;
    let incoming = match table.exits() {
        Ok(exits) => exits.clone(),
        Err(_) => SideFlags::none(table.len()),
    };
    let exits = atr_channel_scan(
        table.adjusted()?,
        &table.rollover()?.next,
        table.entries()?,
        incoming,
        params,
    )?;
    debug!(
        long_exits = exits.long.iter().filter(|f| **f).count(),
        short_exits = exits.short.iter().filter(|f| **f).count(),
        "atr channel exit scan complete"
    );
    table.set_exits(exits)
}
