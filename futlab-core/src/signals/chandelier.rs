//! Trailing-chandelier exit.
//!
//! A long position trails the highest favourable low since entry; a short
//! trails the lowest favourable high. The stop distance is a fraction `trs`
//! of the bar's open, scaled by a sensitivity multiplier that starts at 1.0
//! on entry and shrinks by `sensitivity_step` every bar held, never going
//! below `sensitivity_floor`. The stop therefore tightens the longer a trade
//! lasts.
//!
//! A close through the stop at bar `i` schedules the exit flag on `i + 1`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{check_side_len, transition, Transition};
use crate::domain::{AdjustedPrices, BarTable, Direction, Field, SideFlags};
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChandelierParams {
    /// Stop distance as a fraction of the bar open.
    pub trs: f64,
    /// Multiplier decrement per bar held.
    pub sensitivity_step: f64,
    /// Lower bound of the multiplier.
    pub sensitivity_floor: f64,
}

impl Default for ChandelierParams {
    fn default() -> Self {
        Self {
            trs: 0.12,
            sensitivity_step: 0.1,
            sensitivity_floor: 0.5,
        }
    }
}

impl ChandelierParams {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.trs > 0.0 && self.trs.is_finite()) {
            return Err(CoreError::invalid("trs", format!("must be > 0, got {}", self.trs)));
        }
        if !(self.sensitivity_step >= 0.0 && self.sensitivity_step.is_finite()) {
            return Err(CoreError::invalid(
                "sensitivity_step",
                format!("must be >= 0, got {}", self.sensitivity_step),
            ));
        }
        if !(self.sensitivity_floor > 0.0 && self.sensitivity_floor <= 1.0) {
            return Err(CoreError::invalid(
                "sensitivity_floor",
                format!("must be in (0, 1], got {}", self.sensitivity_floor),
            ));
        }
        Ok(())
    }
}

/// Output of one chandelier scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ChandelierScan {
    /// Incoming exit flags plus the stop exits scheduled by the scan.
    pub exits: SideFlags,
    /// Sensitivity multiplier in force at each bar; NaN while flat.
    pub multiplier: Vec<f64>,
    /// Stop level computed at each held bar; NaN on entry bars and while flat.
    pub stop: Vec<f64>,
}

/// Run the chandelier automaton over one series.
///
/// `exits` carries exit flags produced elsewhere; stop exits are or-ed in.
pub fn chandelier_scan(
    prices: &AdjustedPrices,
    entries: &SideFlags,
    exits: SideFlags,
    params: &ChandelierParams,
) -> Result<ChandelierScan, CoreError> {
    params.validate()?;

    let n = prices.close.len();
    check_side_len(entries, [Field::LongEntry, Field::ShortEntry], n)?;
    check_side_len(&exits, [Field::LongExit, Field::ShortExit], n)?;
    let mut exits = exits;
    let mut multiplier = vec![f64::NAN; n];
    let mut stop = vec![f64::NAN; n];

    let mut direction = Direction::Flat;
    let mut extreme = f64::NAN;
    let mut sensitivity = 1.0;

    for i in 0..n {
        match transition(direction, entries, &exits, i) {
            Transition::Open(side) => {
                direction = side;
                sensitivity = 1.0;
                extreme = match (side, i) {
                    (Direction::Long, 0) => prices.low[0],
                    (Direction::Long, _) => prices.close[i - 1].max(prices.low[i]),
                    (_, 0) => prices.high[0],
                    _ => prices.close[i - 1].min(prices.high[i]),
                };
                multiplier[i] = sensitivity;
                continue;
            }
            Transition::Close => {
                direction = Direction::Flat;
                continue;
            }
            Transition::Carry if direction.is_flat() => continue,
            Transition::Carry => {}
        }

        sensitivity = (sensitivity - params.sensitivity_step).max(params.sensitivity_floor);
        multiplier[i] = sensitivity;
        let delta = prices.open[i] * params.trs * sensitivity;

        let crossed = if direction == Direction::Long {
            extreme = extreme.max(prices.low[i]);
            stop[i] = extreme - delta;
            prices.close[i] < stop[i]
        } else {
            extreme = extreme.min(prices.high[i]);
            stop[i] = extreme + delta;
            prices.close[i] > stop[i]
        };

        if crossed && i + 1 < n {
            if direction == Direction::Long {
                exits.long[i + 1] = true;
            } else {
                exits.short[i + 1] = true;
            }
        }
    }

    Ok(ChandelierScan {
        exits,
        multiplier,
        stop,
    })
}

/// Attach chandelier exit flags, keeping any exit flags already present.
pub fn add_chandelier_exit(table: &mut BarTable, params: &ChandelierParams) -> Result<(), CoreError> {
    table.require(&[
        Field::AdjustedOpen,
        Field::AdjustedHigh,
        Field::AdjustedLow,
        Field::AdjustedClose,
        Field::LongEntry,
        Field::ShortEntry,
    ])?;
    let incoming = match table.exits() {
        Ok(exits) => exits.clone(),
        Err(_) => SideFlags::none(table.len()),
    };
    let scan = chandelier_scan(table.adjusted()?, table.entries()?, incoming, params)?;
    debug!(
        long_exits = scan.exits.long.iter().filter(|f| **f).count(),
        short_exits = scan.exits.short.iter().filter(|f| **f).count(),
        "chandelier exit scan complete"
    );
    table.set_exits(scan.exits)
}
