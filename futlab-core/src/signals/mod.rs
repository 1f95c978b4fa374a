//! Signal generators: entry rules, exit automatons and the position compiler.
//!
//! Every flag describes the bar on which it takes effect. A condition
//! evaluated at the close of bar `i` is written to bar `i + 1`, either with
//! [`shift_forward`] (vectorised entry rules) or by an explicit `i + 1` write
//! inside the sequential exit scans. No generator reads a flag it derives
//! from bar `i` when deciding bar `i`.

pub mod atr_channel;
pub mod chandelier;
pub mod entry;
pub mod position;

pub use atr_channel::{add_atr_exit, atr_channel_scan, AtrChannelParams};
pub use chandelier::{add_chandelier_exit, chandelier_scan, ChandelierParams, ChandelierScan};
pub use entry::{breakout_cci_entries, channel_entries, dual_ma_entries, momentum_entries};
pub use position::{add_position_direction, compile_positions};

use crate::domain::{BarTable, Direction, Field, SideFlags};
use crate::error::CoreError;

/// Move every flag one bar later; the first bar is always false.
pub fn shift_forward(flags: &[bool]) -> Vec<bool> {
    let mut out = vec![false; flags.len()];
    if flags.len() > 1 {
        out[1..].copy_from_slice(&flags[..flags.len() - 1]);
    }
    out
}

/// Outcome of the shared entry/exit precedence rule at one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Open(Direction),
    Close,
    Carry,
}

/// Apply the precedence long entry > short entry > long exit > short exit.
///
/// An entry only fires when it changes the stance (long entry while already
/// long is a carry). An exit only fires for the side currently held.
pub fn transition(current: Direction, entries: &SideFlags, exits: &SideFlags, i: usize) -> Transition {
    let held = current.as_i8();
    if entries.long[i] && held <= 0 {
        Transition::Open(Direction::Long)
    } else if entries.short[i] && held >= 0 {
        Transition::Open(Direction::Short)
    } else if (exits.long[i] && held > 0) || (exits.short[i] && held < 0) {
        Transition::Close
    } else {
        Transition::Carry
    }
}

/// Reject flag columns whose length differs from the price series.
pub(crate) fn check_side_len(
    flags: &SideFlags,
    fields: [Field; 2],
    expected: usize,
) -> Result<(), CoreError> {
    for (field, actual) in fields.into_iter().zip([flags.long.len(), flags.short.len()]) {
        if actual != expected {
            return Err(CoreError::LengthMismatch {
                field,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// Force both exit flags on every bar that is the last of its contract.
pub fn add_rollover_exits(table: &mut BarTable) -> Result<(), CoreError> {
    table.require(&[Field::LongExit, Field::ShortExit, Field::ContractChangeNext])?;
    let next = table.rollover()?.next.clone();
    let mut exits = table.exits()?.clone();
    for (i, roll) in next.iter().enumerate() {
        if *roll {
            exits.long[i] = true;
            exits.short[i] = true;
        }
    }
    table.set_exits(exits)
}
