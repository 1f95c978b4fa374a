//! Contract roll markers derived from consecutive contract ids.

use crate::domain::{Bar, BarTable, RolloverFlags};
use crate::error::CoreError;

/// `now[i]`: bar i opens a new contract. `next[i]`: bar i is the last bar
/// of its contract. The first bar never has `now`, the last never `next`.
pub fn rollover_flags(bars: &[Bar]) -> RolloverFlags {
    let n = bars.len();
    let mut flags = RolloverFlags {
        now: vec![false; n],
        next: vec![false; n],
    };
    for i in 1..n {
        if bars[i].contract_id != bars[i - 1].contract_id {
            flags.now[i] = true;
            flags.next[i - 1] = true;
        }
    }
    flags
}

pub fn add_rollover(table: &mut BarTable) -> Result<(), CoreError> {
    let flags = rollover_flags(table.bars());
    table.set_rollover(flags)
}
