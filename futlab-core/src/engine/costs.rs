//! Trade-leg counting.
//!
//! A bar can carry at most one opening and one closing leg:
//!
//! | case                                   | opening | closing |
//! |----------------------------------------|---------|---------|
//! | fresh entry (flat to held)             | 1       | 0       |
//! | exit (held to flat)                    | 0       | 1       |
//! | reversal                               | 1       | 1       |
//! | held into a new contract (`now`)       | 1       | 0       |
//! | held on the last contract bar (`next`) | 0       | 1       |
//! | fresh entry on a `next` bar            | 1       | 0       |
//! | exit on a `now` bar                    | 0       | 1       |
//!
//! The rollover-out leg is never added on top of a fresh opening: the
//! position entered on that bar is the one being rolled.

use crate::domain::Direction;

/// Trade legs charged on one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TradeLegs {
    pub opening: bool,
    pub closing: bool,
}

impl TradeLegs {
    /// Number of commission units.
    pub fn units(self) -> u32 {
        u32::from(self.opening) + u32::from(self.closing)
    }
}

/// Legs traded on a bar held at `current`, after `previous` on the bar before.
pub fn trade_legs(
    previous: Direction,
    current: Direction,
    contract_change_now: bool,
    contract_change_next: bool,
) -> TradeLegs {
    let changed = current != previous;
    let fresh_open = current.is_holding() && changed;
    let roll_in = contract_change_now && current.is_holding() && !changed;
    let roll_out = contract_change_next && current.is_holding() && !fresh_open;

    TradeLegs {
        opening: fresh_open || roll_in,
        closing: (previous.is_holding() && changed) || roll_out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Direction::{Flat, Long, Short};

    fn units(previous: Direction, current: Direction, now: bool, next: bool) -> u32 {
        trade_legs(previous, current, now, next).units()
    }

    #[test]
    fn plain_entry_and_exit_cost_one() {
        assert_eq!(units(Flat, Long, false, false), 1);
        assert_eq!(units(Short, Flat, false, false), 1);
    }

    #[test]
    fn reversal_costs_two() {
        assert_eq!(units(Long, Short, false, false), 2);
        assert_eq!(units(Short, Long, false, false), 2);
    }

    #[test]
    fn entry_with_rollover_out_costs_one() {
        assert_eq!(units(Flat, Long, false, true), 1);
    }

    #[test]
    fn exit_with_rollover_in_costs_one() {
        assert_eq!(units(Long, Flat, true, false), 1);
    }

    #[test]
    fn rollover_alone_costs_one_per_side() {
        assert_eq!(units(Long, Long, false, true), 1);
        assert_eq!(units(Long, Long, true, false), 1);
        // single-bar contract carries both flags
        assert_eq!(units(Short, Short, true, true), 2);
    }

    #[test]
    fn flat_bars_never_cost() {
        assert_eq!(units(Flat, Flat, true, true), 0);
    }

    #[test]
    fn entry_on_new_contract_is_not_a_roll() {
        assert_eq!(
            trade_legs(Flat, Long, true, false),
            TradeLegs {
                opening: true,
                closing: false,
            }
        );
    }
}
