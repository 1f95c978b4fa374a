//! Position compiler: entry/exit flags to a per-bar stance.

use super::{check_side_len, transition, Transition};
use crate::domain::{BarTable, Direction, Field, SideFlags};
use crate::error::CoreError;

/// Scan the flags once, carrying the stance forward when nothing fires.
/// The stance before the first bar is flat.
pub fn compile_positions(
    entries: &SideFlags,
    exits: &SideFlags,
) -> Result<Vec<Direction>, CoreError> {
    let n = entries.long.len();
    check_side_len(entries, [Field::LongEntry, Field::ShortEntry], n)?;
    check_side_len(exits, [Field::LongExit, Field::ShortExit], n)?;

    let mut current = Direction::Flat;
    Ok((0..n)
        .map(|i| {
            current = match transition(current, entries, exits, i) {
                Transition::Open(side) => side,
                Transition::Close => Direction::Flat,
                Transition::Carry => current,
            };
            current
        })
        .collect())
}

/// Compile and attach `position_direction`. Must run after every
/// generator that writes entry or exit flags.
pub fn add_position_direction(table: &mut BarTable) -> Result<(), CoreError> {
    table.require(&[
        Field::LongEntry,
        Field::ShortEntry,
        Field::LongExit,
        Field::ShortExit,
    ])?;
    let directions = compile_positions(table.entries()?, table.exits()?)?;
    table.set_position_direction(directions)
}
