//! Bar table - raw bars plus the derived columns each pipeline stage adds.
//!
//! Derived columns start absent. Every stage checks the columns it reads
//! with [`BarTable::require`] before computing anything, so a missing
//! prerequisite fails fast with [`CoreError::MissingField`] and leaves no
//! partial output behind.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Bar, Direction};
use crate::error::CoreError;

/// Named column of a bar table or of the simulation output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    Preclose,
    AdjustedOpen,
    AdjustedHigh,
    AdjustedLow,
    AdjustedClose,
    LongEntry,
    ShortEntry,
    LongExit,
    ShortExit,
    ContractChangeNow,
    ContractChangeNext,
    PositionDirection,
    CumulativeReturn,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Open => "open",
            Field::High => "high",
            Field::Low => "low",
            Field::Close => "close",
            Field::Preclose => "preclose",
            Field::AdjustedOpen => "adjusted_open",
            Field::AdjustedHigh => "adjusted_high",
            Field::AdjustedLow => "adjusted_low",
            Field::AdjustedClose => "adjusted_close",
            Field::LongEntry => "long_entry",
            Field::ShortEntry => "short_entry",
            Field::LongExit => "long_exit",
            Field::ShortExit => "short_exit",
            Field::ContractChangeNow => "contract_change_now",
            Field::ContractChangeNext => "contract_change_next",
            Field::PositionDirection => "position_direction",
            Field::CumulativeReturn => "cumulative_return",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Back-adjusted OHLC columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdjustedPrices {
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
}

/// Contract roll markers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RolloverFlags {
    /// First bar of a new contract id.
    pub now: Vec<bool>,
    /// Last bar before the contract id changes.
    pub next: Vec<bool>,
}

/// A paired long/short flag column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SideFlags {
    pub long: Vec<bool>,
    pub short: Vec<bool>,
}

impl SideFlags {
    pub fn none(len: usize) -> Self {
        Self {
            long: vec![false; len],
            short: vec![false; len],
        }
    }
}

/// Time-ordered bar series with optional derived columns.
#[derive(Debug, Clone, Default)]
pub struct BarTable {
    bars: Vec<Bar>,
    adjusted: Option<AdjustedPrices>,
    rollover: Option<RolloverFlags>,
    entries: Option<SideFlags>,
    exits: Option<SideFlags>,
    position_direction: Option<Vec<Direction>>,
}

impl BarTable {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self {
            bars,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.open).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn precloses(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.preclose).collect()
    }

    /// Whether a column is present.
    pub fn has(&self, field: Field) -> bool {
        match field {
            Field::Open | Field::High | Field::Low | Field::Close | Field::Preclose => true,
            Field::AdjustedOpen
            | Field::AdjustedHigh
            | Field::AdjustedLow
            | Field::AdjustedClose => self.adjusted.is_some(),
            Field::LongEntry | Field::ShortEntry => self.entries.is_some(),
            Field::LongExit | Field::ShortExit => self.exits.is_some(),
            Field::ContractChangeNow | Field::ContractChangeNext => self.rollover.is_some(),
            Field::PositionDirection => self.position_direction.is_some(),
            Field::CumulativeReturn => false,
        }
    }

    /// Fail with every absent field named, or succeed if all are present.
    pub fn require(&self, fields: &[Field]) -> Result<(), CoreError> {
        let missing: Vec<Field> = fields.iter().copied().filter(|f| !self.has(*f)).collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CoreError::MissingField { fields: missing })
        }
    }

    // ── Typed getters ────────────────────────────────────────────────

    pub fn adjusted(&self) -> Result<&AdjustedPrices, CoreError> {
        self.adjusted.as_ref().ok_or_else(|| CoreError::MissingField {
            fields: vec![
                Field::AdjustedOpen,
                Field::AdjustedHigh,
                Field::AdjustedLow,
                Field::AdjustedClose,
            ],
        })
    }

    pub fn rollover(&self) -> Result<&RolloverFlags, CoreError> {
        self.rollover.as_ref().ok_or_else(|| CoreError::MissingField {
            fields: vec![Field::ContractChangeNow, Field::ContractChangeNext],
        })
    }

    pub fn entries(&self) -> Result<&SideFlags, CoreError> {
        self.entries.as_ref().ok_or_else(|| CoreError::MissingField {
            fields: vec![Field::LongEntry, Field::ShortEntry],
        })
    }

    pub fn exits(&self) -> Result<&SideFlags, CoreError> {
        self.exits.as_ref().ok_or_else(|| CoreError::MissingField {
            fields: vec![Field::LongExit, Field::ShortExit],
        })
    }

    pub fn position_direction(&self) -> Result<&[Direction], CoreError> {
        self.position_direction
            .as_deref()
            .ok_or_else(|| CoreError::MissingField {
                fields: vec![Field::PositionDirection],
            })
    }

    // ── Setters (length-checked) ─────────────────────────────────────

    pub fn set_adjusted(&mut self, prices: AdjustedPrices) -> Result<(), CoreError> {
        self.check_len(Field::AdjustedOpen, prices.open.len())?;
        self.check_len(Field::AdjustedHigh, prices.high.len())?;
        self.check_len(Field::AdjustedLow, prices.low.len())?;
        self.check_len(Field::AdjustedClose, prices.close.len())?;
        self.adjusted = Some(prices);
        Ok(())
    }

    pub fn set_rollover(&mut self, flags: RolloverFlags) -> Result<(), CoreError> {
        self.check_len(Field::ContractChangeNow, flags.now.len())?;
        self.check_len(Field::ContractChangeNext, flags.next.len())?;
        self.rollover = Some(flags);
        Ok(())
    }

    pub fn set_entries(&mut self, flags: SideFlags) -> Result<(), CoreError> {
        self.check_len(Field::LongEntry, flags.long.len())?;
        self.check_len(Field::ShortEntry, flags.short.len())?;
        self.entries = Some(flags);
        Ok(())
    }

    pub fn set_exits(&mut self, flags: SideFlags) -> Result<(), CoreError> {
        self.check_len(Field::LongExit, flags.long.len())?;
        self.check_len(Field::ShortExit, flags.short.len())?;
        self.exits = Some(flags);
        Ok(())
    }

    pub fn set_position_direction(&mut self, directions: Vec<Direction>) -> Result<(), CoreError> {
        self.check_len(Field::PositionDirection, directions.len())?;
        self.position_direction = Some(directions);
        Ok(())
    }

    fn check_len(&self, field: Field, actual: usize) -> Result<(), CoreError> {
        if actual == self.bars.len() {
            Ok(())
        } else {
            Err(CoreError::LengthMismatch {
                field,
                expected: self.bars.len(),
                actual,
            })
        }
    }
}
