//! Signed position stance.

use serde::{Deserialize, Serialize};

/// Position direction held at the open of a bar.
///
/// Only entry/exit flags move the direction. A contract roll relabels the
/// same economic position and never changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    Short,
    #[default]
    Flat,
    Long,
}

impl Direction {
    pub fn as_i8(self) -> i8 {
        match self {
            Direction::Short => -1,
            Direction::Flat => 0,
            Direction::Long => 1,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.as_i8())
    }

    pub fn from_i8(value: i8) -> Option<Self> {
        match value {
            -1 => Some(Direction::Short),
            0 => Some(Direction::Flat),
            1 => Some(Direction::Long),
            _ => None,
        }
    }

    pub fn is_flat(self) -> bool {
        self == Direction::Flat
    }

    pub fn is_holding(self) -> bool {
        !self.is_flat()
    }
}
