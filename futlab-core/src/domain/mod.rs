//! Domain types for futlab

pub mod bar;
pub mod direction;
pub mod table;

pub use bar::Bar;
pub use direction::Direction;
pub use table::{AdjustedPrices, BarTable, Field, RolloverFlags, SideFlags};
