//! Series preparation: back-adjusted prices and contract roll markers.
//!
//! Both passes read only the raw bars and attach a derived column to the
//! table. They run before any signal generator.

pub mod adjust;
pub mod rollover;

pub use adjust::{add_prices, adjust_prices, adjustment_factor, raw_prices, PriceBasis};
pub use rollover::{add_rollover, rollover_flags};
