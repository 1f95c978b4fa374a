//! Backtest simulator: fully signalled bar table to cost-accounted return
//! curve.
//!
//! The simulator is a single vectorisable pass. Per bar it charges
//! commission for every trade leg ([`costs`]), applies the held direction to
//! the raw bar return and compounds the result into the cumulative curve.

pub mod costs;
pub mod simulator;

pub use costs::{trade_legs, TradeLegs};
pub use simulator::{simulate, SimConfig, SimRow, Simulation};
