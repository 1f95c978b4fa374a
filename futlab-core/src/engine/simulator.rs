//! Per-bar return and cumulative curve from a signalled bar table.
//!
//! return[t] = (close[t] / preclose[t] - 1) * direction[t] - units[t] * commission
//! cumulative[t] = cumulative[t-1] * (1 + return[t]), cumulative[-1] = 1
//!
//! Returns always use raw close/preclose. The rollover flags only affect the
//! commission; the held direction carries across a roll unchanged.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::costs::trade_legs;
use crate::curve::{CurvePoint, ReturnCurve};
use crate::domain::{BarTable, Direction, Field};
use crate::error::CoreError;

/// Simulator settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Commission per trade leg as a fraction of notional.
    pub commission: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self { commission: 0.0003 }
    }
}

impl SimConfig {
    pub fn new(commission: f64) -> Result<Self, CoreError> {
        let config = Self { commission };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.commission >= 0.0 && self.commission.is_finite()) {
            return Err(CoreError::invalid(
                "commission",
                format!("must be >= 0, got {}", self.commission),
            ));
        }
        Ok(())
    }
}

/// Debug record for one simulated bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimRow {
    pub timestamp: NaiveDateTime,
    pub position_direction: i8,
    pub trade_units: u32,
    /// Commission charged this bar.
    pub trade_cost: f64,
    pub per_bar_return: f64,
    /// Value exposed at the start of the bar.
    pub cost: f64,
    /// Change of the cumulative value over the bar.
    pub return_value: f64,
    pub cumulative_return: f64,
}

/// Full simulator output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Simulation {
    pub rows: Vec<SimRow>,
}

impl Simulation {
    /// The `(timestamp, cumulative_return)` curve.
    pub fn curve(&self) -> ReturnCurve {
        ReturnCurve::from_ordered(
            self.rows
                .iter()
                .map(|r| CurvePoint {
                    timestamp: r.timestamp,
                    value: r.cumulative_return,
                })
                .collect(),
        )
    }

    pub fn total_trade_units(&self) -> u32 {
        self.rows.iter().map(|r| r.trade_units).sum()
    }

    pub fn final_value(&self) -> f64 {
        self.rows.last().map_or(1.0, |r| r.cumulative_return)
    }
}

/// Run the simulator over a table carrying `position_direction` and both
/// rollover flags.
pub fn simulate(table: &BarTable, config: &SimConfig) -> Result<Simulation, CoreError> {
    table.require(&[
        Field::PositionDirection,
        Field::ContractChangeNow,
        Field::ContractChangeNext,
    ])?;
    config.validate()?;

    let bars = table.bars();
    if let Some(index) = bars.iter().position(|b| b.preclose == 0.0) {
        return Err(CoreError::DegenerateInput {
            field: Field::Preclose,
            index,
        });
    }
    let directions = table.position_direction()?;
    let rollover = table.rollover()?;

    let mut rows = Vec::with_capacity(bars.len());
    let mut previous = Direction::Flat;
    let mut cumulative = 1.0;
    for (i, bar) in bars.iter().enumerate() {
        let current = directions[i];
        let legs = trade_legs(previous, current, rollover.now[i], rollover.next[i]);
        let trade_units = legs.units();
        let trade_cost = f64::from(trade_units) * config.commission;
        let per_bar_return = bar.raw_return() * current.as_f64() - trade_cost;

        let cost = cumulative;
        cumulative *= 1.0 + per_bar_return;
        rows.push(SimRow {
            timestamp: bar.timestamp,
            position_direction: current.as_i8(),
            trade_units,
            trade_cost,
            per_bar_return,
            cost,
            return_value: cumulative - cost,
            cumulative_return: cumulative,
        });
        previous = current;
    }

    let simulation = Simulation { rows };
    debug!(
        bars = simulation.rows.len(),
        trade_units = simulation.total_trade_units(),
        final_value = simulation.final_value(),
        "simulation complete"
    );
    Ok(simulation)
}
