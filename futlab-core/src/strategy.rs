//! Strategy definitions and the signal pipeline.
//!
//! `generate_signals` runs the stages in their fixed order on a copy of the
//! input table: signal prices, rollover flags, entry rules, exit generators,
//! position compiler. The result is ready for [`crate::engine::simulate`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{BarTable, SideFlags};
use crate::error::CoreError;
use crate::prep::{add_prices, add_rollover, PriceBasis};
use crate::signals::{
    add_atr_exit, add_chandelier_exit, add_position_direction, add_rollover_exits,
    breakout_cci_entries, channel_entries, dual_ma_entries, momentum_entries, AtrChannelParams,
    ChandelierParams,
};

/// A strategy family with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategySpec {
    /// CCI-confirmed channel breakout with the chandelier exit.
    BreakoutCci {
        length: usize,
        ema_length: usize,
        trs: f64,
        sensitivity_step: f64,
        sensitivity_floor: f64,
    },
    /// Dual moving average with the ATR-channel exit.
    DualMa {
        short_length: usize,
        long_length: usize,
        break_in: f64,
        atr_length: usize,
        trs: f64,
    },
    /// Closing-range breakout with a trend filter and the ATR-channel exit.
    Channel {
        recent: usize,
        short_length: usize,
        long_length: usize,
        atr_length: usize,
        trs: f64,
    },
    /// Sign of trailing momentum; always in the market once started.
    Momentum { period: usize },
}

impl StrategySpec {
    pub fn name(&self) -> &'static str {
        match self {
            StrategySpec::BreakoutCci { .. } => "breakout_cci",
            StrategySpec::DualMa { .. } => "dual_ma",
            StrategySpec::Channel { .. } => "channel",
            StrategySpec::Momentum { .. } => "momentum",
        }
    }

    /// Check the numeric parameters that no indicator validates on its own.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            StrategySpec::BreakoutCci { .. } => self.chandelier().map_or(Ok(()), |p| p.validate()),
            StrategySpec::DualMa { break_in, .. } if !(*break_in >= 0.0) => Err(
                CoreError::invalid("break_in", format!("must be >= 0, got {break_in}")),
            ),
            StrategySpec::DualMa { .. } | StrategySpec::Channel { .. } => {
                self.atr_channel().map_or(Ok(()), |p| p.validate())
            }
            StrategySpec::Momentum { period } if *period == 0 => {
                Err(CoreError::invalid("period", "window length must be >= 1"))
            }
            StrategySpec::Momentum { .. } => Ok(()),
        }
    }

    fn chandelier(&self) -> Option<ChandelierParams> {
        match *self {
            StrategySpec::BreakoutCci {
                trs,
                sensitivity_step,
                sensitivity_floor,
                ..
            } => Some(ChandelierParams {
                trs,
                sensitivity_step,
                sensitivity_floor,
            }),
            _ => None,
        }
    }

    fn atr_channel(&self) -> Option<AtrChannelParams> {
        match *self {
            StrategySpec::DualMa {
                atr_length, trs, ..
            }
            | StrategySpec::Channel {
                atr_length, trs, ..
            } => Some(AtrChannelParams { atr_length, trs }),
            _ => None,
        }
    }
}

/// Run the full signal pipeline on a copy of `table`.
pub fn generate_signals(
    table: &BarTable,
    spec: &StrategySpec,
    basis: PriceBasis,
) -> Result<BarTable, CoreError> {
    spec.validate()?;

    let mut table = table.clone();
    add_prices(&mut table, basis)?;
    add_rollover(&mut table)?;

    let prices = table.adjusted()?;
    let entries = match *spec {
        StrategySpec::BreakoutCci {
            length, ema_length, ..
        } => breakout_cci_entries(prices, length, ema_length)?,
        StrategySpec::DualMa {
            short_length,
            long_length,
            break_in,
            ..
        } => dual_ma_entries(&prices.close, short_length, long_length, break_in)?,
        StrategySpec::Channel {
            recent,
            short_length,
            long_length,
            ..
        } => channel_entries(&prices.close, recent, short_length, long_length)?,
        StrategySpec::Momentum { period } => momentum_entries(&prices.close, period)?,
    };
    table.set_entries(entries)?;
    table.set_exits(SideFlags::none(table.len()))?;

    if let Some(params) = spec.chandelier() {
        add_chandelier_exit(&mut table, &params)?;
    }
    if let Some(params) = spec.atr_channel() {
        add_atr_exit(&mut table, &params)?;
        add_rollover_exits(&mut table)?;
    }
    add_position_direction(&mut table)?;

    debug!(strategy = spec.name(), bars = table.len(), "signals generated");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, Field};
    use crate::testing::make_bars;

    fn trending(n: usize) -> BarTable {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
        BarTable::new(make_bars(&closes))
    }

    #[test]
    fn pipeline_attaches_every_column() {
        let spec = StrategySpec::Momentum { period: 3 };
        let out = generate_signals(&trending(20), &spec, PriceBasis::Adjusted).unwrap();
        assert!(out
            .require(&[
                Field::AdjustedClose,
                Field::ContractChangeNow,
                Field::LongEntry,
                Field::LongExit,
                Field::PositionDirection,
            ])
            .is_ok());
        let dirs = out.position_direction().unwrap();
        assert_eq!(dirs[0], Direction::Flat);
        assert_eq!(*dirs.last().unwrap(), Direction::Long);
    }

    #[test]
    fn flat_series_runs_the_breakout_strategy() {
        let table = BarTable::new(make_bars(&[100.0; 60]));
        let spec = StrategySpec::BreakoutCci {
            length: 5,
            ema_length: 3,
            trs: 0.12,
            sensitivity_step: 0.1,
            sensitivity_floor: 0.5,
        };
        let out = generate_signals(&table, &spec, PriceBasis::Adjusted).unwrap();
        assert_eq!(out.position_direction().unwrap().len(), 60);
    }

    #[test]
    fn input_table_is_left_untouched() {
        let input = trending(20);
        let spec = StrategySpec::DualMa {
            short_length: 2,
            long_length: 5,
            break_in: 0.0,
            atr_length: 3,
            trs: 2.0,
        };
        generate_signals(&input, &spec, PriceBasis::Raw).unwrap();
        assert!(!input.has(Field::PositionDirection));
    }

    #[test]
    fn window_longer_than_series_is_insufficient_data() {
        let spec = StrategySpec::Channel {
            recent: 50,
            short_length: 5,
            long_length: 10,
            atr_length: 5,
            trs: 2.0,
        };
        assert!(matches!(
            generate_signals(&trending(20), &spec, PriceBasis::Adjusted),
            Err(CoreError::InsufficientData { .. })
        ));
    }

    #[test]
    fn invalid_parameters_are_rejected_up_front() {
        let spec = StrategySpec::BreakoutCci {
            length: 5,
            ema_length: 5,
            trs: 0.1,
            sensitivity_step: 0.1,
            sensitivity_floor: 0.0,
        };
        assert!(matches!(
            spec.validate(),
            Err(CoreError::InvalidParameter {
                name: "sensitivity_floor",
                ..
            })
        ));
    }

    #[test]
    fn spec_is_tagged_in_toml_style_json() {
        let spec: StrategySpec =
            serde_json::from_str(r#"{"kind":"momentum","period":20}"#).unwrap();
        assert_eq!(spec, StrategySpec::Momentum { period: 20 });
        assert_eq!(spec.name(), "momentum");
    }
}
