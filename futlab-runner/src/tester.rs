//! Single strategy tester: one series, one parameter set, one record.
//!
//! A strategy that cannot run on a series (too little data, degenerate
//! prices, invalid parameters) is recorded as a failed run with its error
//! message. The caller always gets a record back.

use futlab_core::{
    generate_signals, simulate, BarTable, CoreError, ReturnCurve, Simulation, StrategySpec,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::{BacktestSettings, ConfigError, RunId};
use crate::metrics::PerformanceMetrics;
use crate::repository::{DataLabel, LoadError};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("engine error: {0}")]
    Core(#[from] CoreError),
    #[error("series '{0}' not found in the repository")]
    UnknownSeries(DataLabel),
    #[error("failed to fingerprint run: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Completed {
        metrics: PerformanceMetrics,
        /// Kept in memory for blending; JSON records carry only metrics.
        #[serde(skip)]
        curve: ReturnCurve,
    },
    Failed {
        error: String,
    },
}

impl RunOutcome {
    pub fn curve(&self) -> Option<&ReturnCurve> {
        match self {
            RunOutcome::Completed { curve, .. } => Some(curve),
            RunOutcome::Failed { .. } => None,
        }
    }

    pub fn metrics(&self) -> Option<&PerformanceMetrics> {
        match self {
            RunOutcome::Completed { metrics, .. } => Some(metrics),
            RunOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RunOutcome::Completed { .. } => None,
            RunOutcome::Failed { error } => Some(error),
        }
    }
}

/// Result of running one strategy on one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: RunId,
    pub label: DataLabel,
    pub strategy: StrategySpec,
    pub settings: BacktestSettings,
    #[serde(flatten)]
    pub outcome: RunOutcome,
}

#[derive(Serialize)]
struct RunKey<'a> {
    label: &'a DataLabel,
    strategy: &'a StrategySpec,
    settings: &'a BacktestSettings,
}

/// Deterministic id: BLAKE3 over the canonical JSON of everything that
/// determines the run's output.
pub fn run_id(
    label: &DataLabel,
    strategy: &StrategySpec,
    settings: &BacktestSettings,
) -> Result<RunId, RunError> {
    let json = serde_json::to_string(&RunKey {
        label,
        strategy,
        settings,
    })?;
    Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
}

/// Signal pipeline plus simulator, returning the full per-bar output.
pub fn simulate_strategy(
    table: &BarTable,
    strategy: &StrategySpec,
    settings: &BacktestSettings,
) -> Result<Simulation, CoreError> {
    let signalled = generate_signals(table, strategy, settings.price_basis)?;
    simulate(&signalled, &settings.sim_config())
}

/// Run one strategy on one series. Strategy errors become a
/// [`RunOutcome::Failed`] record.
pub fn run_one(
    label: &DataLabel,
    table: &BarTable,
    strategy: &StrategySpec,
    settings: &BacktestSettings,
) -> Result<RunRecord, RunError> {
    let run_id = run_id(label, strategy, settings)?;
    let outcome = match simulate_strategy(table, strategy, settings) {
        Ok(simulation) => {
            let curve = simulation.curve();
            let metrics = PerformanceMetrics::compute(&curve);
            debug!(
                %run_id,
                label = %label,
                strategy = strategy.name(),
                final_value = metrics.final_value,
                trade_units = simulation.total_trade_units(),
                "run completed"
            );
            RunOutcome::Completed { metrics, curve }
        }
        Err(err) => RunOutcome::Failed {
            error: err.to_string(),
        },
    };

    Ok(RunRecord {
        run_id,
        label: label.clone(),
        strategy: strategy.clone(),
        settings: *settings,
        outcome,
    })
}
