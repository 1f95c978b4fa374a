//! futlab runner - bar repository, strategy tester, parameter sweeps,
//! metrics and export.
//!
//! This crate builds on `futlab-core` to provide:
//! - CSV bar repository keyed by category/segment, plus synthetic series
//! - Single-run tester that records failures instead of propagating them
//! - Parallel parameter sweeps with an equal-cost blended curve
//! - Performance metrics, curve CSV and JSON-lines export

pub mod config;
pub mod export;
pub mod metrics;
pub mod repository;
pub mod sweep;
pub mod synthetic;
pub mod tester;

pub use config::{BacktestSettings, ConfigError, DataConfig, OutputConfig, RunId, SweepConfig};
pub use metrics::PerformanceMetrics;
pub use repository::{BarRepository, DataLabel, LoadError};
pub use sweep::{ParamGrid, Sweep, SweepResults};
pub use synthetic::{synthetic_repository, SyntheticConfig};
pub use tester::{run_id, run_one, simulate_strategy, RunError, RunOutcome, RunRecord};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn repository_is_send_sync() {
        assert_send::<BarRepository>();
        assert_sync::<BarRepository>();
        assert_send::<DataLabel>();
        assert_sync::<DataLabel>();
    }

    #[test]
    fn run_record_is_send_sync() {
        assert_send::<RunRecord>();
        assert_sync::<RunRecord>();
        assert_send::<PerformanceMetrics>();
        assert_sync::<PerformanceMetrics>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<SweepConfig>();
        assert_sync::<SweepConfig>();
        assert_send::<BacktestSettings>();
        assert_sync::<BacktestSettings>();
        assert_send::<ParamGrid>();
        assert_sync::<ParamGrid>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}
