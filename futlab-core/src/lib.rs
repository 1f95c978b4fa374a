//! futlab core: the signal-to-return engine.
//!
//! Data flows through the modules leaf-first:
//! - `indicators`: rolling-window computations over price series
//! - `prep`: back-adjusted prices and contract roll markers
//! - `signals`: entry rules, exit automatons, position compiler
//! - `engine`: cost-accounted per-bar simulation
//! - `curve`: return curves, equal-cost blending and transforms
//!
//! Every function works on one bar series and is free of shared state;
//! callers parallelise across series.

pub mod curve;
pub mod domain;
pub mod engine;
pub mod error;
pub mod indicators;
pub mod prep;
pub mod signals;
pub mod strategy;

#[cfg(test)]
mod testing;

pub use curve::{combine, CurvePoint, ReturnCurve};
pub use domain::{Bar, BarTable, Direction, Field};
pub use engine::{simulate, SimConfig, Simulation};
pub use error::CoreError;
pub use prep::PriceBasis;
pub use strategy::{generate_signals, StrategySpec};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything the runner moves across rayon workers
    /// is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Bar>();
        require_sync::<Bar>();
        require_send::<BarTable>();
        require_sync::<BarTable>();
        require_send::<ReturnCurve>();
        require_sync::<ReturnCurve>();
        require_send::<Simulation>();
        require_sync::<Simulation>();
        require_send::<StrategySpec>();
        require_sync::<StrategySpec>();
        require_send::<CoreError>();
        require_sync::<CoreError>();
        require_send::<signals::ChandelierParams>();
        require_sync::<signals::ChandelierParams>();
        require_send::<signals::AtrChannelParams>();
        require_sync::<signals::AtrChannelParams>();
    }

    /// Indicators are usable as trait objects shared between threads.
    #[test]
    fn indicator_trait_objects_are_shareable() {
        let boxed: Vec<Box<dyn indicators::Indicator>> = vec![
            Box::new(indicators::Sma::new(3).unwrap()),
            Box::new(indicators::Ema::new(3).unwrap()),
            Box::new(indicators::Hhv::new(3).unwrap()),
            Box::new(indicators::Momentum::new(1).unwrap()),
        ];
        let names: Vec<&str> = boxed.iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["sma_3", "ema_3", "hhv_3", "momentum_1"]);
    }
}
