//! Parameter sweeps: every data series crossed with every strategy, run in
//! parallel with rayon.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use futlab_core::{combine, ReturnCurve, StrategySpec};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{BacktestSettings, ConfigError};
use crate::repository::{BarRepository, DataLabel};
use crate::tester::{run_one, RunError, RunRecord};

/// Parameter ranges for one strategy family. The Cartesian product of all
/// fields is swept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParamGrid {
    BreakoutCci {
        length: Vec<usize>,
        ema_length: Vec<usize>,
        trs: Vec<f64>,
        sensitivity_step: Vec<f64>,
        sensitivity_floor: Vec<f64>,
    },
    DualMa {
        short_length: Vec<usize>,
        long_length: Vec<usize>,
        break_in: Vec<f64>,
        atr_length: Vec<usize>,
        trs: Vec<f64>,
    },
    Channel {
        recent: Vec<usize>,
        short_length: Vec<usize>,
        long_length: Vec<usize>,
        atr_length: Vec<usize>,
        trs: Vec<f64>,
    },
    Momentum {
        period: Vec<usize>,
    },
}

impl ParamGrid {
    pub fn kind(&self) -> &'static str {
        match self {
            ParamGrid::BreakoutCci { .. } => "breakout_cci",
            ParamGrid::DualMa { .. } => "dual_ma",
            ParamGrid::Channel { .. } => "channel",
            ParamGrid::Momentum { .. } => "momentum",
        }
    }

    fn field_lengths(&self) -> Vec<(&'static str, usize)> {
        match self {
            ParamGrid::BreakoutCci {
                length,
                ema_length,
                trs,
                sensitivity_step,
                sensitivity_floor,
            } => vec![
                ("length", length.len()),
                ("ema_length", ema_length.len()),
                ("trs", trs.len()),
                ("sensitivity_step", sensitivity_step.len()),
                ("sensitivity_floor", sensitivity_floor.len()),
            ],
            ParamGrid::DualMa {
                short_length,
                long_length,
                break_in,
                atr_length,
                trs,
            } => vec![
                ("short_length", short_length.len()),
                ("long_length", long_length.len()),
                ("break_in", break_in.len()),
                ("atr_length", atr_length.len()),
                ("trs", trs.len()),
            ],
            ParamGrid::Channel {
                recent,
                short_length,
                long_length,
                atr_length,
                trs,
            } => vec![
                ("recent", recent.len()),
                ("short_length", short_length.len()),
                ("long_length", long_length.len()),
                ("atr_length", atr_length.len()),
                ("trs", trs.len()),
            ],
            ParamGrid::Momentum { period } => vec![("period", period.len())],
        }
    }

    /// Upper bound on the number of combinations, before invalid
    /// moving-average pairs are skipped.
    pub fn size(&self) -> usize {
        self.field_lengths().iter().map(|(_, n)| n).product()
    }

    /// Every field non-empty, at least one usable combination, and every
    /// combination valid on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some((field, _)) = self.field_lengths().into_iter().find(|(_, n)| *n == 0) {
            return Err(ConfigError::EmptyGrid {
                kind: self.kind(),
                field,
            });
        }
        let specs = self.expand();
        if specs.is_empty() {
            return Err(ConfigError::DegenerateGrid(self.kind()));
        }
        for spec in &specs {
            spec.validate()?;
        }
        Ok(())
    }

    /// All parameter combinations. Moving-average pairs with
    /// `short_length >= long_length` are skipped.
    pub fn expand(&self) -> Vec<StrategySpec> {
        let mut specs = Vec::new();
        match self {
            ParamGrid::BreakoutCci {
                length,
                ema_length,
                trs,
                sensitivity_step,
                sensitivity_floor,
            } => {
                for &length in length {
                    for &ema_length in ema_length {
                        for &trs in trs {
                            for &sensitivity_step in sensitivity_step {
                                for &sensitivity_floor in sensitivity_floor {
                                    specs.push(StrategySpec::BreakoutCci {
                                        length,
                                        ema_length,
                                        trs,
                                        sensitivity_step,
                                        sensitivity_floor,
                                    });
                                }
                            }
                        }
                    }
                }
            }
            ParamGrid::DualMa {
                short_length,
                long_length,
                break_in,
                atr_length,
                trs,
            } => {
                for (short_length, long_length) in ma_pairs(short_length, long_length) {
                    for &break_in in break_in {
                        for &atr_length in atr_length {
                            for &trs in trs {
                                specs.push(StrategySpec::DualMa {
                                    short_length,
                                    long_length,
                                    break_in,
                                    atr_length,
                                    trs,
                                });
                            }
                        }
                    }
                }
            }
            ParamGrid::Channel {
                recent,
                short_length,
                long_length,
                atr_length,
                trs,
            } => {
                for &recent in recent {
                    for (short_length, long_length) in ma_pairs(short_length, long_length) {
                        for &atr_length in atr_length {
                            for &trs in trs {
                                specs.push(StrategySpec::Channel {
                                    recent,
                                    short_length,
                                    long_length,
                                    atr_length,
                                    trs,
                                });
                            }
                        }
                    }
                }
            }
            ParamGrid::Momentum { period } => {
                specs.extend(period.iter().map(|&period| StrategySpec::Momentum { period }));
            }
        }
        specs
    }
}

fn ma_pairs(short: &[usize], long: &[usize]) -> Vec<(usize, usize)> {
    short
        .iter()
        .flat_map(|&s| long.iter().filter(move |&&l| s < l).map(move |&l| (s, l)))
        .collect()
}

/// Sweep executor: runs every `(series, strategy)` pair.
#[derive(Debug, Clone)]
pub struct Sweep {
    settings: BacktestSettings,
    parallel: bool,
}

impl Sweep {
    pub fn new(settings: BacktestSettings) -> Self {
        Self {
            settings,
            parallel: true,
        }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run all pairs. Strategy failures are recorded in the results; only a
    /// failure to build a run id aborts the sweep.
    pub fn run(
        &self,
        repo: &BarRepository,
        specs: &[StrategySpec],
    ) -> Result<SweepResults, RunError> {
        let total = repo.len() * specs.len();
        let step = (total / 10).max(1);
        self.run_with_progress(repo, specs, |done, total, _| {
            if done % step == 0 || done == total {
                info!(done, total, "sweep progress");
            }
        })
    }

    /// Run all pairs, invoking `progress(done, total, record)` after each
    /// completes. `done` counts completions, so it is monotonic even when
    /// runs finish out of order.
    pub fn run_with_progress<F>(
        &self,
        repo: &BarRepository,
        specs: &[StrategySpec],
        progress: F,
    ) -> Result<SweepResults, RunError>
    where
        F: Fn(usize, usize, &RunRecord) + Send + Sync,
    {
        let jobs: Vec<(&DataLabel, &StrategySpec)> = repo
            .iter()
            .flat_map(|(label, _)| specs.iter().map(move |spec| (label, spec)))
            .collect();
        let total = jobs.len();
        let done = AtomicUsize::new(0);
        info!(
            series = repo.len(),
            strategies = specs.len(),
            runs = total,
            parallel = self.parallel,
            "starting sweep"
        );

        let execute = |(label, spec): &(&DataLabel, &StrategySpec)| -> Result<RunRecord, RunError> {
            let table = repo
                .get(label)
                .ok_or_else(|| RunError::UnknownSeries((*label).clone()))?;
            let record = run_one(label, table, spec, &self.settings)?;
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            progress(finished, total, &record);
            Ok(record)
        };

        let records = if self.parallel {
            jobs.par_iter().map(execute).collect::<Result<Vec<_>, _>>()?
        } else {
            jobs.iter().map(execute).collect::<Result<Vec<_>, _>>()?
        };

        let results = SweepResults::new(records);
        info!(
            completed = results.completed().count(),
            failed = results.failures().count(),
            "sweep finished"
        );
        Ok(results)
    }
}

/// Results from a sweep, in job order.
#[derive(Debug, Clone, Default)]
pub struct SweepResults {
    records: Vec<RunRecord>,
    by_run_id: HashMap<String, usize>,
}

impl SweepResults {
    pub fn new(records: Vec<RunRecord>) -> Self {
        for record in &records {
            if let Some(error) = record.outcome.error() {
                warn!(run_id = %record.run_id, label = %record.label, strategy = record.strategy.name(), %error, "run failed");
            }
        }
        let by_run_id = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.run_id.clone(), i))
            .collect();
        Self { records, by_run_id }
    }

    pub fn all(&self) -> &[RunRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, run_id: &str) -> Option<&RunRecord> {
        self.by_run_id.get(run_id).map(|&i| &self.records[i])
    }

    /// Records that produced a curve.
    pub fn completed(&self) -> impl Iterator<Item = &RunRecord> {
        self.records.iter().filter(|r| r.outcome.curve().is_some())
    }

    /// Records whose strategy failed, with the recorded error.
    pub fn failures(&self) -> impl Iterator<Item = &RunRecord> {
        self.records.iter().filter(|r| r.outcome.error().is_some())
    }

    /// Equal-cost blend of every completed curve.
    pub fn combined_curve(&self) -> ReturnCurve {
        combine(self.completed().filter_map(|r| r.outcome.curve()))
    }

    /// Completed record with the highest Sharpe ratio.
    pub fn best_by_sharpe(&self) -> Option<&RunRecord> {
        self.completed().max_by(|a, b| {
            let sa = a.outcome.metrics().map_or(f64::NEG_INFINITY, |m| m.sharpe);
            let sb = b.outcome.metrics().map_or(f64::NEG_INFINITY, |m| m.sharpe);
            sa.total_cmp(&sb)
        })
    }
}
