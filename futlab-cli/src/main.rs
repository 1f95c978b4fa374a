//! futlab CLI - single runs, parameter sweeps and curve blending.
//!
//! Commands:
//! - `run`: one strategy on one bar CSV (or a synthetic series), prints metrics
//! - `sweep`: a TOML-configured sweep, writes records and the blended curve
//! - `combine`: blend saved curve CSVs into one equal-cost curve

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use futlab_core::curve::{combine, resample_daily};
use futlab_core::{BarTable, PriceBasis, ReturnCurve, StrategySpec};
use futlab_runner::export::{
    curve_to_csv, read_curve, save_sweep_artifacts, simulation_to_csv, write_curve,
};
use futlab_runner::repository::read_bars;
use futlab_runner::synthetic::generate_bars;
use futlab_runner::{
    synthetic_repository, BacktestSettings, BarRepository, PerformanceMetrics, Sweep,
    SweepConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "futlab",
    about = "futlab CLI - futures strategy backtesting and return-curve blending"
)]
struct Cli {
    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest one strategy on one bar series.
    Run {
        /// Bar CSV file (timestamp,open,high,low,close,preclose,volume,contract_id).
        #[arg(long, conflicts_with = "synthetic")]
        data: Option<PathBuf>,

        /// Use a deterministic synthetic series instead of a CSV file.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Length of the synthetic series.
        #[arg(long, default_value_t = 750)]
        synthetic_len: usize,

        #[command(flatten)]
        strategy: StrategyArgs,

        #[command(flatten)]
        backtest: BacktestArgs,

        /// Write the return curve to this CSV.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write every simulator column to this CSV.
        #[arg(long)]
        debug_csv: Option<PathBuf>,
    },
    /// Run a parameter sweep described by a TOML file.
    Sweep {
        /// Path to the sweep TOML.
        #[arg(long)]
        config: PathBuf,

        /// Output directory; overrides `[output] dir`.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Run sequentially on one thread.
        #[arg(long, default_value_t = false)]
        sequential: bool,
    },
    /// Blend saved curve CSVs into one equal-cost curve.
    Combine {
        /// Curve CSVs (timestamp,cumulative_return).
        #[arg(required = true)]
        curves: Vec<PathBuf>,

        /// Keep only the last observation of each day.
        #[arg(long, default_value_t = false)]
        daily: bool,

        /// Output CSV; prints to stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyKind {
    BreakoutCci,
    DualMa,
    Channel,
    Momentum,
}

#[derive(Clone, Copy, ValueEnum)]
enum Basis {
    Adjusted,
    Raw,
}

impl From<Basis> for PriceBasis {
    fn from(basis: Basis) -> Self {
        match basis {
            Basis::Adjusted => PriceBasis::Adjusted,
            Basis::Raw => PriceBasis::Raw,
        }
    }
}

#[derive(clap::Args)]
struct StrategyArgs {
    /// Strategy family.
    #[arg(long, value_enum)]
    strategy: StrategyKind,

    /// Breakout / CCI window.
    #[arg(long, default_value_t = 20)]
    length: usize,

    /// EMA smoothing of the CCI.
    #[arg(long, default_value_t = 5)]
    ema_length: usize,

    /// Stop width: fraction of open (breakout_cci) or ATR multiple (dual_ma, channel).
    #[arg(long)]
    trs: Option<f64>,

    #[arg(long, default_value_t = 0.1)]
    sensitivity_step: f64,

    #[arg(long, default_value_t = 0.5)]
    sensitivity_floor: f64,

    #[arg(long, default_value_t = 10)]
    short_length: usize,

    #[arg(long, default_value_t = 40)]
    long_length: usize,

    /// Band around the long MA that the short MA must clear.
    #[arg(long, default_value_t = 0.0)]
    break_in: f64,

    /// Closing-range lookback for the channel strategy.
    #[arg(long, default_value_t = 20)]
    recent: usize,

    #[arg(long, default_value_t = 14)]
    atr_length: usize,

    /// Momentum lookback.
    #[arg(long, default_value_t = 20)]
    period: usize,
}

impl StrategyArgs {
    fn to_spec(&self) -> StrategySpec {
        match self.strategy {
            StrategyKind::BreakoutCci => StrategySpec::BreakoutCci {
                length: self.length,
                ema_length: self.ema_length,
                trs: self.trs.unwrap_or(0.12),
                sensitivity_step: self.sensitivity_step,
                sensitivity_floor: self.sensitivity_floor,
            },
            StrategyKind::DualMa => StrategySpec::DualMa {
                short_length: self.short_length,
                long_length: self.long_length,
                break_in: self.break_in,
                atr_length: self.atr_length,
                trs: self.trs.unwrap_or(3.0),
            },
            StrategyKind::Channel => StrategySpec::Channel {
                recent: self.recent,
                short_length: self.short_length,
                long_length: self.long_length,
                atr_length: self.atr_length,
                trs: self.trs.unwrap_or(3.0),
            },
            StrategyKind::Momentum => StrategySpec::Momentum {
                period: self.period,
            },
        }
    }
}

#[derive(clap::Args)]
struct BacktestArgs {
    /// Commission per trade leg, as a fraction of notional.
    #[arg(long, default_value_t = 0.0003)]
    commission: f64,

    /// Prices the signals are computed on.
    #[arg(long, value_enum, default_value_t = Basis::Adjusted)]
    price_basis: Basis,
}

impl BacktestArgs {
    fn settings(&self) -> BacktestSettings {
        BacktestSettings {
            commission: self.commission,
            price_basis: self.price_basis.into(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            data,
            synthetic,
            synthetic_len,
            strategy,
            backtest,
            output,
            debug_csv,
        } => run_cmd(
            data.as_deref(),
            synthetic.then_some(synthetic_len),
            &strategy.to_spec(),
            &backtest.settings(),
            output.as_deref(),
            debug_csv.as_deref(),
        ),
        Commands::Sweep {
            config,
            output,
            sequential,
        } => sweep_cmd(&config, output, sequential),
        Commands::Combine {
            curves,
            daily,
            output,
        } => combine_cmd(&curves, daily, output.as_deref()),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_cmd(
    data: Option<&Path>,
    synthetic_len: Option<usize>,
    spec: &StrategySpec,
    settings: &BacktestSettings,
    output: Option<&Path>,
    debug_csv: Option<&Path>,
) -> Result<()> {
    let bars = match (data, synthetic_len) {
        (Some(path), None) => read_bars(path)?,
        (None, Some(len)) => generate_bars("SYN", len, 42),
        _ => bail!("one of --data or --synthetic is required"),
    };
    let table = BarTable::new(bars);
    info!(bars = table.len(), strategy = spec.name(), "running backtest");

    let simulation = futlab_runner::simulate_strategy(&table, spec, settings)
        .with_context(|| format!("{} failed", spec.name()))?;
    let curve = simulation.curve();
    let metrics = PerformanceMetrics::compute(&curve);

    print_metrics(spec, &metrics, simulation.total_trade_units());

    if let Some(path) = output {
        write_curve(path, &curve)?;
        println!("Curve written to: {}", path.display());
    }
    if let Some(path) = debug_csv {
        let csv = simulation_to_csv(&simulation)?;
        std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))?;
        println!("Simulation rows written to: {}", path.display());
    }
    Ok(())
}

fn sweep_cmd(config_path: &Path, output: Option<PathBuf>, sequential: bool) -> Result<()> {
    let config = SweepConfig::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;

    let repo = match (&config.data.root, &config.data.synthetic) {
        (Some(root), _) => BarRepository::open(root)?,
        (None, Some(syn)) => synthetic_repository(syn),
        (None, None) => bail!("config has no data source"),
    };
    let specs = config.specs();

    let results = Sweep::new(config.backtest)
        .with_parallelism(config.output.parallel && !sequential)
        .run(&repo, &specs)?;

    let combined = results.combined_curve();
    let output_dir = output.unwrap_or_else(|| config.output.dir.clone());
    let paths = save_sweep_artifacts(results.all(), &combined, &output_dir)?;

    println!("=== Sweep Summary ===");
    println!("Series:     {}", repo.len());
    println!("Strategies: {}", specs.len());
    println!("Runs:       {}", results.len());
    println!("Completed:  {}", results.completed().count());
    println!("Failed:     {}", results.failures().count());
    println!("Blended:    {:.4}", combined.final_value());
    if let Some(best) = results.best_by_sharpe() {
        if let Some(m) = best.outcome.metrics() {
            println!(
                "Best:       {} on {} (Sharpe {:.3}, return {:.2}%)",
                best.strategy.name(),
                best.label,
                m.sharpe,
                m.total_return * 100.0
            );
        }
    }
    for path in paths {
        println!("Wrote: {}", path.display());
    }
    Ok(())
}

fn combine_cmd(paths: &[PathBuf], daily: bool, output: Option<&Path>) -> Result<()> {
    let curves = paths
        .iter()
        .map(|p| read_curve(p))
        .collect::<Result<Vec<ReturnCurve>>>()?;
    let mut blended = combine(&curves);
    if daily {
        blended = resample_daily(&blended);
    }
    info!(inputs = curves.len(), points = blended.len(), "curves combined");

    match output {
        Some(path) => {
            write_curve(path, &blended)?;
            println!("Combined curve written to: {}", path.display());
        }
        None => print!("{}", curve_to_csv(&blended)?),
    }
    Ok(())
}

fn print_metrics(spec: &StrategySpec, m: &PerformanceMetrics, trade_units: u32) {
    println!("=== Backtest Summary ===");
    println!("Strategy:      {}", spec.name());
    println!("Trading days:  {}", m.trading_days);
    println!("Trade units:   {trade_units}");
    println!("Final value:   {:.4}", m.final_value);
    println!("Total return:  {:.2}%", m.total_return * 100.0);
    println!("Annual return: {:.2}%", m.annual_return * 100.0);
    println!("Sharpe:        {:.3}", m.sharpe);
    println!("Max drawdown:  {:.2}%", m.max_drawdown * 100.0);
}
