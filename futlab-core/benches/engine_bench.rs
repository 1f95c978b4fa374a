//! Criterion benchmarks for futlab hot paths.
//!
//! Benchmarks:
//! 1. Signal pipeline (adjust, rollover, entries, exits, positions)
//! 2. Simulator over a fully signalled table
//! 3. Chandelier automaton alone
//! 4. Curve blending across many runs

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use futlab_core::curve::{combine, ReturnCurve};
use futlab_core::domain::{AdjustedPrices, Bar, BarTable, SideFlags};
use futlab_core::engine::{simulate, SimConfig};
use futlab_core::prep::{adjust_prices, PriceBasis};
use futlab_core::signals::{chandelier_scan, ChandelierParams};
use futlab_core::strategy::{generate_signals, StrategySpec};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2015, 1, 5).unwrap();
    let mut previous = 3000.0;
    (0..n)
        .map(|i| {
            let close = 3000.0 + (i as f64 * 0.05).sin() * 150.0 + (i as f64 * 0.013).cos() * 40.0;
            let open = previous;
            let bar = Bar {
                timestamp: (base + chrono::Duration::days(i as i64))
                    .and_hms_opt(15, 0, 0)
                    .unwrap(),
                open,
                high: open.max(close) + 8.0,
                low: open.min(close) - 8.0,
                close,
                preclose: previous,
                volume: 50_000 + (i as u64 % 7_000),
                contract_id: format!("C{}", i / 63),
            };
            previous = close;
            bar
        })
        .collect()
}

fn breakout_spec() -> StrategySpec {
    StrategySpec::BreakoutCci {
        length: 20,
        ema_length: 50,
        trs: 0.05,
        sensitivity_step: 0.1,
        sensitivity_floor: 0.5,
    }
}

// ── 1. Signal pipeline ───────────────────────────────────────────────

fn bench_signal_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("signal_pipeline");

    for &bar_count in &[1260, 5040] {
        let table = BarTable::new(make_bars(bar_count));
        let specs = [
            breakout_spec(),
            StrategySpec::DualMa {
                short_length: 10,
                long_length: 60,
                break_in: 0.002,
                atr_length: 20,
                trs: 3.0,
            },
        ];
        for spec in &specs {
            group.bench_with_input(
                BenchmarkId::new(spec.name(), bar_count),
                &bar_count,
                |b, _| {
                    b.iter(|| {
                        generate_signals(black_box(&table), black_box(spec), PriceBasis::Adjusted)
                    });
                },
            );
        }
    }

    group.finish();
}

// ── 2. Simulator ─────────────────────────────────────────────────────

fn bench_simulator(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulator");
    let config = SimConfig::new(0.0003).unwrap();

    for &bar_count in &[1260, 5040, 20160] {
        let table = BarTable::new(make_bars(bar_count));
        let Ok(signalled) = generate_signals(&table, &breakout_spec(), PriceBasis::Adjusted) else {
            continue;
        };
        group.bench_with_input(
            BenchmarkId::new("breakout_cci", bar_count),
            &bar_count,
            |b, _| {
                b.iter(|| simulate(black_box(&signalled), black_box(&config)));
            },
        );
    }

    group.finish();
}

// ── 3. Chandelier automaton ──────────────────────────────────────────

fn bench_chandelier(c: &mut Criterion) {
    let mut group = c.benchmark_group("chandelier_scan");
    let params = ChandelierParams::default();

    for &bar_count in &[1260, 20160] {
        let bars = make_bars(bar_count);
        let prices: AdjustedPrices = adjust_prices(&bars).unwrap_or_default();
        let mut entries = SideFlags::none(bar_count);
        for i in (0..bar_count).step_by(40) {
            entries.long[i] = true;
        }
        group.bench_with_input(
            BenchmarkId::new("entry_every_40", bar_count),
            &bar_count,
            |b, _| {
                b.iter(|| {
                    chandelier_scan(
                        black_box(&prices),
                        black_box(&entries),
                        SideFlags::none(bar_count),
                        &params,
                    )
                });
            },
        );
    }

    group.finish();
}

// ── 4. Curve blending ────────────────────────────────────────────────

fn bench_combine(c: &mut Criterion) {
    let mut group = c.benchmark_group("combine");

    let curves: Vec<ReturnCurve> = (0..100)
        .map(|k| {
            let bars = make_bars(1260 + k * 5);
            let stamps: Vec<_> = bars.iter().skip(k * 5).map(|b| b.timestamp).collect();
            let values: Vec<f64> = (0..stamps.len())
                .map(|i| 1.0 + (i as f64 * 0.01 + k as f64).sin() * 0.1)
                .collect();
            ReturnCurve::from_parts(&stamps, &values).unwrap_or_default()
        })
        .collect();

    group.bench_function("100_curves_1260_bars", |b| {
        b.iter(|| combine(black_box(&curves)));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_signal_pipeline,
    bench_simulator,
    bench_chandelier,
    bench_combine,
);
criterion_main!(benches);
