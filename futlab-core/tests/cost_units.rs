//! Commission accounting across every entry/exit/rollover interaction.
//!
//! Each scenario builds a bar series with explicit contract ids, places
//! entry/exit flags by hand, compiles positions and simulates with a 1%
//! commission so that `trade_units` can be read straight off the output.

use chrono::{NaiveDate, NaiveDateTime};
use futlab_core::domain::{Bar, BarTable, SideFlags};
use futlab_core::engine::{simulate, SimConfig, Simulation};
use futlab_core::prep::add_rollover;
use futlab_core::signals::add_position_direction;

const COMMISSION: f64 = 0.01;

fn ts(i: usize) -> NaiveDateTime {
    (NaiveDate::from_ymd_opt(2023, 3, 1).unwrap() + chrono::Duration::days(i as i64))
        .and_hms_opt(15, 0, 0)
        .unwrap()
}

/// Ten bars drifting up 1% per bar; `contracts` gives the id of each bar.
fn bars(contracts: &[&str]) -> Vec<Bar> {
    let mut price = 100.0;
    contracts
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let preclose = price;
            price *= 1.01;
            Bar {
                timestamp: ts(i),
                open: preclose,
                high: price + 0.5,
                low: preclose - 0.5,
                close: price,
                preclose,
                volume: 500,
                contract_id: id.to_string(),
            }
        })
        .collect()
}

fn run(contracts: &[&str], long_entry: &[usize], long_exit: &[usize]) -> Simulation {
    let n = contracts.len();
    let mut table = BarTable::new(bars(contracts));
    add_rollover(&mut table).unwrap();

    let mut entries = SideFlags::none(n);
    for &i in long_entry {
        entries.long[i] = true;
    }
    let mut exits = SideFlags::none(n);
    for &i in long_exit {
        exits.long[i] = true;
    }
    table.set_entries(entries).unwrap();
    table.set_exits(exits).unwrap();
    add_position_direction(&mut table).unwrap();

    simulate(&table, &SimConfig::new(COMMISSION).unwrap()).unwrap()
}

fn units(sim: &Simulation) -> Vec<u32> {
    sim.rows.iter().map(|r| r.trade_units).collect()
}

const ROLL_AFTER_3: [&str; 10] = ["A", "A", "A", "A", "B", "B", "B", "B", "B", "B"];
const ROLL_AFTER_4: [&str; 10] = ["A", "A", "A", "A", "A", "B", "B", "B", "B", "B"];
const SINGLE: [&str; 10] = ["A"; 10];

#[test]
fn entry_coincident_with_rollover_out_costs_one_unit() {
    // bar 3: long entry and last bar of contract A
    let sim = run(&ROLL_AFTER_3, &[3], &[]);
    assert_eq!(units(&sim)[3], 1);
    // re-entry into contract B on bar 4
    assert_eq!(units(&sim), vec![0, 0, 0, 1, 1, 0, 0, 0, 0, 0]);

    let row = &sim.rows[3];
    assert!((row.trade_cost - 0.01).abs() < 1e-12);
    assert!((row.per_bar_return - (0.01 - 0.01)).abs() < 1e-12);
}

#[test]
fn exit_coincident_with_rollover_in_costs_one_unit() {
    // held from bar 1, exit lands on bar 5, the first bar of contract B
    let sim = run(&ROLL_AFTER_4, &[1], &[5]);
    assert_eq!(units(&sim)[5], 1);
    assert_eq!(units(&sim), vec![0, 1, 0, 0, 1, 1, 0, 0, 0, 0]);
}

#[test]
fn rollover_alone_costs_two_units_across_the_boundary() {
    let sim = run(&ROLL_AFTER_4, &[1], &[]);
    let u = units(&sim);
    assert_eq!(u[4], 1, "closing leg on the last bar of A");
    assert_eq!(u[5], 1, "opening leg on the first bar of B");
    assert_eq!(u[4] + u[5], 2);
}

#[test]
fn one_bar_contract_carries_both_legs() {
    let contracts = ["A", "A", "A", "B", "C", "C", "C", "C", "C", "C"];
    let sim = run(&contracts, &[1], &[]);
    assert_eq!(units(&sim), vec![0, 1, 1, 2, 1, 0, 0, 0, 0, 0]);
}

#[test]
fn entry_or_exit_alone_costs_one_unit() {
    let sim = run(&SINGLE, &[2], &[6]);
    assert_eq!(units(&sim), vec![0, 0, 1, 0, 0, 0, 1, 0, 0, 0]);
    assert_eq!(sim.total_trade_units(), 2);
}

#[test]
fn held_bars_earn_the_raw_return_net_of_commission() {
    let sim = run(&SINGLE, &[2], &[6]);
    // bars 2..=5 long at +1% each, bar 2 pays one unit; bar 6 is flat and pays one unit
    let expected = 1.0 * (1.0 + 0.01 - 0.01) * 1.01 * 1.01 * 1.01 * (1.0 - 0.01);
    assert!((sim.final_value() - expected).abs() < 1e-12);
}
