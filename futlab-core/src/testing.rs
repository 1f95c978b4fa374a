//! Shared unit-test fixtures.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::Bar;

/// Timestamp of synthetic bar `i`: one bar per calendar day, 15:00 close.
pub fn day(i: usize) -> NaiveDateTime {
    let base = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    (base + chrono::Duration::days(i as i64))
        .and_hms_opt(15, 0, 0)
        .unwrap()
}

/// Create synthetic bars from close prices, all on one contract.
///
/// open = preclose = prev close (or close for the first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0.
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let contracts = vec!["C1"; closes.len()];
    make_contract_bars(closes, &contracts)
}

/// Like [`make_bars`] but with an explicit contract id per bar.
pub fn make_contract_bars(closes: &[f64], contracts: &[&str]) -> Vec<Bar> {
    assert_eq!(closes.len(), contracts.len());
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let preclose = if i == 0 { close } else { closes[i - 1] };
            let open = preclose;
            Bar {
                timestamp: day(i),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                preclose,
                volume: 1000,
                contract_id: contracts[i].to_string(),
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for numeric tests.
pub const DEFAULT_EPSILON: f64 = 1e-10;
