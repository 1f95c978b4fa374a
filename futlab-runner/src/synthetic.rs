//! Deterministic synthetic futures series.
//!
//! Random-walk weekday bars with a contract roll every quarter (63 bars).
//! On a roll bar the new contract trades at a random basis to the old one,
//! so the raw close jumps while `close / preclose` stays a genuine one-bar
//! return. The RNG is seeded from BLAKE3 of the seed and category name: the
//! same inputs always give the same bars.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use futlab_core::Bar;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::repository::{BarRepository, DataLabel};

/// Bars per contract before rolling.
pub const ROLL_INTERVAL: usize = 63;

/// Segment name given to synthetic series.
pub const SYNTHETIC_SEGMENT: &str = "synthetic";

/// How many synthetic series to generate and how long.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    pub count: usize,
    pub len: usize,
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            count: 4,
            len: 750,
            seed: 42,
        }
    }
}

fn rng_for(category: &str, seed: u64) -> StdRng {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&seed.to_le_bytes());
    hasher.update(category.as_bytes());
    StdRng::from_seed(*hasher.finalize().as_bytes())
}

fn first_session() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 1, 2)
        .and_then(|d| d.and_hms_opt(15, 0, 0))
        .unwrap_or_default()
}

fn next_weekday(ts: NaiveDateTime) -> NaiveDateTime {
    let mut next = ts + chrono::Duration::days(1);
    while matches!(next.weekday(), Weekday::Sat | Weekday::Sun) {
        next += chrono::Duration::days(1);
    }
    next
}

/// Generate `len` bars for one category.
pub fn generate_bars(category: &str, len: usize, seed: u64) -> Vec<Bar> {
    let mut rng = rng_for(category, seed);
    let mut bars = Vec::with_capacity(len);
    let mut timestamp = first_session();
    let mut settle = rng.gen_range(50.0..5_000.0_f64);
    let mut contract = 0usize;

    for i in 0..len {
        if i > 0 {
            timestamp = next_weekday(timestamp);
            if i % ROLL_INTERVAL == 0 {
                contract += 1;
                // new contract's previous settlement, at a basis to the old one
                settle *= 1.0 + rng.gen_range(-0.02..0.02);
            }
        }

        let preclose = settle;
        let open = preclose * (1.0 + rng.gen_range(-0.005..0.005));
        let close = preclose * (1.0 + rng.gen_range(-0.03..0.03));
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));

        bars.push(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            preclose,
            volume: rng.gen_range(1_000..100_000u64),
            contract_id: format!("{category}Q{contract:02}"),
        });
        settle = close;
    }

    bars
}

/// A repository of `config.count` synthetic series named `SYN00`, `SYN01`, ...
pub fn synthetic_repository(config: &SyntheticConfig) -> BarRepository {
    let mut repo = BarRepository::new();
    for i in 0..config.count {
        let category = format!("SYN{i:02}");
        let bars = generate_bars(&category, config.len, config.seed);
        repo.insert(DataLabel::new(category, SYNTHETIC_SEGMENT), bars);
    }
    repo
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_per_category_and_seed() {
        assert_eq!(generate_bars("RB", 100, 1), generate_bars("RB", 100, 1));
        assert_ne!(generate_bars("RB", 100, 1), generate_bars("CU", 100, 1));
        assert_ne!(generate_bars("RB", 100, 1), generate_bars("RB", 100, 2));
    }

    #[test]
    fn bars_are_sane_and_ordered() {
        let bars = generate_bars("SYN", 300, 7);
        assert_eq!(bars.len(), 300);
        assert!(bars.iter().all(Bar::is_sane));
        assert!(bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert!(bars
            .iter()
            .all(|b| !matches!(b.timestamp.weekday(), Weekday::Sat | Weekday::Sun)));
    }

    #[test]
    fn contracts_roll_quarterly() {
        let bars = generate_bars("SYN", 2 * ROLL_INTERVAL + 1, 7);
        assert_eq!(bars[ROLL_INTERVAL - 1].contract_id, "SYNQ00");
        assert_eq!(bars[ROLL_INTERVAL].contract_id, "SYNQ01");
        assert_eq!(bars[2 * ROLL_INTERVAL].contract_id, "SYNQ02");
    }

    #[test]
    fn preclose_chains_within_a_contract() {
        let bars = generate_bars("SYN", ROLL_INTERVAL, 3);
        for w in bars.windows(2) {
            assert_eq!(w[1].preclose, w[0].close);
        }
    }

    #[test]
    fn repository_holds_requested_series() {
        let repo = synthetic_repository(&SyntheticConfig {
            count: 3,
            len: 20,
            seed: 0,
        });
        assert_eq!(repo.len(), 3);
        let table = repo
            .get(&DataLabel::new("SYN02", SYNTHETIC_SEGMENT))
            .unwrap();
        assert_eq!(table.len(), 20);
    }
}
