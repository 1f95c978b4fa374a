//! Equal-cost blending of return curves.
//!
//! Each curve is decomposed into per-period (cost, return value) pairs,
//! where cost is the value exposed at the start of the period (the previous
//! cumulative value, 1 for the first observation). Pairs are summed across
//! curves on the union of their timestamps; a curve contributes nothing on
//! timestamps where it has no observation. The blended period return is
//! `sum(return_value) / sum(cost)` and the blended curve is its running
//! product.
//!
//! Splitting a curve at any point and renormalising the tail to start from
//! 1 leaves the blend of the two pieces equal to the original curve.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use super::{CurvePoint, ReturnCurve};

/// Value exposed at the start of a period and its change over the period.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CostReturn {
    pub cost: f64,
    pub return_value: f64,
}

/// Decompose a cumulative curve into (cost, return value) pairs.
pub fn cost_and_return(curve: &ReturnCurve) -> Vec<(NaiveDateTime, CostReturn)> {
    let mut previous = 1.0;
    curve
        .points()
        .iter()
        .map(|p| {
            let pair = CostReturn {
                cost: previous,
                return_value: p.value - previous,
            };
            previous = p.value;
            (p.timestamp, pair)
        })
        .collect()
}

/// Blend any number of curves into one. Empty curves are ignored; no
/// non-empty input gives an empty curve.
pub fn combine<'a, I>(curves: I) -> ReturnCurve
where
    I: IntoIterator<Item = &'a ReturnCurve>,
{
    let mut totals: BTreeMap<NaiveDateTime, CostReturn> = BTreeMap::new();
    for curve in curves.into_iter().filter(|c| !c.is_empty()) {
        for (timestamp, pair) in cost_and_return(curve) {
            let slot = totals.entry(timestamp).or_default();
            slot.cost += pair.cost;
            slot.return_value += pair.return_value;
        }
    }

    let mut cumulative = 1.0;
    let points = totals
        .into_iter()
        .map(|(timestamp, total)| {
            let blended = if total.cost == 0.0 {
                0.0
            } else {
                total.return_value / total.cost
            };
            cumulative *= 1.0 + blended;
            CurvePoint {
                timestamp,
                value: cumulative,
            }
        })
        .collect();

    ReturnCurve::from_ordered(points)
}
