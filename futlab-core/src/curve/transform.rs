//! Pure transforms over a cumulative return curve.

use chrono::{NaiveDate, NaiveDateTime};

use super::aggregate::cost_and_return;
use super::{CurvePoint, ReturnCurve};
use crate::domain::Field;
use crate::error::CoreError;

/// Simple return of every period: `return_value / cost`. A period that
/// starts from a zero value has return 0.
pub fn period_returns(curve: &ReturnCurve) -> Vec<(NaiveDateTime, f64)> {
    cost_and_return(curve)
        .into_iter()
        .map(|(timestamp, pair)| {
            let ret = if pair.cost == 0.0 {
                0.0
            } else {
                pair.return_value / pair.cost
            };
            (timestamp, ret)
        })
        .collect()
}

/// Last point of each calendar date, in order.
fn last_per_day(curve: &ReturnCurve) -> Vec<CurvePoint> {
    let mut closes: Vec<CurvePoint> = Vec::new();
    for p in curve.points() {
        match closes.last_mut() {
            Some(last) if last.timestamp.date() == p.timestamp.date() => *last = *p,
            _ => closes.push(*p),
        }
    }
    closes
}

/// Down-sample to one point per calendar date: the day's last observation,
/// timestamp included.
pub fn resample_daily(curve: &ReturnCurve) -> ReturnCurve {
    ReturnCurve::from_ordered(last_per_day(curve))
}

/// Day-over-day returns from the last observation of each calendar date.
/// The value before the first day is the implicit 1.0; a day following a
/// zero value returns 0.
pub fn daily_returns(curve: &ReturnCurve) -> Vec<(NaiveDate, f64)> {
    let mut previous = 1.0;
    last_per_day(curve)
        .into_iter()
        .map(|p| {
            let ret = if previous == 0.0 {
                0.0
            } else {
                p.value / previous - 1.0
            };
            previous = p.value;
            (p.timestamp.date(), ret)
        })
        .collect()
}

/// Divide every value by the first so the curve starts at exactly 1.0.
pub fn rebase(curve: &ReturnCurve) -> Result<ReturnCurve, CoreError> {
    let Some(first) = curve.points().first() else {
        return Ok(ReturnCurve::empty());
    };
    if first.value == 0.0 {
        return Err(CoreError::DegenerateInput {
            field: Field::CumulativeReturn,
            index: 0,
        });
    }
    let base = first.value;
    Ok(ReturnCurve::from_ordered(
        curve
            .points()
            .iter()
            .map(|p| CurvePoint {
                timestamp: p.timestamp,
                value: p.value / base,
            })
            .collect(),
    ))
}
