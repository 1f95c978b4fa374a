//! Return curves: net-asset-value series produced by the simulator.
//!
//! A curve is implicitly 1.0 before its first observation. Once built it is
//! never mutated; aggregation and the transforms always return new values.

pub mod aggregate;
pub mod transform;

pub use aggregate::{combine, cost_and_return, CostReturn};
pub use transform::{daily_returns, period_returns, rebase, resample_daily};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::Field;
use crate::error::CoreError;

/// One observation of a return curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Timestamp-ordered cumulative return values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<CurvePoint>", into = "Vec<CurvePoint>")]
pub struct ReturnCurve {
    points: Vec<CurvePoint>,
}

impl ReturnCurve {
    /// Build a curve, rejecting timestamps that are not strictly increasing.
    pub fn new(points: Vec<CurvePoint>) -> Result<Self, CoreError> {
        if let Some(index) = points
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(CoreError::UnorderedTimestamps { index: index + 1 });
        }
        Ok(Self { points })
    }

    pub fn from_parts(timestamps: &[NaiveDateTime], values: &[f64]) -> Result<Self, CoreError> {
        if timestamps.len() != values.len() {
            return Err(CoreError::LengthMismatch {
                field: Field::CumulativeReturn,
                expected: timestamps.len(),
                actual: values.len(),
            });
        }
        Self::new(
            timestamps
                .iter()
                .zip(values)
                .map(|(&timestamp, &value)| CurvePoint { timestamp, value })
                .collect(),
        )
    }

    /// Points already known to be ordered (built from an ordered source).
    pub(crate) fn from_ordered(points: Vec<CurvePoint>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        Self { points }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Last value, or the implicit 1.0 of an empty curve.
    pub fn final_value(&self) -> f64 {
        self.points.last().map_or(1.0, |p| p.value)
    }
}

impl TryFrom<Vec<CurvePoint>> for ReturnCurve {
    type Error = CoreError;

    fn try_from(points: Vec<CurvePoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<ReturnCurve> for Vec<CurvePoint> {
    fn from(curve: ReturnCurve) -> Self {
        curve.points
    }
}
