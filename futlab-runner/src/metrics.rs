//! Performance metrics over a cumulative return curve.
//!
//! Every metric is a pure function of the curve, which starts from an
//! implicit value of 1.0. Daily statistics use the last observation of each
//! calendar date, so intraday curves are measured the same way as daily ones.

use futlab_core::curve::daily_returns;
use futlab_core::ReturnCurve;
use serde::{Deserialize, Serialize};

/// Trading days per year used for annualisation.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Summary statistics of one return curve.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub final_value: f64,
    pub total_return: f64,
    pub annual_return: f64,
    pub sharpe: f64,
    pub max_drawdown: f64,
    pub trading_days: usize,
}

impl PerformanceMetrics {
    pub fn compute(curve: &ReturnCurve) -> Self {
        let daily: Vec<f64> = daily_returns(curve).into_iter().map(|(_, r)| r).collect();
        let final_value = curve.final_value();
        Self {
            final_value,
            total_return: total_return(final_value),
            annual_return: annual_return(final_value, daily.len()),
            sharpe: sharpe_ratio(&daily),
            max_drawdown: max_drawdown(&curve.values()),
            trading_days: daily.len(),
        }
    }
}

/// Total return as a fraction of the starting value 1.0.
pub fn total_return(final_value: f64) -> f64 {
    final_value - 1.0
}

/// Geometric annualised return. 0.0 with fewer than two days or a
/// non-positive final value.
pub fn annual_return(final_value: f64, trading_days: usize) -> f64 {
    if trading_days < 2 || final_value <= 0.0 {
        return 0.0;
    }
    let years = trading_days as f64 / TRADING_DAYS_PER_YEAR;
    final_value.powf(1.0 / years) - 1.0
}

/// Annualised Sharpe ratio of daily returns with zero risk-free rate.
///
/// Sharpe = mean / sample std * sqrt(252). Returns 0.0 for fewer than two
/// returns or zero variance.
pub fn sharpe_ratio(daily: &[f64]) -> f64 {
    if daily.len() < 2 {
        return 0.0;
    }
    let std = std_dev(daily);
    if std < 1e-15 {
        return 0.0;
    }
    mean_f64(daily) / std * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Largest peak-to-trough decline as a negative fraction; 0.0 if the curve
/// never falls below a previous peak. The implicit starting 1.0 counts as a
/// peak.
pub fn max_drawdown(values: &[f64]) -> f64 {
    let mut peak = 1.0_f64;
    let mut max_dd = 0.0_f64;
    for &v in values {
        if v > peak {
            peak = v;
        }
        if peak > 0.0 {
            max_dd = max_dd.min((v - peak) / peak);
        }
    }
    max_dd
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
