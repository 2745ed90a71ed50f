//! Performance metrics — pure functions over a cumulative curve or a return series.
//!
//! No dependencies on the replay, the data boundary, or the runner. Degenerate
//! inputs (flat series, zero elapsed time) resolve to `0.0`, never to an error.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Trading days per year used to annualize the Sharpe ratio.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Calendar days per year used by CAGR.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Summary statistics for one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub cagr: f64,
    pub max_drawdown: f64,
    pub sharpe: f64,
    /// Number of daily returns.
    pub return_days: usize,
    /// Calendar days between the first and last curve dates.
    pub total_days: i64,
}

impl PerformanceMetrics {
    /// `cumulative` and `dates` describe the curve including its 1.0 anchor;
    /// `returns` are the daily returns after the anchor.
    pub fn compute(cumulative: &[f64], dates: &[NaiveDate], returns: &[f64]) -> Self {
        let total_days = match (dates.first(), dates.last()) {
            (Some(first), Some(last)) => (*last - *first).num_days(),
            _ => 0,
        };
        Self {
            total_return: total_return(cumulative),
            cagr: cagr(cumulative, total_days),
            max_drawdown: max_drawdown(cumulative),
            sharpe: sharpe_ratio(returns),
            return_days: returns.len(),
            total_days,
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a fraction: final / initial - 1.
pub fn total_return(cumulative: &[f64]) -> f64 {
    match (cumulative.first(), cumulative.last()) {
        (Some(&initial), Some(&last)) if initial > 0.0 => last / initial - 1.0,
        _ => 0.0,
    }
}

/// Compound annual growth rate over calendar days: `cum[last]^(365.25 / days) - 1`.
///
/// Returns 0.0 when no time has elapsed or the final value is not positive.
pub fn cagr(cumulative: &[f64], total_days: i64) -> f64 {
    let Some(&last) = cumulative.last() else {
        return 0.0;
    };
    if total_days <= 0 || last <= 0.0 {
        return 0.0;
    }
    last.powf(DAYS_PER_YEAR / total_days as f64) - 1.0
}

/// Maximum drawdown as a non-positive fraction of the running peak.
pub fn max_drawdown(cumulative: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    for &value in cumulative {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let dd = (value - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// Annualized Sharpe ratio with zero risk-free rate:
/// `mean·252 / (std·√252)`, sample standard deviation.
///
/// Returns 0.0 for fewer than 2 returns or zero variance. This is a policy
/// sentinel for flat series, kept as is.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let avg = mean(returns);
    let std = std_dev(returns);
    // Rounding leaves a constant series with a tiny nonzero std.
    if !std.is_finite() || std < 1e-15 || std <= avg.abs() * 1e-12 {
        return 0.0;
    }
    (avg * TRADING_DAYS_PER_YEAR) / (std * TRADING_DAYS_PER_YEAR.sqrt())
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
