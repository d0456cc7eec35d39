//! Path performance metrics: pure functions over a single value path.
//!
//! Every metric is a pure function: value series in, scalar (or series) out.
//! A simulated path is treated like a daily equity curve with 252 periods per
//! year. `EnsembleMetrics` applies them to every path of an ensemble and
//! summarizes each metric across paths.

use mclab_core::{PathEnsemble, SummaryStatistics};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Periods per year used for annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Risk-free rate applied when none is configured.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.01;

/// Metrics for one path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathMetrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe: f64,
    pub max_drawdown: f64,
}

impl PathMetrics {
    /// Compute all metrics for one path. Annualization uses the path length as the day count.
    pub fn compute(values: &[f64], risk_free_rate: f64) -> Self {
        Self {
            total_return: total_return(values),
            annualized_return: annualized_return(values, values.len()),
            annualized_volatility: annualized_volatility(values),
            sharpe: sharpe_ratio(values, risk_free_rate),
            max_drawdown: max_drawdown(values),
        }
    }
}

/// Cross-path distribution of each metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsembleMetrics {
    pub total_return: SummaryStatistics,
    pub annualized_return: SummaryStatistics,
    pub annualized_volatility: SummaryStatistics,
    pub sharpe: SummaryStatistics,
    pub max_drawdown: SummaryStatistics,
}

impl EnsembleMetrics {
    /// Compute per-path metrics in parallel and summarize each across paths.
    pub fn from_ensemble(ensemble: &PathEnsemble, risk_free_rate: f64) -> Self {
        let per_path: Vec<PathMetrics> = ensemble
            .as_slice()
            .par_chunks(ensemble.num_columns())
            .map(|path| PathMetrics::compute(path, risk_free_rate))
            .collect();
        Self::from_path_metrics(&per_path)
    }

    fn from_path_metrics(per_path: &[PathMetrics]) -> Self {
        let column = |f: fn(&PathMetrics) -> f64| -> SummaryStatistics {
            let values: Vec<f64> = per_path.iter().map(f).collect();
            SummaryStatistics::from_values(&values).unwrap_or(SummaryStatistics {
                mean: 0.0,
                median: 0.0,
                std_dev: 0.0,
                min: 0.0,
                max: 0.0,
            })
        };

        Self {
            total_return: column(|m| m.total_return),
            annualized_return: column(|m| m.annualized_return),
            annualized_volatility: column(|m| m.annualized_volatility),
            sharpe: column(|m| m.sharpe),
            max_drawdown: column(|m| m.max_drawdown),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Return relative to the first value at every point: `v / v[0] - 1`.
///
/// Empty for an empty series or a non-positive first value.
pub fn cumulative_returns(values: &[f64]) -> Vec<f64> {
    match values.first() {
        Some(&first) if first > 0.0 => values.iter().map(|v| v / first - 1.0).collect(),
        _ => Vec::new(),
    }
}

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(values: &[f64]) -> f64 {
    match (values.first(), values.last()) {
        (Some(&initial), Some(&last)) if values.len() >= 2 && initial > 0.0 => {
            (last - initial) / initial
        }
        _ => 0.0,
    }
}

/// Annualized return over `num_days` periods: `(1 + total)^(252 / num_days) - 1`.
///
/// Returns 0.0 when `num_days` is zero or the series is too short.
pub fn annualized_return(values: &[f64], num_days: usize) -> f64 {
    if num_days == 0 || values.len() < 2 {
        return 0.0;
    }
    let growth = 1.0 + total_return(values);
    if growth <= 0.0 {
        return -1.0;
    }
    growth.powf(TRADING_DAYS_PER_YEAR / num_days as f64) - 1.0
}

/// Population standard deviation of simple period returns, scaled by sqrt(252).
pub fn annualized_volatility(values: &[f64]) -> f64 {
    let returns = period_returns(values);
    if returns.is_empty() {
        return 0.0;
    }
    std_dev(&returns) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Sharpe ratio: (annualized return - rf) / annualized volatility.
///
/// The annualized return uses the series length as its day count.
/// Returns 0.0 if volatility is zero.
pub fn sharpe_ratio(values: &[f64], risk_free_rate: f64) -> f64 {
    let vol = annualized_volatility(values);
    if vol < 1e-15 {
        return 0.0;
    }
    (annualized_return(values, values.len()) - risk_free_rate) / vol
}

/// Maximum drawdown as a negative fraction (e.g., -0.15 = 15% drawdown).
///
/// Returns 0.0 if the series is constant or monotonically increasing.
pub fn max_drawdown(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &v in values {
        if v > peak {
            peak = v;
        }
        if peak > 0.0 {
            let dd = (v - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Simple returns between consecutive values; skips non-positive denominators.
pub fn period_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter(|w| w[0] > 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean_f64(values);
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cumulative_returns_start_at_zero() {
        let r = cumulative_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 3);
        assert_eq!(r[0], 0.0);
        assert_relative_eq!(r[1], 0.1, epsilon = 1e-12);
        assert_relative_eq!(r[2], -0.01, epsilon = 1e-12);
        assert!(cumulative_returns(&[]).is_empty());
    }

    #[test]
    fn total_return_basic() {
        assert_relative_eq!(total_return(&[100.0, 150.0]), 0.5);
        assert_eq!(total_return(&[100.0]), 0.0);
        assert_eq!(total_return(&[]), 0.0);
    }

    #[test]
    fn annualized_return_over_one_year_is_total_return() {
        let values = [100.0, 110.0];
        assert_relative_eq!(annualized_return(&values, 252), 0.1, epsilon = 1e-12);
    }

    #[test]
    fn annualized_return_compounds_half_year() {
        let values = [100.0, 110.0];
        assert_relative_eq!(annualized_return(&values, 126), 0.21, epsilon = 1e-12);
        assert_eq!(annualized_return(&values, 0), 0.0);
    }

    #[test]
    fn constant_series_has_no_volatility() {
        let flat = [100.0; 30];
        assert_eq!(annualized_volatility(&flat), 0.0);
        assert_eq!(sharpe_ratio(&flat, 0.01), 0.0);
    }

    #[test]
    fn volatility_of_alternating_returns() {
        let values = [100.0, 110.0, 100.0];
        let r1: f64 = 0.1;
        let r2: f64 = (100.0 - 110.0) / 110.0;
        let mean = (r1 + r2) / 2.0;
        let expected = ((r1 - mean).powi(2) + (r2 - mean).powi(2)) / 2.0;
        assert_relative_eq!(
            annualized_volatility(&values),
            expected.sqrt() * 252.0_f64.sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn drawdown_of_monotone_series_is_zero() {
        assert_eq!(max_drawdown(&[1.0, 2.0, 3.0, 4.0]), 0.0);
    }

    #[test]
    fn drawdown_finds_deepest_trough() {
        let dd = max_drawdown(&[100.0, 120.0, 90.0, 130.0, 117.0]);
        assert_relative_eq!(dd, -0.25, epsilon = 1e-12);
    }

    #[test]
    fn sharpe_sign_follows_excess_return() {
        let up = [100.0, 101.0, 103.0, 102.0, 105.0];
        let down = [100.0, 99.0, 97.0, 98.0, 95.0];
        assert!(sharpe_ratio(&up, 0.01) > 0.0);
        assert!(sharpe_ratio(&down, 0.01) < 0.0);
    }

    #[test]
    fn ensemble_metrics_summarize_each_path() {
        let ensemble = PathEnsemble::from_rows(vec![
            vec![100.0, 110.0, 121.0],
            vec![100.0, 90.0, 81.0],
        ])
        .unwrap();
        let m = EnsembleMetrics::from_ensemble(&ensemble, DEFAULT_RISK_FREE_RATE);
        assert_relative_eq!(m.total_return.max, 0.21, epsilon = 1e-12);
        assert_relative_eq!(m.total_return.min, -0.19, epsilon = 1e-12);
        assert_relative_eq!(m.max_drawdown.min, -0.19, epsilon = 1e-12);
        assert_eq!(m.max_drawdown.max, 0.0);
    }
}
