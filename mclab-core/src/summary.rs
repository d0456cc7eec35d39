//! Terminal-value summary statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ensemble::PathEnsemble;

/// Keys produced by [`SummaryStatistics::to_map`], in declaration order.
pub const SUMMARY_KEYS: [&str; 5] = ["mean", "median", "std_dev", "min", "max"];

/// Mean, median, population standard deviation, min and max of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation (divides by N).
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl SummaryStatistics {
    /// Summarize an arbitrary sample. Returns `None` for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self::from_non_empty(values.to_vec()))
    }

    /// Caller guarantees `values` is non-empty.
    fn from_non_empty(mut values: Vec<f64>) -> Self {
        values.sort_by(f64::total_cmp);

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Self {
            mean,
            median: percentile_sorted(&values, 50.0),
            std_dev: variance.sqrt(),
            min: values[0],
            max: values[values.len() - 1],
        }
    }

    /// Keyed view with exactly the keys in [`SUMMARY_KEYS`].
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("mean", self.mean),
            ("median", self.median),
            ("std_dev", self.std_dev),
            ("min", self.min),
            ("max", self.max),
        ])
    }
}

/// Summarize the terminal column of an ensemble.
pub fn summarize(ensemble: &PathEnsemble) -> SummaryStatistics {
    // An ensemble always holds at least one path.
    SummaryStatistics::from_non_empty(ensemble.terminal_values())
}

/// Percentile of a sorted slice using linear interpolation, `p` in `[0, 100]`.
///
/// Returns 0.0 for an empty slice.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}
