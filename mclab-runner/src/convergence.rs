//! Sample-mean convergence against the closed-form lognormal mean.
//!
//! Runs the same model at increasing path counts and records how far the
//! terminal sample mean sits from `E[S_T]`, alongside its standard error.

use serde::{Deserialize, Serialize};
use tracing::info;

use mclab_core::analytics::{expected_terminal_mean, standard_error};
use mclab_core::{summarize, PathSimulator, RngHierarchy, SimError, SimulationParameters};

/// One path count in a convergence study.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergencePoint {
    pub num_paths: usize,
    pub sample_mean: f64,
    pub analytic_mean: f64,
    pub abs_error: f64,
    pub standard_error: f64,
}

impl ConvergencePoint {
    /// Error measured in standard errors. Zero when the standard error is zero.
    pub fn z_score(&self) -> f64 {
        if self.standard_error > 0.0 {
            self.abs_error / self.standard_error
        } else {
            0.0
        }
    }

    /// Whether the sample mean lies within `k` standard errors of the analytic mean.
    pub fn within(&self, k: f64) -> bool {
        self.abs_error <= k * self.standard_error
    }
}

/// Simulate `base` at each of `path_counts` and compare against the analytic mean.
///
/// All points share one master seed (the base seed, or one drawn from
/// entropy), so larger ensembles extend the smaller ones path for path.
pub fn convergence_study(
    base: &SimulationParameters,
    path_counts: &[usize],
) -> Result<Vec<ConvergencePoint>, SimError> {
    let seed = base
        .seed()
        .unwrap_or_else(|| RngHierarchy::from_entropy().master_seed());
    let analytic_mean = expected_terminal_mean(base);

    path_counts
        .iter()
        .map(|&num_paths| {
            let params = SimulationParameters::new(
                base.initial_value(),
                num_paths,
                base.num_steps(),
                base.drift(),
                base.volatility(),
            )?
            .with_seed(seed);
            let summary = summarize(&PathSimulator::new(params).generate_paths_par());
            let point = ConvergencePoint {
                num_paths,
                sample_mean: summary.mean,
                analytic_mean,
                abs_error: (summary.mean - analytic_mean).abs(),
                standard_error: standard_error(summary.std_dev, num_paths),
            };
            info!(
                num_paths,
                sample_mean = point.sample_mean,
                abs_error = point.abs_error,
                standard_error = point.standard_error,
                "convergence point"
            );
            Ok(point)
        })
        .collect()
}
