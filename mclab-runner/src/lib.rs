//! mclab Runner: simulation orchestration on top of `mclab-core`.
//!
//! This crate builds on `mclab-core` to provide:
//! - TOML run configuration with content-addressed run ids
//! - Single-run execution with summary statistics and per-path metrics
//! - Drift × volatility parameter sweeps (rayon)
//! - Convergence studies against the closed-form lognormal mean
//! - JSON / CSV artifact export

pub mod config;
pub mod convergence;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod sweep;

pub use config::{ConfigError, RunId, SimulationConfig};
pub use convergence::{convergence_study, ConvergencePoint};
pub use export::{save_artifacts, ExportError};
pub use metrics::{EnsembleMetrics, PathMetrics};
pub use runner::{run_simulation, run_with_parameters, RunError, SimulationRun};
pub use sweep::{ParamGrid, ParamSweep, SweepResults};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn simulation_run_is_send_sync() {
        assert_send::<SimulationRun>();
        assert_sync::<SimulationRun>();
    }

    #[test]
    fn config_is_send_sync() {
        assert_send::<SimulationConfig>();
        assert_sync::<SimulationConfig>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
        assert_send::<ExportError>();
        assert_sync::<ExportError>();
    }

    #[test]
    fn sweep_results_are_send_sync() {
        assert_send::<SweepResults>();
        assert_sync::<SweepResults>();
    }
}
