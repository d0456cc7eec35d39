//! Simulation runner: wires together config, simulator, summary and metrics.
//!
//! Two entry points:
//! - `run_simulation()`: validates a `SimulationConfig` and runs it. Used by sweeps.
//! - `run_with_parameters()`: takes already-validated parameters.
//!
//! Both pin a seed before deriving the RunId, so the id always names one
//! reproducible ensemble.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use mclab_core::{
    summarize, PathEnsemble, PathSimulator, RngHierarchy, SimulationParameters, SummaryStatistics,
};

use crate::config::{run_id_for, ConfigError, RunId, SimulationConfig};
use crate::metrics::EnsembleMetrics;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Current schema version for persisted run artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single simulation run.
///
/// The path matrix is held alongside the statistics but never serialized;
/// use `export::write_paths_csv` to persist it.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationRun {
    pub schema_version: u32,
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    /// Parameters with the seed actually used pinned in.
    pub params: SimulationParameters,
    pub summary: SummaryStatistics,
    pub metrics: EnsembleMetrics,
    #[serde(skip)]
    pub ensemble: PathEnsemble,
}

impl SimulationRun {
    /// The master seed that reproduces this run.
    pub fn seed(&self) -> Option<u64> {
        self.params.seed()
    }
}

/// Run the simulation a config describes.
pub fn run_simulation(config: &SimulationConfig) -> Result<SimulationRun, RunError> {
    let params = config.to_parameters()?;
    run_with_parameters(params, config.metrics.risk_free_rate, config.simulation.parallel)
}

/// Run pre-validated parameters: no I/O, no validation.
///
/// An unseeded parameter set gets a fresh master seed, which is logged and
/// recorded on the returned run and hashed into its RunId.
pub fn run_with_parameters(
    params: SimulationParameters,
    risk_free_rate: f64,
    parallel: bool,
) -> Result<SimulationRun, RunError> {
    let params = pin_seed(params);
    let run_id = run_id_for(&params, risk_free_rate)?;
    let started_at = Utc::now();
    info!(
        run_id = %run_id,
        num_paths = params.num_paths(),
        num_steps = params.num_steps(),
        drift = params.drift(),
        volatility = params.volatility(),
        seed = params.seed(),
        parallel,
        "starting simulation"
    );

    let simulator = PathSimulator::new(params.clone());
    let ensemble = if parallel {
        simulator.generate_paths_par()
    } else {
        simulator.generate_paths()
    };
    let summary = summarize(&ensemble);
    let metrics = EnsembleMetrics::from_ensemble(&ensemble, risk_free_rate);

    let elapsed_ms = (Utc::now() - started_at).num_milliseconds().max(0) as u64;
    info!(
        run_id = %run_id,
        mean = summary.mean,
        median = summary.median,
        std_dev = summary.std_dev,
        elapsed_ms,
        "simulation complete"
    );

    Ok(SimulationRun {
        schema_version: SCHEMA_VERSION,
        run_id,
        started_at,
        elapsed_ms,
        params,
        summary,
        metrics,
        ensemble,
    })
}

fn pin_seed(params: SimulationParameters) -> SimulationParameters {
    if params.seed().is_some() {
        return params;
    }
    let seed = RngHierarchy::from_entropy().master_seed();
    debug!(seed, "no seed configured, pinned one from entropy");
    params.with_seed(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationSection;

    fn config(seed: Option<u64>, parallel: bool) -> SimulationConfig {
        SimulationConfig::new(SimulationSection {
            initial_value: 1_000.0,
            num_paths: 64,
            num_steps: 20,
            drift: 0.05,
            volatility: 0.2,
            seed,
            parallel,
        })
    }

    #[test]
    fn run_produces_expected_shape() {
        let run = run_simulation(&config(Some(11), true)).unwrap();
        assert_eq!(run.ensemble.shape(), (64, 21));
        assert_eq!(run.schema_version, SCHEMA_VERSION);
        assert_eq!(run.seed(), Some(11));
        assert_eq!(run.summary, summarize(&run.ensemble));
    }

    #[test]
    fn parallel_flag_does_not_change_results() {
        let par = run_simulation(&config(Some(5), true)).unwrap();
        let seq = run_simulation(&config(Some(5), false)).unwrap();
        assert_eq!(par.ensemble, seq.ensemble);
        assert_eq!(par.summary, seq.summary);
        assert_eq!(par.run_id, seq.run_id);
    }

    #[test]
    fn unseeded_run_records_reproducing_seed() {
        let first = run_simulation(&config(None, true)).unwrap();
        let seed = first.seed().expect("runner pins a seed");
        let replay = run_simulation(&config(Some(seed), true)).unwrap();
        assert_eq!(first.ensemble, replay.ensemble);
    }

    #[test]
    fn unseeded_runs_get_distinct_run_ids() {
        let a = run_simulation(&config(None, true)).unwrap();
        let b = run_simulation(&config(None, true)).unwrap();
        assert_ne!(a.seed(), b.seed());
        assert_ne!(a.run_id, b.run_id);
    }

    #[test]
    fn seeded_run_id_matches_config() {
        let cfg = config(Some(17), true);
        let run = run_simulation(&cfg).unwrap();
        assert_eq!(run.run_id, cfg.run_id().unwrap());
    }

    #[test]
    fn pinned_seed_replays_through_toml() {
        let first = run_simulation(&config(None, false)).unwrap();

        let mut replay_cfg = config(None, false);
        replay_cfg.simulation.seed = first.seed();
        let text = toml::to_string(&replay_cfg).unwrap();
        let reloaded = SimulationConfig::from_toml_str(&text).unwrap();
        let replay = run_simulation(&reloaded).unwrap();

        assert_eq!(replay.ensemble, first.ensemble);
        assert_eq!(replay.run_id, first.run_id);
    }

    #[test]
    fn direct_parameters_run() {
        let params = SimulationParameters::new(50.0, 4, 3, 0.0, 0.1)
            .unwrap()
            .with_seed(8);
        let run = run_with_parameters(params.clone(), 0.0, false).unwrap();
        assert_eq!(run.params, params);
        assert_eq!(run.ensemble.shape(), (4, 4));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = config(Some(1), true);
        cfg.simulation.num_paths = 0;
        let err = run_simulation(&cfg).unwrap_err();
        assert!(matches!(err, RunError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn serialized_run_omits_ensemble() {
        let run = run_simulation(&config(Some(2), true)).unwrap();
        let json = serde_json::to_value(&run).unwrap();
        assert!(json.get("ensemble").is_none());
        assert!(json.get("summary").is_some());
        assert_eq!(json["params"]["seed"], 2);
    }
}
