//! Parameter sweep utilities for drift × volatility grids.

use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info};

use mclab_core::RngHierarchy;

use crate::config::{ConfigError, SimulationConfig, SweepSection};
use crate::runner::{run_simulation, RunError, SimulationRun};

/// Parameter grid specification.
///
/// An empty axis keeps the base config's value for that parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamGrid {
    pub drifts: Vec<f64>,
    pub volatilities: Vec<f64>,
    pub seeds: Vec<u64>,
}

impl ParamGrid {
    /// Volatility ladder used to compare dispersion at a fixed drift.
    pub fn volatility_ladder(volatilities: &[f64]) -> Self {
        Self {
            volatilities: volatilities.to_vec(),
            ..Self::default()
        }
    }

    /// Grid from a config's `[sweep]` section.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, ConfigError> {
        let section = config.sweep.as_ref().ok_or(ConfigError::EmptyGrid("sweep"))?;
        let grid = Self::from(section);
        if grid.drifts.is_empty() && grid.volatilities.is_empty() && grid.seeds.is_empty() {
            return Err(ConfigError::EmptyGrid("sweep"));
        }
        Ok(grid)
    }

    /// Returns the total number of configurations in this grid.
    pub fn size(&self) -> usize {
        self.drifts.len().max(1) * self.volatilities.len().max(1) * self.seeds.len().max(1)
    }

    /// Generates all configurations in the grid, drift-major.
    ///
    /// When neither the base nor the grid fixes a seed, one master seed is
    /// drawn and shared by every configuration so grid points differ only in
    /// their parameters.
    pub fn generate_configs(&self, base_config: &SimulationConfig) -> Vec<SimulationConfig> {
        let base = &base_config.simulation;
        let drifts = axis(&self.drifts, base.drift);
        let volatilities = axis(&self.volatilities, base.volatility);
        let seeds: Vec<Option<u64>> = if !self.seeds.is_empty() {
            self.seeds.iter().copied().map(Some).collect()
        } else if base.seed.is_some() {
            vec![base.seed]
        } else {
            let shared = RngHierarchy::from_entropy().master_seed();
            debug!(seed = shared, "sweep base is unseeded, sharing one seed across the grid");
            vec![Some(shared)]
        };

        let mut configs = Vec::with_capacity(self.size());
        for &drift in &drifts {
            for &volatility in &volatilities {
                for &seed in &seeds {
                    let mut config = base_config.clone();
                    config.simulation.drift = drift;
                    config.simulation.volatility = volatility;
                    config.simulation.seed = seed;
                    configs.push(config);
                }
            }
        }
        configs
    }
}

impl From<&SweepSection> for ParamGrid {
    fn from(section: &SweepSection) -> Self {
        Self {
            drifts: section.drifts.clone(),
            volatilities: section.volatilities.clone(),
            seeds: section.seeds.clone(),
        }
    }
}

fn axis(values: &[f64], base: f64) -> Vec<f64> {
    if values.is_empty() {
        vec![base]
    } else {
        values.to_vec()
    }
}

/// Parameter sweep executor.
///
/// Runs simulations for all configurations in a grid, optionally in parallel.
#[derive(Debug, Clone)]
pub struct ParamSweep {
    parallel: bool,
}

impl Default for ParamSweep {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamSweep {
    pub fn new() -> Self {
        Self { parallel: true }
    }

    /// Enables or disables parallel execution.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Executes a parameter sweep over the given grid.
    ///
    /// Any invalid grid point (e.g. a negative volatility) fails the sweep.
    pub fn sweep(
        &self,
        grid: &ParamGrid,
        base_config: &SimulationConfig,
    ) -> Result<SweepResults, RunError> {
        self.sweep_with_progress(grid, base_config, |_, _, _| {})
    }

    /// Executes a sweep with progress reporting.
    ///
    /// The callback is invoked after each simulation completes with:
    /// - Grid index (0-based)
    /// - Total number of configs
    /// - The completed run
    pub fn sweep_with_progress<F>(
        &self,
        grid: &ParamGrid,
        base_config: &SimulationConfig,
        progress_callback: F,
    ) -> Result<SweepResults, RunError>
    where
        F: Fn(usize, usize, &SimulationRun) + Send + Sync,
    {
        let configs = grid.generate_configs(base_config);
        let total = configs.len();
        info!(total, parallel = self.parallel, "starting parameter sweep");

        let run_one = |(idx, config): (usize, &SimulationConfig)| -> Result<SimulationRun, RunError> {
            let run = run_simulation(config)?;
            progress_callback(idx, total, &run);
            Ok(run)
        };

        let runs: Vec<SimulationRun> = if self.parallel {
            configs
                .par_iter()
                .enumerate()
                .map(run_one)
                .collect::<Result<Vec<_>, RunError>>()?
        } else {
            configs
                .iter()
                .enumerate()
                .map(run_one)
                .collect::<Result<Vec<_>, RunError>>()?
        };

        Ok(SweepResults::new(runs))
    }
}

/// Results from a parameter sweep, in grid order.
#[derive(Debug)]
pub struct SweepResults {
    runs: Vec<SimulationRun>,
    by_run_id: HashMap<String, usize>,
}

impl SweepResults {
    fn new(runs: Vec<SimulationRun>) -> Self {
        let by_run_id = runs
            .iter()
            .enumerate()
            .map(|(i, r)| (r.run_id.clone(), i))
            .collect();

        Self { runs, by_run_id }
    }

    /// Returns all runs as a slice.
    pub fn all(&self) -> &[SimulationRun] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// First run with exactly this drift and volatility.
    pub fn get(&self, drift: f64, volatility: f64) -> Option<&SimulationRun> {
        self.runs
            .iter()
            .find(|r| r.params.drift() == drift && r.params.volatility() == volatility)
    }

    /// Gets a run by RunId.
    pub fn get_by_run_id(&self, run_id: &str) -> Option<&SimulationRun> {
        self.by_run_id.get(run_id).map(|&i| &self.runs[i])
    }

    /// Returns runs sorted by terminal standard deviation (ascending).
    pub fn sorted_by_std_dev(&self) -> Vec<&SimulationRun> {
        let mut sorted: Vec<_> = self.runs.iter().collect();
        sorted.sort_by(|a, b| a.summary.std_dev.total_cmp(&b.summary.std_dev));
        sorted
    }
}
