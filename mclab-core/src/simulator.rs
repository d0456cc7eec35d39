//! Geometric Brownian motion path simulator.
//!
//! Each path evolves in log space:
//!
//! ```text
//! x(t) = x(t-1) + drift * dt + volatility * sqrt(dt) * z,   z ~ N(0, 1)
//! S(t) = S(0) * exp(x(t))
//! ```
//!
//! with `dt = 1 / num_steps`, i.e. `num_steps` always spans one unit of the
//! annualized drift and volatility.
//!
//! # Randomness
//!
//! `generate_paths` and `generate_paths_par` give path `p` its own ChaCha8
//! stream derived from the master seed (see [`RngHierarchy`]), so both return
//! bit-identical ensembles for the same seed regardless of thread count.
//! `generate_paths_with_rng` instead draws every shock from one caller-owned
//! stream, path by path and step by step.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use rayon::prelude::*;
use tracing::debug;

use crate::ensemble::PathEnsemble;
use crate::error::SimError;
use crate::params::SimulationParameters;
use crate::rng::RngHierarchy;
use crate::summary::{summarize, SummaryStatistics};

/// Per-step constants shared by every path.
#[derive(Debug, Clone, Copy)]
struct StepModel {
    initial_value: f64,
    drift_dt: f64,
    diffusion: f64,
}

impl StepModel {
    fn from_params(params: &SimulationParameters) -> Self {
        // Zero steps never reaches the increment loop, so dt is irrelevant there.
        let dt = params.dt().unwrap_or(0.0);
        Self {
            initial_value: params.initial_value(),
            drift_dt: params.drift() * dt,
            diffusion: params.volatility() * dt.sqrt(),
        }
    }

    /// Fill one row: column 0 is the initial value, then cumulative log increments.
    fn fill_path<R: Rng + ?Sized>(&self, row: &mut [f64], rng: &mut R) {
        row[0] = self.initial_value;
        let mut log_level = 0.0;
        for value in row.iter_mut().skip(1) {
            let z: f64 = StandardNormal.sample(rng);
            log_level += self.drift_dt + self.diffusion * z;
            *value = self.initial_value * log_level.exp();
        }
    }
}

/// Stateless GBM simulator bound to one parameter set.
#[derive(Debug, Clone)]
pub struct PathSimulator {
    params: SimulationParameters,
}

impl PathSimulator {
    pub fn new(params: SimulationParameters) -> Self {
        Self { params }
    }

    /// Validate raw inputs and build a simulator in one step.
    pub fn from_raw(
        initial_value: f64,
        num_paths: usize,
        num_steps: usize,
        drift: f64,
        volatility: f64,
    ) -> Result<Self, SimError> {
        SimulationParameters::new(initial_value, num_paths, num_steps, drift, volatility)
            .map(Self::new)
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    /// Seed hierarchy for one call: the pinned seed, or fresh entropy.
    fn hierarchy(&self) -> RngHierarchy {
        match self.params.seed() {
            Some(seed) => RngHierarchy::new(seed),
            None => {
                let hierarchy = RngHierarchy::from_entropy();
                debug!(
                    master_seed = hierarchy.master_seed(),
                    "no seed pinned, drew master seed from entropy"
                );
                hierarchy
            }
        }
    }

    fn allocate(&self) -> Vec<f64> {
        vec![0.0; self.params.num_paths() * self.params.num_columns()]
    }

    fn wrap(&self, values: Vec<f64>) -> PathEnsemble {
        PathEnsemble::from_parts(self.params.num_paths(), self.params.num_columns(), values)
    }

    /// Simulate `num_paths` paths of `num_steps + 1` values each.
    pub fn generate_paths(&self) -> PathEnsemble {
        let hierarchy = self.hierarchy();
        let model = StepModel::from_params(&self.params);
        let columns = self.params.num_columns();
        debug!(
            num_paths = self.params.num_paths(),
            num_steps = self.params.num_steps(),
            master_seed = hierarchy.master_seed(),
            "generating paths"
        );

        let mut values = self.allocate();
        for (p, row) in values.chunks_mut(columns).enumerate() {
            let mut rng = hierarchy.rng_for_path(p);
            model.fill_path(row, &mut rng);
        }
        self.wrap(values)
    }

    /// Same output as [`generate_paths`](Self::generate_paths), computed across paths with rayon.
    pub fn generate_paths_par(&self) -> PathEnsemble {
        let hierarchy = self.hierarchy();
        let model = StepModel::from_params(&self.params);
        let columns = self.params.num_columns();
        debug!(
            num_paths = self.params.num_paths(),
            num_steps = self.params.num_steps(),
            master_seed = hierarchy.master_seed(),
            "generating paths in parallel"
        );

        let mut values = self.allocate();
        values
            .par_chunks_mut(columns)
            .enumerate()
            .for_each(|(p, row)| {
                let mut rng = hierarchy.rng_for_path(p);
                model.fill_path(row, &mut rng);
            });
        self.wrap(values)
    }

    /// Simulate with every shock drawn from `rng`, row-major.
    ///
    /// Ignores the pinned seed.
    pub fn generate_paths_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> PathEnsemble {
        let model = StepModel::from_params(&self.params);
        let columns = self.params.num_columns();

        let mut values = self.allocate();
        for row in values.chunks_mut(columns) {
            model.fill_path(row, rng);
        }
        self.wrap(values)
    }

    /// Reduce an ensemble's terminal column.
    pub fn summarize(&self, ensemble: &PathEnsemble) -> SummaryStatistics {
        summarize(ensemble)
    }

    /// Generate paths and summarize them.
    pub fn run(&self) -> (PathEnsemble, SummaryStatistics) {
        let ensemble = self.generate_paths();
        let summary = summarize(&ensemble);
        (ensemble, summary)
    }
}
