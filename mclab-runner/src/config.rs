//! Serializable simulation configuration.
//!
//! A run is described by a TOML file:
//!
//! ```toml
//! [simulation]
//! initial_value = 100000.0
//! num_paths = 1000
//! num_steps = 252
//! drift = 0.07
//! volatility = 0.2
//! seed = 42
//!
//! [metrics]
//! risk_free_rate = 0.01
//!
//! [sweep]
//! drifts = [0.05, 0.07]
//! volatilities = [0.1, 0.2, 0.3]
//!
//! [output]
//! directory = "results"
//! write_paths = false
//! ```
//!
//! Only `[simulation]` is required.

use std::path::{Path, PathBuf};

use mclab_core::{SimError, SimulationParameters};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metrics::DEFAULT_RISK_FREE_RATE;

/// Unique identifier for a simulation run (content-addressable hash).
pub type RunId = String;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid simulation parameters: {0}")]
    Invalid(#[from] SimError),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("no sweep values configured in [{0}]")]
    EmptyGrid(&'static str),
}

/// Complete configuration for a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    pub simulation: SimulationSection,

    #[serde(default)]
    pub metrics: MetricsSection,

    #[serde(default)]
    pub sweep: Option<SweepSection>,

    #[serde(default)]
    pub output: OutputSection,
}

/// GBM model inputs, unvalidated until `to_parameters`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationSection {
    pub initial_value: f64,
    pub num_paths: usize,
    pub num_steps: usize,
    pub drift: f64,
    pub volatility: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Generate paths across the rayon pool.
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_parallel() -> bool {
    true
}

/// Settings for per-path performance metrics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsSection {
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
}

fn default_risk_free_rate() -> f64 {
    DEFAULT_RISK_FREE_RATE
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
        }
    }
}

/// Values to sweep; an empty list keeps the base value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SweepSection {
    #[serde(default)]
    pub drifts: Vec<f64>,
    #[serde(default)]
    pub volatilities: Vec<f64>,
    #[serde(default)]
    pub seeds: Vec<u64>,
}

/// Where and what to export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputSection {
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
    /// Also write the full path matrix as CSV.
    #[serde(default)]
    pub write_paths: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("results")
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            write_paths: false,
        }
    }
}

/// The parts of a config that determine simulated results.
#[derive(Serialize)]
struct RunIdentity {
    initial_value: f64,
    num_paths: usize,
    num_steps: usize,
    drift: f64,
    volatility: f64,
    seed: Option<u64>,
    risk_free_rate: f64,
}

impl SimulationConfig {
    /// Build a config around a simulation section with default metrics and output.
    pub fn new(simulation: SimulationSection) -> Self {
        Self {
            simulation,
            metrics: MetricsSection::default(),
            sweep: None,
            output: OutputSection::default(),
        }
    }

    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Validate the simulation section into core parameters.
    pub fn to_parameters(&self) -> Result<SimulationParameters, ConfigError> {
        let s = &self.simulation;
        let params =
            SimulationParameters::new(s.initial_value, s.num_paths, s.num_steps, s.drift, s.volatility)?;
        Ok(match s.seed {
            Some(seed) => params.with_seed(seed),
            None => params,
        })
    }

    /// Computes a deterministic hash ID for this configuration.
    ///
    /// Two configs with identical model inputs and risk-free rate share a
    /// RunId. Execution mode and output settings do not participate. An
    /// unseeded config hashes with `seed: null`; the id of an executed run
    /// comes from [`run_id_for`] once its seed is pinned.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        let s = &self.simulation;
        RunIdentity {
            initial_value: s.initial_value,
            num_paths: s.num_paths,
            num_steps: s.num_steps,
            drift: s.drift,
            volatility: s.volatility,
            seed: s.seed,
            risk_free_rate: self.metrics.risk_free_rate,
        }
        .hash()
    }
}

impl RunIdentity {
    fn hash(&self) -> Result<RunId, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

/// RunId of validated parameters, equal to [`SimulationConfig::run_id`] of
/// the config they were built from.
pub fn run_id_for(params: &SimulationParameters, risk_free_rate: f64) -> Result<RunId, ConfigError> {
    RunIdentity {
        initial_value: params.initial_value(),
        num_paths: params.num_paths(),
        num_steps: params.num_steps(),
        drift: params.drift(),
        volatility: params.volatility(),
        seed: params.seed(),
        risk_free_rate,
    }
    .hash()
}
