//! mclab Core: GBM path simulation, ensembles, summary statistics.
//!
//! This crate contains the numerical engine:
//! - Validated simulation parameters
//! - Geometric Brownian motion path generation (sequential and rayon-parallel)
//! - Dense row-major path ensembles
//! - Terminal-value summary statistics
//! - Deterministic seed hierarchy for independent per-path streams
//! - Closed-form reference moments

pub mod analytics;
pub mod ensemble;
pub mod error;
pub mod params;
pub mod rng;
pub mod simulator;
pub mod summary;

pub use ensemble::PathEnsemble;
pub use error::SimError;
pub use params::SimulationParameters;
pub use rng::RngHierarchy;
pub use simulator::PathSimulator;
pub use summary::{summarize, SummaryStatistics, SUMMARY_KEYS};
