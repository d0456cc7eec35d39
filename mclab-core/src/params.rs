//! Validated simulation parameters.
//!
//! `SimulationParameters` is the only way into the simulator. Construction
//! validates every field, so downstream code never sees a zero path count,
//! a non-positive initial value or a negative volatility.

use serde::Serialize;

use crate::error::SimError;

/// Immutable GBM model parameters.
///
/// `drift` and `volatility` are annualized and applied over a unit horizon
/// split into `num_steps` steps (`dt = 1 / num_steps`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationParameters {
    initial_value: f64,
    num_paths: usize,
    num_steps: usize,
    drift: f64,
    volatility: f64,
    seed: Option<u64>,
}

impl SimulationParameters {
    /// Validate and build a parameter set with no fixed seed.
    ///
    /// `num_steps == 0` is accepted and produces a single-column ensemble.
    pub fn new(
        initial_value: f64,
        num_paths: usize,
        num_steps: usize,
        drift: f64,
        volatility: f64,
    ) -> Result<Self, SimError> {
        if !initial_value.is_finite() {
            return Err(SimError::invalid(
                "initial_value",
                initial_value,
                "must be finite",
            ));
        }
        if initial_value <= 0.0 {
            return Err(SimError::invalid(
                "initial_value",
                initial_value,
                "must be > 0",
            ));
        }
        if num_paths == 0 {
            return Err(SimError::invalid("num_paths", 0.0, "must be > 0"));
        }
        if !drift.is_finite() {
            return Err(SimError::invalid("drift", drift, "must be finite"));
        }
        if !volatility.is_finite() {
            return Err(SimError::invalid("volatility", volatility, "must be finite"));
        }
        if volatility < 0.0 {
            return Err(SimError::invalid("volatility", volatility, "must be >= 0"));
        }

        Ok(Self {
            initial_value,
            num_paths,
            num_steps,
            drift,
            volatility,
            seed: None,
        })
    }

    /// Return a copy pinned to `seed`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn initial_value(&self) -> f64 {
        self.initial_value
    }

    pub fn num_paths(&self) -> usize {
        self.num_paths
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    pub fn drift(&self) -> f64 {
        self.drift
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Step fraction `1 / num_steps`, or `None` for a zero-step run.
    pub fn dt(&self) -> Option<f64> {
        if self.num_steps == 0 {
            None
        } else {
            Some(1.0 / self.num_steps as f64)
        }
    }

    /// Simulated horizon in units of the annualized rates (1.0, or 0.0 with no steps).
    pub fn horizon(&self) -> f64 {
        if self.num_steps == 0 {
            0.0
        } else {
            1.0
        }
    }

    /// Number of columns in the ensemble this parameter set produces.
    pub fn num_columns(&self) -> usize {
        self.num_steps + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reference_parameters() {
        let p = SimulationParameters::new(100_000.0, 1000, 252, 0.07, 0.2).unwrap();
        assert_eq!(p.num_paths(), 1000);
        assert_eq!(p.num_steps(), 252);
        assert_eq!(p.num_columns(), 253);
        assert_eq!(p.seed(), None);
        assert!((p.dt().unwrap() - 1.0 / 252.0).abs() < 1e-15);
    }

    #[test]
    fn zero_steps_is_valid_without_dt() {
        let p = SimulationParameters::new(100.0, 10, 0, 0.05, 0.2).unwrap();
        assert_eq!(p.dt(), None);
        assert_eq!(p.horizon(), 0.0);
        assert_eq!(p.num_columns(), 1);
    }

    #[test]
    fn zero_volatility_is_valid() {
        assert!(SimulationParameters::new(100.0, 10, 10, 0.05, 0.0).is_ok());
    }

    #[test]
    fn negative_drift_is_valid() {
        assert!(SimulationParameters::new(100.0, 10, 10, -0.3, 0.2).is_ok());
    }

    #[test]
    fn rejects_zero_paths() {
        let err = SimulationParameters::new(100.0, 0, 10, 0.05, 0.2).unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidParameter {
                field: "num_paths",
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_positive_initial_value() {
        for bad in [0.0, -1.0] {
            let err = SimulationParameters::new(bad, 10, 10, 0.05, 0.2).unwrap_err();
            assert!(matches!(
                err,
                SimError::InvalidParameter {
                    field: "initial_value",
                    ..
                }
            ));
        }
    }

    #[test]
    fn rejects_negative_volatility() {
        let err = SimulationParameters::new(100.0, 10, 10, 0.05, -0.1).unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidParameter {
                field: "volatility",
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_finite_inputs() {
        assert!(SimulationParameters::new(f64::NAN, 10, 10, 0.05, 0.2).is_err());
        assert!(SimulationParameters::new(f64::INFINITY, 10, 10, 0.05, 0.2).is_err());
        assert!(SimulationParameters::new(100.0, 10, 10, f64::NAN, 0.2).is_err());
        assert!(SimulationParameters::new(100.0, 10, 10, 0.05, f64::INFINITY).is_err());
    }

    #[test]
    fn with_seed_pins_seed() {
        let p = SimulationParameters::new(100.0, 10, 10, 0.05, 0.2)
            .unwrap()
            .with_seed(7);
        assert_eq!(p.seed(), Some(7));
    }

    #[test]
    fn error_message_names_field() {
        let err = SimulationParameters::new(100.0, 10, 10, 0.05, -0.5).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("volatility"), "{msg}");
        assert!(msg.contains(">= 0"), "{msg}");
    }
}
