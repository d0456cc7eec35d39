//! Closed-form terminal moments for the simulator's discretization.
//!
//! The log increments sum to `ln(S_T / S_0) ~ N(drift * T, volatility^2 * T)`
//! with `T = horizon()` (1.0, or 0.0 with no steps), so the terminal value is
//! lognormal. These are the reference values Monte Carlo estimates converge to.

use crate::params::SimulationParameters;

/// `E[S_T] = S_0 * exp(drift * T + volatility^2 * T / 2)`.
pub fn expected_terminal_mean(params: &SimulationParameters) -> f64 {
    let t = params.horizon();
    let sigma = params.volatility();
    params.initial_value() * (params.drift() * t + 0.5 * sigma * sigma * t).exp()
}

/// `median(S_T) = S_0 * exp(drift * T)`.
pub fn expected_terminal_median(params: &SimulationParameters) -> f64 {
    params.initial_value() * (params.drift() * params.horizon()).exp()
}

/// `sd(S_T) = E[S_T] * sqrt(exp(volatility^2 * T) - 1)`.
pub fn expected_terminal_std_dev(params: &SimulationParameters) -> f64 {
    let variance_factor = (params.volatility().powi(2) * params.horizon()).exp_m1();
    expected_terminal_mean(params) * variance_factor.sqrt()
}

/// Standard error of a sample mean.
pub fn standard_error(std_dev: f64, n: usize) -> f64 {
    if n == 0 {
        return f64::INFINITY;
    }
    std_dev / (n as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn zero_volatility_collapses_to_drift_growth() {
        let p = SimulationParameters::new(100.0, 1, 252, 0.05, 0.0).unwrap();
        assert_relative_eq!(expected_terminal_mean(&p), 100.0 * 0.05_f64.exp());
        assert_relative_eq!(expected_terminal_median(&p), 100.0 * 0.05_f64.exp());
        assert_eq!(expected_terminal_std_dev(&p), 0.0);
    }

    #[test]
    fn volatility_lifts_mean_above_median() {
        let p = SimulationParameters::new(100.0, 1, 252, 0.07, 0.2).unwrap();
        assert!(expected_terminal_mean(&p) > expected_terminal_median(&p));
        assert_relative_eq!(
            expected_terminal_mean(&p),
            100.0 * (0.07_f64 + 0.02).exp(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn zero_steps_has_no_dispersion() {
        let p = SimulationParameters::new(100.0, 1, 0, 0.07, 0.2).unwrap();
        assert_eq!(expected_terminal_mean(&p), 100.0);
        assert_eq!(expected_terminal_std_dev(&p), 0.0);
    }

    #[test]
    fn standard_error_shrinks_with_n() {
        assert_eq!(standard_error(2.0, 4), 1.0);
        assert!(standard_error(2.0, 0).is_infinite());
    }
}
