//! Error types for parameter validation and ensemble construction.

use thiserror::Error;

/// Errors raised by the simulation core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("invalid parameter `{field}` = {value}: {reason}")]
    InvalidParameter {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
    #[error("ensemble shape mismatch: {num_paths} paths x {num_columns} columns needs {expected} values, got {actual}")]
    ShapeMismatch {
        num_paths: usize,
        num_columns: usize,
        expected: usize,
        actual: usize,
    },
    #[error("ensemble shape {num_paths} paths x {num_columns} columns overflows usize")]
    ShapeOverflow {
        num_paths: usize,
        num_columns: usize,
    },
}

impl SimError {
    pub(crate) fn invalid(field: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            field,
            value,
            reason,
        }
    }
}
