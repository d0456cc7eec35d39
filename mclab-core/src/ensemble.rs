//! Dense path matrix produced by the simulator.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Simulated paths stored row-major: row `p` holds path `p` at steps `0..=num_steps`.
///
/// An ensemble always has at least one path and one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EnsembleRepr")]
pub struct PathEnsemble {
    num_paths: usize,
    num_columns: usize,
    values: Vec<f64>,
}

/// Unchecked wire form; deserialization goes through `from_raw`.
#[derive(Deserialize)]
struct EnsembleRepr {
    num_paths: usize,
    num_columns: usize,
    values: Vec<f64>,
}

impl TryFrom<EnsembleRepr> for PathEnsemble {
    type Error = SimError;

    fn try_from(repr: EnsembleRepr) -> Result<Self, Self::Error> {
        Self::from_raw(repr.num_paths, repr.num_columns, repr.values)
    }
}

impl PathEnsemble {
    /// Wrap a row-major buffer of `num_paths * num_columns` values.
    pub fn from_raw(num_paths: usize, num_columns: usize, values: Vec<f64>) -> Result<Self, SimError> {
        let expected = num_paths
            .checked_mul(num_columns)
            .ok_or(SimError::ShapeOverflow {
                num_paths,
                num_columns,
            })?;
        if num_paths == 0 || num_columns == 0 || values.len() != expected {
            return Err(SimError::ShapeMismatch {
                num_paths,
                num_columns,
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            num_paths,
            num_columns,
            values,
        })
    }

    /// Shape already guaranteed by validated parameters.
    pub(crate) fn from_parts(num_paths: usize, num_columns: usize, values: Vec<f64>) -> Self {
        debug_assert!(num_paths > 0 && num_columns > 0);
        debug_assert_eq!(values.len(), num_paths * num_columns);
        Self {
            num_paths,
            num_columns,
            values,
        }
    }

    /// Build from one `Vec` per path. Every row must have the same length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, SimError> {
        let num_paths = rows.len();
        let num_columns = rows.first().map_or(0, Vec::len);
        let actual: usize = rows.iter().map(Vec::len).sum();
        if rows.iter().any(|r| r.len() != num_columns) {
            return Err(SimError::ShapeMismatch {
                num_paths,
                num_columns,
                expected: num_paths * num_columns,
                actual,
            });
        }
        Self::from_raw(num_paths, num_columns, rows.into_iter().flatten().collect())
    }

    /// `(num_paths, num_steps + 1)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.num_paths, self.num_columns)
    }

    pub fn num_paths(&self) -> usize {
        self.num_paths
    }

    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    pub fn num_steps(&self) -> usize {
        self.num_columns - 1
    }

    /// Value of path `path` at step `step`.
    pub fn get(&self, path: usize, step: usize) -> Option<f64> {
        if path >= self.num_paths || step >= self.num_columns {
            return None;
        }
        Some(self.values[path * self.num_columns + step])
    }

    /// One full path.
    pub fn path(&self, path: usize) -> Option<&[f64]> {
        if path >= self.num_paths {
            return None;
        }
        let start = path * self.num_columns;
        Some(&self.values[start..start + self.num_columns])
    }

    /// Iterate over paths in index order.
    pub fn paths(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.num_columns)
    }

    /// Cross-section of all paths at `step`.
    pub fn column(&self, step: usize) -> Option<Vec<f64>> {
        if step >= self.num_columns {
            return None;
        }
        Some(self.paths().map(|p| p[step]).collect())
    }

    /// Values at the final step, one per path.
    pub fn terminal_values(&self) -> Vec<f64> {
        let last = self.num_columns - 1;
        self.paths().map(|p| p[last]).collect()
    }

    /// Row-major backing buffer.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }
}
