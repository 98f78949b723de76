//! State history of a propagation run.

use ndarray::{s, Array2, ArrayView1, ArrayViewMut2};
use serde::Serialize;

use crate::types::StateColumn;

/// One recorded row of the history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StateRow {
    pub z: f64,
    pub dz: f64,
    pub i_max_to_i_0: f64,
    pub i_max: f64,
}

/// Fixed-capacity table of `(z, dz, i_max / i_0, i_max)` rows.
///
/// Row `n` holds the state after step `n`; row 0 is the initial state.
#[derive(Debug, Clone)]
pub struct StateHistory {
    states: Array2<f64>,
}

impl StateHistory {
    pub const N_COLUMNS: usize = 4;

    /// Zero-filled history with room for `n_z + 1` rows.
    pub fn with_steps(n_z: usize) -> Self {
        Self {
            states: Array2::zeros((n_z + 1, Self::N_COLUMNS)),
        }
    }

    /// Wrap an existing `(n_rows, 4)` table.
    pub fn from_array(states: Array2<f64>) -> Result<Self, ndarray::ShapeError> {
        if states.ncols() != Self::N_COLUMNS || states.nrows() == 0 {
            return Err(ndarray::ShapeError::from_kind(ndarray::ErrorKind::IncompatibleShape));
        }
        Ok(Self { states })
    }

    pub fn n_rows(&self) -> usize {
        self.states.nrows()
    }

    pub fn states_mut(&mut self) -> ArrayViewMut2<'_, f64> {
        self.states.view_mut()
    }

    pub fn column(&self, column: StateColumn) -> ArrayView1<'_, f64> {
        self.states.column(column.index())
    }

    pub fn row(&self, n_step: usize) -> Option<StateRow> {
        if n_step >= self.n_rows() {
            return None;
        }
        let r = self.states.row(n_step);
        Some(StateRow {
            z: r[0],
            dz: r[1],
            i_max_to_i_0: r[2],
            i_max: r[3],
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = StateRow> + '_ {
        (0..self.n_rows()).filter_map(move |i| self.row(i))
    }

    pub fn labels() -> [&'static str; 4] {
        StateColumn::ALL.map(StateColumn::label)
    }

    /// Drop trailing all-zero rows. Row 0 is always kept.
    pub fn trim(&mut self) {
        let used = self
            .states
            .outer_iter()
            .rposition(|row| row.iter().any(|&v| v != 0.0))
            .map_or(1, |last| last + 1)
            .min(self.n_rows());
        if used < self.n_rows() {
            self.states = self.states.slice(s![..used, ..]).to_owned();
        }
    }
}

/// Write the state after step `n_step` into row `n_step`.
///
/// `i_max` is in units of `i_0`; the last column holds the physical peak
/// intensity `i_max · i_0`.
pub fn flush_current_state(
    mut states: ArrayViewMut2<'_, f64>,
    n_step: usize,
    z: f64,
    dz: f64,
    i_max: f64,
    i_0: f64,
) {
    let mut row = states.row_mut(n_step);
    row[0] = z;
    row[1] = dz;
    row[2] = i_max;
    row[3] = i_max * i_0;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(n_z: usize, n_filled: usize) -> StateHistory {
        let mut history = StateHistory::with_steps(n_z);
        for n in 0..n_filled {
            flush_current_state(history.states_mut(), n, n as f64, 0.5, 1.0 + n as f64, 2.0);
        }
        history
    }

    #[test]
    fn test_flush_writes_one_row() {
        let history = filled(3, 2);
        assert_eq!(
            history.row(1),
            Some(StateRow {
                z: 1.0,
                dz: 0.5,
                i_max_to_i_0: 2.0,
                i_max: 4.0
            })
        );
        assert_eq!(history.row(2).map(|r| r.z), Some(0.0));
        assert!(history.row(4).is_none());
    }

    #[test]
    fn test_trim_drops_trailing_zero_rows() {
        let n_z = 10;
        for k in 0..=n_z {
            let mut history = filled(n_z, n_z + 1 - k);
            history.trim();
            assert_eq!(history.n_rows(), n_z + 1 - k);
        }
    }

    #[test]
    fn test_trim_synthetic_table() {
        let n_z = 6;
        for k in 0..=n_z {
            let states = Array2::from_shape_fn((n_z + 1, StateHistory::N_COLUMNS), |(i, j)| {
                if i + k <= n_z {
                    (i + j + 1) as f64
                } else {
                    0.0
                }
            });
            let mut history = StateHistory::from_array(states).unwrap();
            history.trim();
            assert_eq!(history.n_rows(), (n_z + 1 - k).max(1));
        }
        assert!(StateHistory::from_array(Array2::zeros((3, 2))).is_err());
        assert!(StateHistory::from_array(Array2::zeros((0, 4))).is_err());
    }

    #[test]
    fn test_trim_keeps_initial_row() {
        let mut history = StateHistory::with_steps(5);
        history.trim();
        assert_eq!(history.n_rows(), 1);
    }

    #[test]
    fn test_trim_keeps_interior_zero_rows() {
        let mut history = filled(4, 4);
        history.states_mut().row_mut(1).fill(0.0);
        history.trim();
        assert_eq!(history.n_rows(), 4);
    }

    #[test]
    fn test_column_view() {
        let history = filled(2, 3);
        assert_eq!(history.column(StateColumn::Z).to_vec(), vec![0.0, 1.0, 2.0]);
        assert_eq!(history.column(StateColumn::Intensity).to_vec(), vec![2.0, 4.0, 6.0]);
        assert_eq!(StateHistory::labels()[1], "dz, m");
    }
}
