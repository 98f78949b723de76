//! Observer hooks of the propagation loop.
//!
//! The loop owns the beam and history; observers only see read-only
//! snapshots. Persisting results, progress output and plotting data all live
//! behind [`PropagationObserver`], so the core never touches the filesystem.

use thiserror::Error;

use super::history::{StateHistory, StateRow};
use super::timing::Timings;
use crate::beam::Beam;
use crate::types::{RunParameters, StateColumn};

/// Errors raised by an observer; any of them aborts the run.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("{0}")]
    Other(String),
}

/// Receiver of run events. Every hook defaults to a no-op.
pub trait PropagationObserver {
    /// Called once before step 0.
    fn on_start(&mut self, _params: &RunParameters) -> Result<(), HookError> {
        Ok(())
    }

    /// Called at the state-print cadence, after row `n_step` is recorded.
    fn on_print_state(&mut self, _n_step: usize, _history: &StateHistory) -> Result<(), HookError> {
        Ok(())
    }

    /// Called at the beam-snapshot cadence.
    fn on_beam(&mut self, _n_step: usize, _z: f64, _beam: &Beam) -> Result<(), HookError> {
        Ok(())
    }

    /// Called once with the trimmed history.
    fn on_track(&mut self, _history: &StateHistory) -> Result<(), HookError> {
        Ok(())
    }

    /// Called once with the trimmed history and the tracked column, if track
    /// plotting is enabled.
    fn on_track_plot(
        &mut self,
        _history: &StateHistory,
        _column: StateColumn,
    ) -> Result<(), HookError> {
        Ok(())
    }

    /// Called last with the accumulated timings.
    fn on_timings(&mut self, _timings: &Timings) -> Result<(), HookError> {
        Ok(())
    }
}

/// Observer that reports progress through the `log` facade.
#[derive(Debug, Default)]
pub struct LogObserver;

impl PropagationObserver for LogObserver {
    fn on_start(&mut self, params: &RunParameters) -> Result<(), HookError> {
        log::info!(
            "Propagating {} ({}): n_z = {}, dz_0 = {:.3e} m, z_diff = {:.3e} m, P_0 / P_cr = {}",
            params.beam.info,
            params.medium.name,
            params.n_z,
            params.dz_0,
            params.beam.z_diff,
            params.beam.p_0_to_p_cr
        );
        Ok(())
    }

    fn on_print_state(&mut self, n_step: usize, history: &StateHistory) -> Result<(), HookError> {
        if let Some(row) = history.row(n_step) {
            log::info!("{}", format_state(n_step, &row));
        }
        Ok(())
    }

    fn on_timings(&mut self, timings: &Timings) -> Result<(), HookError> {
        log::info!("Timings:\n{}", timings.report());
        Ok(())
    }
}

/// One-line rendering of a history row.
pub fn format_state(n_step: usize, row: &StateRow) -> String {
    let labels = StateHistory::labels();
    format!(
        "n_step: {:>6} | {}: {:.4e} | {}: {:.4e} | {}: {:.4e} | {}: {:.4e}",
        n_step, labels[0], row.z, labels[1], row.dz, labels[2], row.i_max_to_i_0, labels[3], row.i_max
    )
}
