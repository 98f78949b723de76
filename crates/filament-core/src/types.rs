//! Core types shared across the Filament framework.
//!
//! This module defines the run configuration of the propagation loop, the
//! columns of its state history and the snapshot of run parameters handed to
//! observers.

use filament_media::Medium;
use serde::{Deserialize, Serialize};

use crate::beam::BeamSummary;

/// Peak intensity (W/m²) above which the run is considered collapsed and stops.
pub const DEFAULT_MAX_INTENSITY_TO_STOP: f64 = 1e17;

/// Largest nonlinear phase (rad) a single adaptive step may accumulate.
pub const DEFAULT_NONLIN_PHASE_MAX: f64 = 0.05;

/// Parameters of a propagation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagationParams {
    /// Number of steps; the history holds `n_z + 1` rows.
    pub n_z: usize,
    /// Initial step length (m).
    pub dz_0: f64,
    /// Keep `dz` fixed at `dz_0` instead of adapting it.
    pub const_dz: bool,
    /// Report the current state every this many steps (0 disables).
    pub print_current_state_every: usize,
    /// Hand a beam snapshot to the observer every this many steps (0 disables).
    pub plot_beam_every: usize,
    /// Hand the tracked column to the observer at teardown.
    pub plot_track: bool,
    /// History column tracked at teardown.
    pub track_parameter: StateColumn,
    /// Peak intensity (W/m²) that stops the run.
    pub max_intensity_to_stop: f64,
    /// Nonlinear phase bound of the adaptive step (rad).
    pub nonlin_phase_max: f64,
}

impl Default for PropagationParams {
    fn default() -> Self {
        Self {
            n_z: 1000,
            dz_0: 1e-5,
            const_dz: false,
            print_current_state_every: 10,
            plot_beam_every: 0,
            plot_track: true,
            track_parameter: StateColumn::IntensityRatio,
            max_intensity_to_stop: DEFAULT_MAX_INTENSITY_TO_STOP,
            nonlin_phase_max: DEFAULT_NONLIN_PHASE_MAX,
        }
    }
}

/// Column of the state history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateColumn {
    Z,
    Dz,
    IntensityRatio,
    Intensity,
}

impl StateColumn {
    pub const ALL: [StateColumn; 4] = [
        StateColumn::Z,
        StateColumn::Dz,
        StateColumn::IntensityRatio,
        StateColumn::Intensity,
    ];

    pub fn index(self) -> usize {
        match self {
            StateColumn::Z => 0,
            StateColumn::Dz => 1,
            StateColumn::IntensityRatio => 2,
            StateColumn::Intensity => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StateColumn::Z => "z, m",
            StateColumn::Dz => "dz, m",
            StateColumn::IntensityRatio => "i_max / i_0",
            StateColumn::Intensity => "i_max, W / m^2",
        }
    }

    /// Short identifier, usable as a file stem.
    pub fn key(self) -> &'static str {
        match self {
            StateColumn::Z => "z",
            StateColumn::Dz => "dz",
            StateColumn::IntensityRatio => "intensity_ratio",
            StateColumn::Intensity => "intensity",
        }
    }
}

/// Snapshot of a run's configuration, handed to observers on start.
#[derive(Debug, Clone, Serialize)]
pub struct RunParameters {
    pub beam: BeamSummary,
    pub medium: Medium,
    pub diffraction: Option<&'static str>,
    pub kerr: Option<&'static str>,
    pub n_z: usize,
    pub dz_0: f64,
    pub const_dz: bool,
    pub max_intensity_to_stop: f64,
    pub nonlin_phase_max: f64,
}
