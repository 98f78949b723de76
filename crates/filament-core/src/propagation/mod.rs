//! Split-step propagation loop.
//!
//! A [`Propagator`] owns the beam and advances it along `z`. Each step is a
//! diffraction sub-step, a Kerr sub-step, an intensity update and (unless the
//! step is held constant) an adaptive reduction of `dz` that bounds the
//! nonlinear phase per step. Every step is recorded in a [`StateHistory`];
//! the run stops after `n_z` steps or once the peak intensity exceeds
//! `max_intensity_to_stop`.
//!
//! A propagator runs once: row 0 of the history is the initial state, so a
//! second call to [`Propagator::propagate`] is rejected.

mod history;
mod observer;
mod timing;

pub use history::{flush_current_state, StateHistory, StateRow};
pub use observer::{format_state, HookError, LogObserver, PropagationObserver};
pub use timing::{TimingEntry, Timings};

use thiserror::Error;

use crate::beam::Beam;
use crate::diffraction::{DiffractionError, DiffractionExecutor};
use crate::kerr::KerrExecutor;
use crate::types::{PropagationParams, RunParameters};

/// Errors that abort a propagation run.
#[derive(Debug, Error)]
pub enum PropagationError {
    #[error("Invalid propagation parameter: {0}")]
    InvalidParameter(String),

    #[error("Diffraction step failed: {0}")]
    Diffraction(#[from] DiffractionError),

    #[error("Observer failed: {0}")]
    Hook(#[from] HookError),

    #[error("Propagation already ran (z = {z:.4e} m); build a new propagator")]
    AlreadyPropagated { z: f64 },
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagationOutcome {
    /// Index of the last recorded step.
    pub steps_taken: usize,
    /// Whether the intensity threshold ended the run before `n_z`.
    pub stopped_early: bool,
    pub final_z: f64,
    pub final_dz: f64,
}

/// Split-step driver for one beam.
pub struct Propagator {
    beam: Beam,
    diffraction: Option<DiffractionExecutor>,
    kerr: Option<KerrExecutor>,
    params: PropagationParams,
    z: f64,
    dz: f64,
    history: StateHistory,
    timings: Timings,
    started: bool,
}

impl Propagator {
    pub fn new(beam: Beam, params: PropagationParams) -> Result<Self, PropagationError> {
        if params.n_z == 0 {
            return Err(PropagationError::InvalidParameter("n_z must be positive".into()));
        }
        if !(params.dz_0.is_finite() && params.dz_0 > 0.0) {
            return Err(PropagationError::InvalidParameter(format!(
                "dz_0 must be positive and finite, got {}",
                params.dz_0
            )));
        }
        if !(params.nonlin_phase_max.is_finite() && params.nonlin_phase_max > 0.0) {
            return Err(PropagationError::InvalidParameter(format!(
                "nonlin_phase_max must be positive and finite, got {}",
                params.nonlin_phase_max
            )));
        }
        if params.max_intensity_to_stop.is_nan() {
            return Err(PropagationError::InvalidParameter(
                "max_intensity_to_stop must not be NaN".into(),
            ));
        }

        Ok(Self {
            beam,
            diffraction: None,
            kerr: None,
            z: 0.0,
            dz: params.dz_0,
            history: StateHistory::with_steps(params.n_z),
            timings: Timings::new(),
            started: false,
            params,
        })
    }

    pub fn with_diffraction(mut self, diffraction: DiffractionExecutor) -> Self {
        self.diffraction = Some(diffraction);
        self
    }

    pub fn with_kerr(mut self, kerr: KerrExecutor) -> Self {
        self.kerr = Some(kerr);
        self
    }

    pub fn beam(&self) -> &Beam {
        &self.beam
    }

    pub fn into_beam(self) -> Beam {
        self.beam
    }

    pub fn params(&self) -> &PropagationParams {
        &self.params
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn dz(&self) -> f64 {
        self.dz
    }

    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub fn run_parameters(&self) -> RunParameters {
        RunParameters {
            beam: self.beam.summary(),
            medium: self.beam.medium().clone(),
            diffraction: self.diffraction.as_ref().map(DiffractionExecutor::info),
            kerr: self.kerr.as_ref().map(KerrExecutor::info),
            n_z: self.params.n_z,
            dz_0: self.params.dz_0,
            const_dz: self.params.const_dz,
            max_intensity_to_stop: self.params.max_intensity_to_stop,
            nonlin_phase_max: self.params.nonlin_phase_max,
        }
    }

    /// Run the loop to completion, reporting to `observer`.
    ///
    /// Fails with [`PropagationError::AlreadyPropagated`] if this propagator
    /// has already run, even if that run was aborted.
    pub fn propagate(
        &mut self,
        observer: &mut dyn PropagationObserver,
    ) -> Result<PropagationOutcome, PropagationError> {
        if self.started {
            return Err(PropagationError::AlreadyPropagated { z: self.z });
        }
        self.started = true;

        observer.on_start(&self.run_parameters())?;

        let n_z = self.params.n_z;
        let mut steps_taken = 0;
        let mut stopped_early = false;

        for n_step in 0..=n_z {
            if n_step > 0 {
                self.step()?;
            }

            let (z, dz, i_max, i_0) = (self.z, self.dz, self.beam.i_max(), self.beam.i_0());
            let states = self.history.states_mut();
            self.timings.measure("flush_current_state", || {
                flush_current_state(states, n_step, z, dz, i_max, i_0)
            });
            steps_taken = n_step;

            if every(n_step, self.params.print_current_state_every) {
                let history = &self.history;
                self.timings
                    .measure("print_current_state", || observer.on_print_state(n_step, history))?;
            }

            if every(n_step, self.params.plot_beam_every) {
                let beam = &self.beam;
                self.timings
                    .measure("plot_beam", || observer.on_beam(n_step, z, beam))?;
            }

            if i_max * i_0 > self.params.max_intensity_to_stop {
                stopped_early = n_step < n_z;
                if stopped_early {
                    log::warn!(
                        "Peak intensity {:.3e} W/m^2 exceeded {:.3e} W/m^2 at step {} (z = {:.4e} m); stopping",
                        i_max * i_0,
                        self.params.max_intensity_to_stop,
                        n_step,
                        z
                    );
                }
                break;
            }
        }

        let history = &mut self.history;
        self.timings.measure("trim_history", || history.trim());

        let history = &self.history;
        self.timings.measure("log_track", || observer.on_track(history))?;
        if self.params.plot_track {
            let column = self.params.track_parameter;
            self.timings
                .measure("plot_track", || observer.on_track_plot(history, column))?;
        }

        observer.on_timings(&self.timings)?;

        Ok(PropagationOutcome {
            steps_taken,
            stopped_early,
            final_z: self.z,
            final_dz: self.dz,
        })
    }

    /// Advance by one step of the current `dz`.
    fn step(&mut self) -> Result<(), PropagationError> {
        let dz = self.dz;
        let beam = &mut self.beam;

        if let Some(diffraction) = self.diffraction.as_mut() {
            self.timings
                .measure("diffraction", || diffraction.process_diffraction(beam, dz))?;
        }

        if let Some(kerr) = self.kerr.as_ref() {
            self.timings
                .measure("kerr_effect", || kerr.process_kerr_effect(beam, dz));
        }

        self.timings.measure("update_intensity", || beam.update_intensity());

        self.z += dz;

        if !self.params.const_dz {
            let medium = beam.medium();
            let (k_0, n_0, n_2) = (medium.k_0, medium.n_0, medium.n_2);
            let (i_max, i_0) = (beam.i_max(), beam.i_0());
            let nonlin_phase_max = self.params.nonlin_phase_max;
            self.dz = self.timings.measure("update_dz", || {
                update_dz(k_0, n_0, n_2, i_max, i_0, dz, nonlin_phase_max)
            });
        }

        Ok(())
    }
}

fn every(n_step: usize, period: usize) -> bool {
    period != 0 && n_step % period == 0
}

/// Shrink `dz` so the nonlinear phase of the next step stays below
/// `nonlin_phase_max`; `dz` never grows.
///
/// The phase is $k_0 n_2 i_0 i_{max} dz / n_0$; above the bound the step is
/// scaled by $0.8 \cdot$ `nonlin_phase_max` / phase.
pub fn update_dz(
    k_0: f64,
    n_0: f64,
    n_2: f64,
    i_max: f64,
    i_0: f64,
    dz: f64,
    nonlin_phase_max: f64,
) -> f64 {
    let nonlin_phase = k_0 * n_2 * i_0 * i_max * dz / n_0;
    if nonlin_phase > nonlin_phase_max {
        dz * 0.8 * nonlin_phase_max / nonlin_phase
    } else {
        dz
    }
}
