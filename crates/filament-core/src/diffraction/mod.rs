//! Linear diffraction sub-step of the split-step scheme.
//!
//! A [`DiffractionExecutor`] advances the field of a [`Beam`] by one step
//! `dz` of the linear paraxial equation
//!
//! $$ 2 i k_0 \frac{\partial E}{\partial z} = \nabla_\perp^2 E $$
//!
//! Two schemes exist, one per beam symmetry:
//!
//! - [`FourierDiffraction`]: spectral split-step on Cartesian grids.
//! - [`SweepDiffraction`]: implicit finite differences with a tridiagonal
//!   (Thomas) solve on radial grids, including the centrifugal term of
//!   vortex beams.

mod fourier;
mod sweep;

pub use fourier::{phase_increment, FourierDiffraction};
pub use sweep::{sweep, BoundaryConditions, SweepCoefficients, SweepDiffraction, SweepScratch};

use std::sync::Arc;

use filament_compute::{ComputeBackend, ComputeError};
use thiserror::Error;

use crate::beam::Beam;

/// Errors that can occur during a diffraction step.
#[derive(Debug, Error)]
pub enum DiffractionError {
    #[error("Field shape {actual:?} does not match the solver grid {expected:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Executor '{executor}' cannot process a '{beam}' beam")]
    SymmetryMismatch {
        executor: &'static str,
        beam: &'static str,
    },

    #[error("Degenerate step size dz = {0}")]
    DegenerateStep(f64),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Field buffer is not contiguous")]
    NonContiguous,

    #[error("Compute backend error: {0}")]
    Compute(#[from] ComputeError),
}

/// One of the two diffraction schemes, chosen by beam symmetry.
pub enum DiffractionExecutor {
    Fourier(FourierDiffraction),
    Sweep(SweepDiffraction),
}

impl DiffractionExecutor {
    /// Select and build the executor matching the beam's symmetry.
    ///
    /// `backend` is only used by the Fourier scheme.
    pub fn for_beam(
        beam: &Beam,
        backend: Arc<dyn ComputeBackend>,
    ) -> Result<Self, DiffractionError> {
        let executor = match beam {
            Beam::Xy(b) => DiffractionExecutor::Fourier(FourierDiffraction::new(b, backend)),
            Beam::R(b) => DiffractionExecutor::Sweep(SweepDiffraction::new(b)?),
        };
        log::debug!("Diffraction executor: {}", executor.info());
        Ok(executor)
    }

    /// Identifier of the scheme.
    pub fn info(&self) -> &'static str {
        match self {
            DiffractionExecutor::Fourier(_) => FourierDiffraction::INFO,
            DiffractionExecutor::Sweep(_) => SweepDiffraction::INFO,
        }
    }

    /// Advance the beam field by one diffraction step `dz`, in place.
    pub fn process_diffraction(&mut self, beam: &mut Beam, dz: f64) -> Result<(), DiffractionError> {
        match (self, beam) {
            (DiffractionExecutor::Fourier(executor), Beam::Xy(b)) => executor.process(b, dz),
            (DiffractionExecutor::Sweep(executor), Beam::R(b)) => executor.process(b, dz),
            (executor, beam) => Err(DiffractionError::SymmetryMismatch {
                executor: executor.info(),
                beam: beam.info(),
            }),
        }
    }
}
