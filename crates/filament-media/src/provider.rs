//! Medium property provider trait.
//!
//! All media implement [`MediumProvider`], which returns the wavelength
//! dependent linear refractive index and the Kerr (nonlinear) index.

use thiserror::Error;

/// Errors from medium providers.
#[derive(Debug, Error)]
pub enum MediumError {
    #[error("Wavelength {wavelength_m:e} m is outside the data range [{min:e}, {max:e}] m")]
    OutOfRange {
        wavelength_m: f64,
        min: f64,
        max: f64,
    },

    #[error("Medium not found: {0}")]
    NotFound(String),

    #[error("Data error: {0}")]
    DataError(String),
}

/// Provides wavelength-dependent optical properties of a transparent medium.
pub trait MediumProvider: Send + Sync {
    /// Short identifier of this medium (e.g. "SiO2").
    fn name(&self) -> &str;

    /// Wavelength range over which the data is valid (metres).
    fn wavelength_range(&self) -> (f64, f64);

    /// Linear refractive index $n_0(\lambda)$.
    fn linear_index(&self, wavelength_m: f64) -> Result<f64, MediumError>;

    /// Nonlinear (Kerr) index $n_2(\lambda)$ in m²/W.
    fn nonlinear_index(&self, wavelength_m: f64) -> Result<f64, MediumError>;

    /// Fail with [`MediumError::OutOfRange`] outside [`wavelength_range`](Self::wavelength_range).
    fn check_range(&self, wavelength_m: f64) -> Result<(), MediumError> {
        let (min, max) = self.wavelength_range();
        if !(wavelength_m >= min && wavelength_m <= max) {
            return Err(MediumError::OutOfRange {
                wavelength_m,
                min,
                max,
            });
        }
        Ok(())
    }
}
