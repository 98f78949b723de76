//! Compute backend trait and device abstraction.
//!
//! The [`ComputeBackend`] trait abstracts over the execution environment for
//! the spectral hot path so that the diffraction code in `filament-core`
//! never deals with thread pools or FFT plans directly.

use num_complex::Complex64;
use thiserror::Error;

/// Errors originating from compute backends.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Backend not available: {0}")]
    Unavailable(String),

    #[error("Buffer of length {len} does not hold a {rows}x{cols} grid")]
    ShapeMismatch { len: usize, rows: usize, cols: usize },

    #[error("Invalid transform size: {rows}x{cols}")]
    InvalidSize { rows: usize, cols: usize },
}

/// Describes the capabilities of a compute backend.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    /// Number of worker threads used for transforms.
    pub workers: usize,
}

/// Abstraction over compute backends.
///
/// Buffers are row-major grids of `rows * cols` samples, i.e. the layout of
/// a standard `ndarray::Array2` of shape `(rows, cols)`. Both transforms are
/// atomic from the caller's point of view: they either complete over the whole
/// buffer or return an error before touching it.
pub trait ComputeBackend: Send + Sync {
    /// Return information about the device.
    fn device_info(&self) -> DeviceInfo;

    /// Unnormalised forward 2D discrete Fourier transform, in place.
    fn fft2(&self, data: &mut [Complex64], rows: usize, cols: usize) -> Result<(), ComputeError>;

    /// Inverse 2D discrete Fourier transform, in place, scaled by
    /// `1 / (rows * cols)` so that `ifft2(fft2(x)) == x`.
    fn ifft2(&self, data: &mut [Complex64], rows: usize, cols: usize) -> Result<(), ComputeError>;
}

/// Check that a flat buffer can hold a `rows x cols` grid.
pub(crate) fn check_shape(len: usize, rows: usize, cols: usize) -> Result<(), ComputeError> {
    if rows == 0 || cols == 0 {
        return Err(ComputeError::InvalidSize { rows, cols });
    }
    if rows.checked_mul(cols) != Some(len) {
        return Err(ComputeError::ShapeMismatch { len, rows, cols });
    }
    Ok(())
}
