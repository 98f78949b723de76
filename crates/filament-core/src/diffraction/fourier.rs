//! Spectral diffraction step for Cartesian beams.
//!
//! In Fourier space the linear paraxial equation is diagonal, so one step is
//! exact for the sampled field:
//!
//! $$ \hat{E}(k_x, k_y; z + dz) = \hat{E}(k_x, k_y; z)
//!    \exp\!\left(\frac{i \, dz}{2 k_0} (k_x^2 + k_y^2)\right) $$
//!
//! The propagator factorises into an x part and a y part, applied row-wise
//! and column-wise.

use std::sync::Arc;

use filament_compute::ComputeBackend;
use ndarray::{Array1, ArrayView1, ArrayViewMut2, Axis};
use num_complex::Complex64;

use super::DiffractionError;
use crate::beam::BeamXy;

/// Fourier split-step diffraction executor.
pub struct FourierDiffraction {
    backend: Arc<dyn ComputeBackend>,
    k_xs: Array1<f64>,
    k_ys: Array1<f64>,
}

impl FourierDiffraction {
    pub const INFO: &'static str = "fourier_diffraction_xy";

    /// Build an executor for the grid of `beam`, running transforms on `backend`.
    pub fn new(beam: &BeamXy, backend: Arc<dyn ComputeBackend>) -> Self {
        Self {
            backend,
            k_xs: beam.k_xs.clone(),
            k_ys: beam.k_ys.clone(),
        }
    }

    /// Apply one diffraction step of length `dz` to the beam field.
    pub fn process(&self, beam: &mut BeamXy, dz: f64) -> Result<(), DiffractionError> {
        if !dz.is_finite() {
            return Err(DiffractionError::DegenerateStep(dz));
        }

        let (n_x, n_y) = (self.k_xs.len(), self.k_ys.len());
        let actual = beam.field().dim();
        if actual != (n_x, n_y) {
            return Err(DiffractionError::ShapeMismatch {
                expected: vec![n_x, n_y],
                actual: vec![actual.0, actual.1],
            });
        }

        let current_lin_phase = Complex64::new(0.0, 0.5 * dz / beam.medium.k_0);
        let mut field = beam.field_mut();

        let data = field.as_slice_mut().ok_or(DiffractionError::NonContiguous)?;
        self.backend.fft2(data, n_x, n_y)?;

        phase_increment(field.view_mut(), self.k_xs.view(), self.k_ys.view(), current_lin_phase);

        let data = field.as_slice_mut().ok_or(DiffractionError::NonContiguous)?;
        self.backend.ifft2(data, n_x, n_y)?;

        Ok(())
    }
}

/// Multiply a spectrum row-wise by $\exp(\phi k_x^2)$ and column-wise by
/// $\exp(\phi k_y^2)$, where $\phi$ is `current_lin_phase`.
pub fn phase_increment(
    mut field_fft: ArrayViewMut2<'_, Complex64>,
    k_xs: ArrayView1<'_, f64>,
    k_ys: ArrayView1<'_, f64>,
    current_lin_phase: Complex64,
) {
    for (mut row, &k_x) in field_fft.outer_iter_mut().zip(k_xs.iter()) {
        let factor = (current_lin_phase * (k_x * k_x)).exp();
        row.mapv_inplace(|v| v * factor);
    }

    for (mut col, &k_y) in field_fft.axis_iter_mut(Axis(1)).zip(k_ys.iter()) {
        let factor = (current_lin_phase * (k_y * k_y)).exp();
        col.mapv_inplace(|v| v * factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam::BeamXyParams;
    use filament_compute::CpuBackend;
    use filament_media::Medium;
    use ndarray::{array, Array2};

    fn medium() -> Medium {
        Medium::from_constants("test", 800e-9, 1.45, 2.5e-20)
    }

    fn backend() -> Arc<dyn ComputeBackend> {
        Arc::new(CpuBackend::with_workers(2).unwrap())
    }

    #[test]
    fn test_phase_increment_is_separable_propagator() {
        let k_xs = array![0.0, 1.0, -2.0];
        let k_ys = array![0.5, -1.5];
        let phi = Complex64::new(0.0, 0.3);
        let mut spectrum = Array2::from_shape_fn((3, 2), |(i, j)| Complex64::new(1.0 + i as f64, j as f64));
        let original = spectrum.clone();

        phase_increment(spectrum.view_mut(), k_xs.view(), k_ys.view(), phi);

        for ((i, j), v) in spectrum.indexed_iter() {
            let expected = original[[i, j]] * (phi * (k_xs[i].powi(2) + k_ys[j].powi(2))).exp();
            assert!((v - expected).norm() < 1e-14);
        }
    }

    #[test]
    fn test_plane_wave_picks_up_paraxial_phase() {
        let params = BeamXyParams {
            n_x: 32,
            n_y: 16,
            ..Default::default()
        };
        let mut beam = BeamXy::new(medium(), &params).unwrap();
        let (a, b) = (3, 14);
        let (k_a, k_b) = (beam.k_xs[a], beam.k_ys[b]);
        let xs = beam.xs.clone();
        let ys = beam.ys.clone();
        beam.field_mut().indexed_iter_mut().for_each(|((i, j), v)| {
            *v = Complex64::new(0.0, k_a * xs[i] + k_b * ys[j]).exp();
        });
        let before = beam.field().to_owned();

        let executor = FourierDiffraction::new(&beam, backend());
        let dz = 0.05 * beam.z_diff;
        executor.process(&mut beam, dz).unwrap();

        let expected_factor =
            Complex64::new(0.0, 0.5 * dz / beam.medium.k_0 * (k_a * k_a + k_b * k_b)).exp();
        for (after, before) in beam.field().iter().zip(before.iter()) {
            assert!((after - before * expected_factor).norm() < 1e-10);
        }
    }

    #[test]
    fn test_zero_step_leaves_field_unchanged() {
        let params = BeamXyParams {
            ring_order: 1,
            charge: 1,
            n_x: 32,
            n_y: 32,
            ..Default::default()
        };
        let mut beam = BeamXy::new(medium(), &params).unwrap();
        let before = beam.field().to_owned();

        FourierDiffraction::new(&beam, backend()).process(&mut beam, 0.0).unwrap();

        for (after, before) in beam.field().iter().zip(before.iter()) {
            assert!((after - before).norm() < 1e-12);
        }
    }

    #[test]
    fn test_grid_shape_mismatch_is_rejected() {
        let large = BeamXy::new(medium(), &BeamXyParams { n_x: 64, n_y: 64, ..Default::default() })
            .unwrap();
        let mut small = BeamXy::new(medium(), &BeamXyParams { n_x: 32, n_y: 32, ..Default::default() })
            .unwrap();

        let executor = FourierDiffraction::new(&large, backend());
        let err = executor.process(&mut small, 1e-6).unwrap_err();
        assert!(matches!(err, DiffractionError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_non_finite_step_is_rejected() {
        let mut beam = BeamXy::new(medium(), &BeamXyParams { n_x: 16, n_y: 16, ..Default::default() })
            .unwrap();
        let executor = FourierDiffraction::new(&beam, backend());
        assert!(matches!(
            executor.process(&mut beam, f64::NAN),
            Err(DiffractionError::DegenerateStep(_))
        ));
    }
}
