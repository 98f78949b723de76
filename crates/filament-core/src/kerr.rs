//! Kerr self-focusing sub-step.
//!
//! With an intensity-dependent index $n = n_0 + n_2 I$, a step of length $dz$
//! adds a local phase proportional to $|E|^2$:
//!
//! $$ E \leftarrow E \exp\!\left(-i \frac{k_0 n_2 i_0}{n_0} |E|^2 dz\right) $$
//!
//! The amplitude $|E|$ is unchanged; only the wavefront curves, which for
//! $n_2 > 0$ focuses the beam under the envelope convention of the
//! diffraction executors.

use num_complex::Complex64;

use crate::beam::Beam;

/// Kerr sub-step executor.
#[derive(Debug, Clone, Copy, Default)]
pub struct KerrExecutor;

impl KerrExecutor {
    pub const INFO: &'static str = "kerr_effect";

    pub fn new() -> Self {
        Self
    }

    pub fn info(&self) -> &'static str {
        Self::INFO
    }

    /// Apply the Kerr phase for a step of length `dz` to the beam field.
    pub fn process_kerr_effect(&self, beam: &mut Beam, dz: f64) {
        let medium = beam.medium();
        let coeff = kerr_coefficient(medium.k_0, medium.n_0, medium.n_2, beam.i_0(), dz);

        match beam {
            Beam::Xy(b) => kerr_phase(b.field_mut().iter_mut(), coeff),
            Beam::R(b) => kerr_phase(b.field_mut().iter_mut(), coeff),
        }
    }
}

/// Nonlinear phase per unit $|E|^2$ accumulated over `dz`.
pub fn kerr_coefficient(k_0: f64, n_0: f64, n_2: f64, i_0: f64, dz: f64) -> f64 {
    k_0 * n_2 * i_0 * dz / n_0
}

/// Multiply every sample by $\exp(-i \cdot \text{coeff} \cdot |E|^2)$.
pub fn kerr_phase<'a>(field: impl IntoIterator<Item = &'a mut Complex64>, coeff: f64) {
    for e in field {
        *e *= Complex64::new(0.0, -coeff * e.norm_sqr()).exp();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam::{BeamR, BeamRParams};
    use approx::assert_relative_eq;
    use filament_media::Medium;

    #[test]
    fn test_kerr_phase_preserves_amplitude() {
        let mut field = vec![
            Complex64::new(1.0, 0.0),
            Complex64::new(0.3, -0.4),
            Complex64::new(0.0, 0.0),
            Complex64::new(-2.0, 1.0),
        ];
        let before: Vec<f64> = field.iter().map(|e| e.norm()).collect();

        kerr_phase(field.iter_mut(), 0.7);

        for (e, n) in field.iter().zip(before) {
            assert_relative_eq!(e.norm(), n, max_relative = 1e-14);
        }
    }

    #[test]
    fn test_kerr_phase_is_proportional_to_intensity() {
        let mut field = vec![Complex64::new(1.0, 0.0), Complex64::new(0.5, 0.0)];
        kerr_phase(field.iter_mut(), 0.2);
        assert_relative_eq!(field[0].arg(), -0.2, epsilon = 1e-14);
        assert_relative_eq!(field[1].arg(), -0.2 * 0.25, epsilon = 1e-14);
    }

    #[test]
    fn test_executor_uses_medium_and_peak_intensity() {
        let medium = Medium::from_constants("test", 1800e-9, 1.39, 1.0e-20);
        let beam = BeamR::new(medium, &BeamRParams { n_r: 64, ..Default::default() }).unwrap();
        let mut beam = Beam::from(beam);

        let dz = 1e-6;
        KerrExecutor::new().process_kerr_effect(&mut beam, dz);

        let m = beam.medium();
        let expected = -m.k_0 * m.n_2 * beam.i_0() * dz / m.n_0;
        let Beam::R(b) = &beam else { unreachable!() };
        // Unit peak on the axis
        assert_relative_eq!(b.field()[0].arg(), expected, max_relative = 1e-12);
        assert_relative_eq!(b.field()[0].norm(), 1.0, max_relative = 1e-14);
    }
}
