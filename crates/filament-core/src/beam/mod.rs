//! Beams: the transverse field buffer plus its grid and medium.
//!
//! A beam owns the complex field that the diffraction and Kerr executors
//! mutate in place. Two symmetries are supported:
//!
//! - [`BeamR`]: axially symmetric field $E(r)$ on a uniform radial grid.
//! - [`BeamXy`]: full transverse field $E(x, y)$ on a uniform Cartesian grid.
//!
//! Both start from the ring (Laguerre–Gaussian-like) profile
//!
//! $$ E \propto \rho^M \exp(-\rho^2 / 2) \exp(i m \varphi) $$
//!
//! normalised to unit peak amplitude, so that the initial `i_max` is 1 and
//! `i_0` carries the physical peak intensity (W/m²).

mod cartesian;
mod radial;

pub use cartesian::{wavenumbers, BeamXy, BeamXyParams};
pub use radial::{BeamR, BeamRParams};

use std::f64::consts::PI;

use filament_media::Medium;
use num_complex::Complex64;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while building a beam.
#[derive(Debug, Error)]
pub enum BeamError {
    #[error("Invalid beam parameter: {0}")]
    InvalidParameter(String),
}

/// A beam of either supported symmetry.
#[derive(Debug, Clone)]
pub enum Beam {
    Xy(BeamXy),
    R(BeamR),
}

impl Beam {
    /// Symmetry tag of the beam.
    pub fn info(&self) -> &'static str {
        match self {
            Beam::Xy(_) => "beam_xy",
            Beam::R(_) => "beam_r",
        }
    }

    pub fn medium(&self) -> &Medium {
        match self {
            Beam::Xy(b) => &b.medium,
            Beam::R(b) => &b.medium,
        }
    }

    /// Peak intensity of the initial field (W/m²).
    pub fn i_0(&self) -> f64 {
        match self {
            Beam::Xy(b) => b.i_0,
            Beam::R(b) => b.i_0,
        }
    }

    /// Current peak of $|E|^2$, in units of `i_0`.
    pub fn i_max(&self) -> f64 {
        match self {
            Beam::Xy(b) => b.i_max(),
            Beam::R(b) => b.i_max(),
        }
    }

    /// Diffraction length $k_0 r_0^2$ (m).
    pub fn z_diff(&self) -> f64 {
        match self {
            Beam::Xy(b) => b.z_diff,
            Beam::R(b) => b.z_diff,
        }
    }

    /// Recompute `i_max` from the current field.
    pub fn update_intensity(&mut self) {
        match self {
            Beam::Xy(b) => b.update_intensity(),
            Beam::R(b) => b.update_intensity(),
        }
    }

    /// Grid shape of the field buffer.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Beam::Xy(b) => vec![b.n_x, b.n_y],
            Beam::R(b) => vec![b.n_r],
        }
    }

    /// Serializable description of the initial beam.
    pub fn summary(&self) -> BeamSummary {
        let (ring_order, charge, p_0_to_p_cr, p_cr, p_0) = match self {
            Beam::Xy(b) => (b.ring_order, b.charge, b.p_0_to_p_cr, b.p_cr, b.p_0),
            Beam::R(b) => (b.ring_order, b.charge, b.p_0_to_p_cr, b.p_cr, b.p_0),
        };
        BeamSummary {
            info: self.info().to_string(),
            shape: self.shape(),
            ring_order,
            charge,
            p_0_to_p_cr,
            p_cr,
            p_0,
            i_0: self.i_0(),
            z_diff: self.z_diff(),
        }
    }
}

impl From<BeamXy> for Beam {
    fn from(beam: BeamXy) -> Self {
        Beam::Xy(beam)
    }
}

impl From<BeamR> for Beam {
    fn from(beam: BeamR) -> Self {
        Beam::R(beam)
    }
}

/// Initial beam parameters as recorded with the run.
#[derive(Debug, Clone, Serialize)]
pub struct BeamSummary {
    pub info: String,
    pub shape: Vec<usize>,
    pub ring_order: u32,
    pub charge: i32,
    pub p_0_to_p_cr: f64,
    /// Critical power for self-focusing (W).
    pub p_cr: f64,
    /// Beam power (W).
    pub p_0: f64,
    /// Peak intensity (W/m²).
    pub i_0: f64,
    /// Diffraction length (m).
    pub z_diff: f64,
}

/// Critical power of self-focusing for a ring beam of order `ring_order`.
///
/// $$ P_{cr} = \frac{3.72 \lambda^2}{8 \pi n_0 n_2} \cdot
///    \frac{4^M \, M! \, (M+1)!}{(2M)!} $$
pub fn critical_power(medium: &Medium, ring_order: u32) -> f64 {
    let p_gauss = 3.72 * medium.lmbda.powi(2) / (8.0 * PI * medium.n_0 * medium.n_2);
    let ratio = 4f64.powi(ring_order as i32) * factorial(ring_order) * factorial(ring_order + 1)
        / factorial(2 * ring_order);
    p_gauss * ratio
}

/// $\int |E|^2 \, dA$ of the unit-peak ring profile, in units of the beam area
/// $\pi r_0^2$ (or $\pi x_0 y_0$).
pub(crate) fn profile_power_factor(ring_order: u32) -> f64 {
    factorial(ring_order) / ring_peak(ring_order).powi(2)
}

/// Unit-peak ring amplitude at normalised radius `rho`.
pub(crate) fn ring_amplitude(rho: f64, ring_order: u32) -> f64 {
    rho.powi(ring_order as i32) * (-0.5 * rho * rho).exp() / ring_peak(ring_order)
}

/// Maximum of $\rho^M e^{-\rho^2/2}$, reached at $\rho = \sqrt{M}$.
fn ring_peak(ring_order: u32) -> f64 {
    let m = f64::from(ring_order);
    m.powf(0.5 * m) * (-0.5 * m).exp()
}

fn factorial(n: u32) -> f64 {
    (1..=n).map(f64::from).product()
}

/// Peak of $|E|^2$ over a field buffer.
pub fn peak_intensity<'a>(field: impl IntoIterator<Item = &'a Complex64>) -> f64 {
    field
        .into_iter()
        .map(|e| e.norm_sqr())
        .fold(0.0, f64::max)
}

pub(crate) fn check_positive(name: &str, value: f64) -> Result<(), BeamError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(BeamError::InvalidParameter(format!(
            "{} must be positive and finite, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Beam power is set relative to the critical power, which needs `n_2 > 0`.
pub(crate) fn check_self_focusing(medium: &Medium) -> Result<(), BeamError> {
    if !(medium.n_2.is_finite() && medium.n_2 > 0.0) {
        return Err(BeamError::InvalidParameter(format!(
            "medium {} has n_2 = {}; beam power is given in units of the critical power, \
             which requires a self-focusing medium (n_2 > 0)",
            medium.name, medium.n_2
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sio2_like() -> Medium {
        Medium::from_constants("test", 800e-9, 1.45, 2.5e-20)
    }

    #[test]
    fn test_gaussian_critical_power() {
        let medium = sio2_like();
        let expected = 3.72 * (800e-9_f64).powi(2) / (8.0 * PI * 1.45 * 2.5e-20);
        assert_relative_eq!(critical_power(&medium, 0), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_vortex_critical_power_ratio() {
        let medium = sio2_like();
        let p_g = critical_power(&medium, 0);
        assert_relative_eq!(critical_power(&medium, 1) / p_g, 4.0, max_relative = 1e-12);
        assert_relative_eq!(critical_power(&medium, 2) / p_g, 8.0, max_relative = 1e-12);
    }

    #[test]
    fn test_ring_amplitude_has_unit_peak() {
        for order in 0..4 {
            let peak = ring_amplitude(f64::from(order).sqrt(), order);
            assert_relative_eq!(peak, 1.0, max_relative = 1e-12);
        }
        assert_relative_eq!(ring_amplitude(0.0, 0), 1.0);
        assert_eq!(ring_amplitude(0.0, 2), 0.0);
    }

    #[test]
    fn test_gaussian_power_factor_is_one() {
        assert_relative_eq!(profile_power_factor(0), 1.0);
        // M = 1: 1! / (e^-1) = e
        assert_relative_eq!(profile_power_factor(1), std::f64::consts::E, max_relative = 1e-12);
    }

    #[test]
    fn test_peak_intensity() {
        let field = [
            Complex64::new(0.5, 0.0),
            Complex64::new(0.0, -2.0),
            Complex64::new(1.0, 1.0),
        ];
        assert_relative_eq!(peak_intensity(field.iter()), 4.0);
    }
}
