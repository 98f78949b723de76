//! Axially symmetric beam on a uniform radial grid.

use filament_media::Medium;
use ndarray::{Array1, ArrayView1, ArrayViewMut1};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::{
    check_positive, check_self_focusing, critical_power, peak_intensity, profile_power_factor, ring_amplitude,
    BeamError,
};

/// Parameters of a radial beam.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamRParams {
    /// Ring order $M$ of the amplitude profile.
    pub ring_order: u32,
    /// Topological charge $m$ of the vortex.
    pub charge: i32,
    /// Beam power in units of the critical power. The critical power only
    /// exists for a self-focusing medium, so the medium must have `n_2 > 0`.
    pub p_0_to_p_cr: f64,
    /// Beam radius $r_0$ (m).
    pub r_0: f64,
    /// Grid extent in units of `r_0`.
    pub radii_in_grid: f64,
    /// Number of radial grid points.
    pub n_r: usize,
}

impl Default for BeamRParams {
    fn default() -> Self {
        Self {
            ring_order: 0,
            charge: 0,
            p_0_to_p_cr: 1.0,
            r_0: 100e-6,
            radii_in_grid: 10.0,
            n_r: 1024,
        }
    }
}

/// Axially symmetric beam $E(r)$.
///
/// The radial grid is $r_i = i \, dr$ with $dr = r_{max} / (n_r - 1)$ and
/// $r_{max}$ = `radii_in_grid` · `r_0`; index 0 is the axis.
#[derive(Debug, Clone)]
pub struct BeamR {
    pub medium: Medium,
    pub ring_order: u32,
    pub charge: i32,
    pub p_0_to_p_cr: f64,
    pub p_cr: f64,
    pub p_0: f64,
    /// Peak intensity of the initial field (W/m²).
    pub i_0: f64,
    pub r_0: f64,
    pub z_diff: f64,
    pub n_r: usize,
    pub dr: f64,
    pub rs: Array1<f64>,
    field: Array1<Complex64>,
    i_max: f64,
}

impl BeamR {
    pub fn new(medium: Medium, params: &BeamRParams) -> Result<Self, BeamError> {
        check_positive("r_0", params.r_0)?;
        check_positive("radii_in_grid", params.radii_in_grid)?;
        check_positive("p_0_to_p_cr", params.p_0_to_p_cr)?;
        check_self_focusing(&medium)?;
        check_positive("k_0", medium.k_0)?;
        if params.n_r < 3 {
            return Err(BeamError::InvalidParameter(format!(
                "radial grid needs at least 3 points, got n_r = {}",
                params.n_r
            )));
        }

        let n_r = params.n_r;
        let r_max = params.radii_in_grid * params.r_0;
        let dr = r_max / (n_r - 1) as f64;
        let rs = Array1::from_shape_fn(n_r, |i| i as f64 * dr);

        let field = rs.mapv(|r| Complex64::from(ring_amplitude(r / params.r_0, params.ring_order)));

        let p_cr = critical_power(&medium, params.ring_order);
        let p_0 = params.p_0_to_p_cr * p_cr;
        let area = std::f64::consts::PI * params.r_0.powi(2) * profile_power_factor(params.ring_order);
        let i_0 = p_0 / area;
        let z_diff = medium.k_0 * params.r_0.powi(2);

        let mut beam = Self {
            medium,
            ring_order: params.ring_order,
            charge: params.charge,
            p_0_to_p_cr: params.p_0_to_p_cr,
            p_cr,
            p_0,
            i_0,
            r_0: params.r_0,
            z_diff,
            n_r,
            dr,
            rs,
            field,
            i_max: 0.0,
        };
        beam.update_intensity();
        Ok(beam)
    }

    pub fn field(&self) -> ArrayView1<'_, Complex64> {
        self.field.view()
    }

    /// Mutable view of the field; the grid shape cannot change through it.
    pub fn field_mut(&mut self) -> ArrayViewMut1<'_, Complex64> {
        self.field.view_mut()
    }

    pub fn i_max(&self) -> f64 {
        self.i_max
    }

    pub fn update_intensity(&mut self) {
        self.i_max = peak_intensity(self.field.iter());
    }

    /// $|E|^2$ in units of `i_0` at every grid point.
    pub fn intensity(&self) -> Array1<f64> {
        self.field.mapv(|e| e.norm_sqr())
    }

    /// Beam power $2\pi \int |E|^2 i_0 \, r \, dr$ by the trapezoidal rule (W).
    pub fn power(&self) -> f64 {
        let integrand: Vec<f64> = self
            .field
            .iter()
            .zip(self.rs.iter())
            .map(|(e, r)| e.norm_sqr() * r)
            .collect();
        let inner: f64 = integrand[1..self.n_r - 1].iter().sum();
        let trapz = self.dr * (inner + 0.5 * (integrand[0] + integrand[self.n_r - 1]));
        2.0 * std::f64::consts::PI * self.i_0 * trapz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn medium() -> Medium {
        Medium::from_constants("test", 1800e-9, 1.39, 1.0e-20)
    }

    #[test]
    fn test_gaussian_starts_at_unit_peak_on_axis() {
        let beam = BeamR::new(medium(), &BeamRParams::default()).unwrap();
        assert_eq!(beam.field()[0], Complex64::new(1.0, 0.0));
        assert_relative_eq!(beam.i_max(), 1.0);
        assert_relative_eq!(beam.rs[beam.n_r - 1], 10.0 * 100e-6, max_relative = 1e-12);
    }

    #[test]
    fn test_discrete_power_matches_requested_power() {
        let params = BeamRParams {
            ring_order: 1,
            charge: 1,
            p_0_to_p_cr: 3.0,
            n_r: 4096,
            ..Default::default()
        };
        let beam = BeamR::new(medium(), &params).unwrap();
        assert_relative_eq!(beam.p_0, 3.0 * beam.p_cr, max_relative = 1e-12);
        assert_relative_eq!(beam.power(), beam.p_0, max_relative = 1e-3);
    }

    #[test]
    fn test_diffraction_length() {
        let beam = BeamR::new(medium(), &BeamRParams::default()).unwrap();
        assert_relative_eq!(beam.z_diff, beam.medium.k_0 * 1e-8, max_relative = 1e-12);
    }

    #[test]
    fn test_rejects_degenerate_grid() {
        let params = BeamRParams {
            n_r: 2,
            ..Default::default()
        };
        assert!(BeamR::new(medium(), &params).is_err());
    }

    #[test]
    fn test_rejects_media_without_critical_power() {
        for n_2 in [0.0, -1.0e-20, f64::NAN] {
            let medium = Medium::from_constants("test", 1800e-9, 1.39, n_2);
            let err = BeamR::new(medium, &BeamRParams::default()).unwrap_err();
            assert!(err.to_string().contains("n_2 > 0"), "{}", err);
        }
    }
}
