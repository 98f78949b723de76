//! Full transverse beam on a uniform Cartesian grid.

use std::f64::consts::PI;

use filament_media::Medium;
use ndarray::{Array1, Array2, ArrayView2, ArrayViewMut2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::{
    check_positive, check_self_focusing, critical_power, peak_intensity, profile_power_factor, ring_amplitude,
    BeamError,
};

/// Parameters of a Cartesian beam.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamXyParams {
    /// Ring order $M$ of the amplitude profile.
    pub ring_order: u32,
    /// Topological charge $m$ of the vortex phase $e^{im\varphi}$.
    pub charge: i32,
    /// Beam power in units of the critical power. The critical power only
    /// exists for a self-focusing medium, so the medium must have `n_2 > 0`.
    pub p_0_to_p_cr: f64,
    /// Beam radius along x (m).
    pub x_0: f64,
    /// Beam radius along y (m).
    pub y_0: f64,
    /// Grid width in units of the beam radius, along both axes.
    pub radii_in_grid: f64,
    pub n_x: usize,
    pub n_y: usize,
}

impl Default for BeamXyParams {
    fn default() -> Self {
        Self {
            ring_order: 0,
            charge: 0,
            p_0_to_p_cr: 1.0,
            x_0: 100e-6,
            y_0: 100e-6,
            radii_in_grid: 20.0,
            n_x: 512,
            n_y: 512,
        }
    }
}

/// Cartesian beam $E(x, y)$, stored with shape `(n_x, n_y)`.
///
/// The grid spans $[-L/2, L/2)$ with $L$ = `radii_in_grid` · `x_0` (resp.
/// `y_0`); `k_xs` and `k_ys` are the matching angular spatial frequencies in
/// FFT order.
#[derive(Debug, Clone)]
pub struct BeamXy {
    pub medium: Medium,
    pub ring_order: u32,
    pub charge: i32,
    pub p_0_to_p_cr: f64,
    pub p_cr: f64,
    pub p_0: f64,
    /// Peak intensity of the initial field (W/m²).
    pub i_0: f64,
    pub x_0: f64,
    pub y_0: f64,
    pub z_diff: f64,
    pub n_x: usize,
    pub n_y: usize,
    pub dx: f64,
    pub dy: f64,
    pub xs: Array1<f64>,
    pub ys: Array1<f64>,
    pub k_xs: Array1<f64>,
    pub k_ys: Array1<f64>,
    field: Array2<Complex64>,
    i_max: f64,
}

impl BeamXy {
    pub fn new(medium: Medium, params: &BeamXyParams) -> Result<Self, BeamError> {
        check_positive("x_0", params.x_0)?;
        check_positive("y_0", params.y_0)?;
        check_positive("radii_in_grid", params.radii_in_grid)?;
        check_positive("p_0_to_p_cr", params.p_0_to_p_cr)?;
        check_self_focusing(&medium)?;
        check_positive("k_0", medium.k_0)?;
        if params.n_x < 2 || params.n_y < 2 {
            return Err(BeamError::InvalidParameter(format!(
                "Cartesian grid needs at least 2x2 points, got {}x{}",
                params.n_x, params.n_y
            )));
        }

        let (n_x, n_y) = (params.n_x, params.n_y);
        let (xs, dx) = centred_axis(n_x, params.radii_in_grid * params.x_0);
        let (ys, dy) = centred_axis(n_y, params.radii_in_grid * params.y_0);
        let k_xs = wavenumbers(n_x, dx);
        let k_ys = wavenumbers(n_y, dy);

        let field = Array2::from_shape_fn((n_x, n_y), |(i, j)| {
            let (x, y) = (xs[i], ys[j]);
            let rho = ((x / params.x_0).powi(2) + (y / params.y_0).powi(2)).sqrt();
            let phase = f64::from(params.charge) * y.atan2(x);
            ring_amplitude(rho, params.ring_order) * Complex64::new(0.0, phase).exp()
        });

        let p_cr = critical_power(&medium, params.ring_order);
        let p_0 = params.p_0_to_p_cr * p_cr;
        let area = PI * params.x_0 * params.y_0 * profile_power_factor(params.ring_order);
        let i_0 = p_0 / area;
        let z_diff = medium.k_0 * params.x_0 * params.y_0;

        let mut beam = Self {
            medium,
            ring_order: params.ring_order,
            charge: params.charge,
            p_0_to_p_cr: params.p_0_to_p_cr,
            p_cr,
            p_0,
            i_0,
            x_0: params.x_0,
            y_0: params.y_0,
            z_diff,
            n_x,
            n_y,
            dx,
            dy,
            xs,
            ys,
            k_xs,
            k_ys,
            field,
            i_max: 0.0,
        };
        beam.update_intensity();
        Ok(beam)
    }

    pub fn field(&self) -> ArrayView2<'_, Complex64> {
        self.field.view()
    }

    /// Mutable view of the field; the grid shape cannot change through it.
    pub fn field_mut(&mut self) -> ArrayViewMut2<'_, Complex64> {
        self.field.view_mut()
    }

    pub fn i_max(&self) -> f64 {
        self.i_max
    }

    pub fn update_intensity(&mut self) {
        self.i_max = peak_intensity(self.field.iter());
    }

    /// $|E|^2$ in units of `i_0` at every grid point.
    pub fn intensity(&self) -> Array2<f64> {
        self.field.mapv(|e| e.norm_sqr())
    }

    /// Beam power $\sum |E|^2 i_0 \, dx \, dy$ (W).
    pub fn power(&self) -> f64 {
        self.field.iter().map(|e| e.norm_sqr()).sum::<f64>() * self.i_0 * self.dx * self.dy
    }
}

/// Uniform axis of `n` points over `[-width/2, width/2)`; returns the
/// coordinates and the spacing.
fn centred_axis(n: usize, width: f64) -> (Array1<f64>, f64) {
    let d = width / n as f64;
    (Array1::from_shape_fn(n, |i| -0.5 * width + i as f64 * d), d)
}

/// Angular spatial frequencies $2\pi \cdot$ `fftfreq(n, d)`, in FFT order
/// (non-negative frequencies first).
pub fn wavenumbers(n: usize, d: f64) -> Array1<f64> {
    let dk = 2.0 * PI / (n as f64 * d);
    let half = (n + 1) / 2;
    Array1::from_shape_fn(n, |i| {
        if i < half {
            i as f64 * dk
        } else {
            (i as f64 - n as f64) * dk
        }
    })
}
