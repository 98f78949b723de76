//! Implicit finite-difference diffraction step for radial beams.
//!
//! The radial Laplacian with the centrifugal term of a vortex of charge $m$,
//!
//! $$ \nabla_\perp^2 E = \frac{\partial^2 E}{\partial r^2}
//!    + \frac{1}{r}\frac{\partial E}{\partial r} - \frac{m^2}{r^2} E $$
//!
//! is discretised with central differences and integrated with a
//! Crank–Nicolson-type scheme. Each step is one tridiagonal solve by forward
//! sweep and back substitution (Thomas algorithm), so the cost is $O(n_r)$.
//!
//! Boundary conditions are expressed through the sweep recursion
//! $E_{j-1} = \xi_j E_j + \eta_j$:
//!
//! - axis: $\xi_1 = \kappa_{left}$, $\eta_1 = \mu_{left}$ with
//!   $(\kappa, \mu) = (1, 0)$, i.e. $\partial E / \partial r = 0$;
//! - outer edge: $E_{n_r-1} = (\mu_{right} + \kappa_{right}\eta_{n_r-1}) /
//!   (1 - \kappa_{right}\xi_{n_r-1})$ with $(\kappa, \mu) = (0, 0)$.

use num_complex::Complex64;

use super::DiffractionError;
use crate::beam::BeamR;

/// Sweep boundary coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryConditions {
    pub kappa_left: f64,
    pub mu_left: f64,
    pub kappa_right: f64,
    pub mu_right: f64,
}

impl Default for BoundaryConditions {
    /// Zero radial derivative on the axis, zero field at the outer edge.
    fn default() -> Self {
        Self {
            kappa_left: 1.0,
            mu_left: 0.0,
            kappa_right: 0.0,
            mu_right: 0.0,
        }
    }
}

/// Step-independent coefficients of the tridiagonal system.
///
/// Entries at the two boundary indices are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepCoefficients {
    /// $1 / (2 dr^2)$
    pub c1: f64,
    /// $1 / (4 dr)$
    pub c2: f64,
    /// $2 i k_0$
    pub c3: Complex64,
    /// Super-diagonal, $c_1 + c_2 / r_i$.
    pub alpha: Vec<f64>,
    /// Sub-diagonal, $c_1 - c_2 / r_i$.
    pub gamma: Vec<f64>,
    /// Centrifugal potential $(m / r_i)^2$.
    pub vx: Vec<f64>,
}

impl SweepCoefficients {
    pub fn new(rs: &[f64], dr: f64, k_0: f64, charge: i32) -> Self {
        let n_r = rs.len();
        let c1 = 1.0 / (2.0 * dr * dr);
        let c2 = 1.0 / (4.0 * dr);
        let c3 = Complex64::new(0.0, 2.0 * k_0);
        let m = f64::from(charge);

        let mut alpha = vec![0.0; n_r];
        let mut gamma = vec![0.0; n_r];
        let mut vx = vec![0.0; n_r];
        for i in 1..n_r.saturating_sub(1) {
            alpha[i] = c1 + c2 / rs[i];
            gamma[i] = c1 - c2 / rs[i];
            vx[i] = (m / rs[i]).powi(2);
        }

        Self {
            c1,
            c2,
            c3,
            alpha,
            gamma,
            vx,
        }
    }
}

/// Per-step working arrays of the sweep; overwritten on every call.
#[derive(Debug, Clone)]
pub struct SweepScratch {
    pub beta: Vec<Complex64>,
    pub delta: Vec<Complex64>,
    pub xi: Vec<Complex64>,
    pub eta: Vec<Complex64>,
}

impl SweepScratch {
    pub fn new(n_r: usize) -> Self {
        let zero = Complex64::new(0.0, 0.0);
        Self {
            beta: vec![zero; n_r],
            delta: vec![zero; n_r],
            xi: vec![zero; n_r],
            eta: vec![zero; n_r],
        }
    }
}

/// Sweep diffraction executor.
pub struct SweepDiffraction {
    coefficients: SweepCoefficients,
    boundary: BoundaryConditions,
    scratch: SweepScratch,
}

impl SweepDiffraction {
    pub const INFO: &'static str = "sweep_diffraction_r";

    pub fn new(beam: &BeamR) -> Result<Self, DiffractionError> {
        let rs = beam.rs.as_slice().ok_or(DiffractionError::NonContiguous)?;
        if rs.len() < 3 {
            return Err(DiffractionError::InvalidGrid(format!(
                "radial sweep needs n_r >= 3, got {}",
                rs.len()
            )));
        }
        if rs[1..].iter().any(|&r| r <= 0.0) {
            return Err(DiffractionError::InvalidGrid(
                "radial grid must be positive away from the axis".into(),
            ));
        }

        Ok(Self {
            coefficients: SweepCoefficients::new(rs, beam.dr, beam.medium.k_0, beam.charge),
            boundary: BoundaryConditions::default(),
            scratch: SweepScratch::new(rs.len()),
        })
    }

    pub fn coefficients(&self) -> &SweepCoefficients {
        &self.coefficients
    }

    pub fn boundary(&self) -> BoundaryConditions {
        self.boundary
    }

    /// Apply one diffraction step of length `dz` to the beam field.
    pub fn process(&mut self, beam: &mut BeamR, dz: f64) -> Result<(), DiffractionError> {
        if !dz.is_finite() || dz == 0.0 {
            return Err(DiffractionError::DegenerateStep(dz));
        }

        let n_r = self.coefficients.alpha.len();
        let mut field = beam.field_mut();
        if field.len() != n_r {
            return Err(DiffractionError::ShapeMismatch {
                expected: vec![n_r],
                actual: vec![field.len()],
            });
        }

        let field = field.as_slice_mut().ok_or(DiffractionError::NonContiguous)?;
        sweep(field, dz, &self.coefficients, &self.boundary, &mut self.scratch);
        Ok(())
    }
}

/// One implicit diffraction step on a radial field, in place.
///
/// `field`, the coefficient arrays and the scratch arrays must all have the
/// same length $n_r \geq 3$, and `dz` must be non-zero.
pub fn sweep(
    field: &mut [Complex64],
    dz: f64,
    coefficients: &SweepCoefficients,
    boundary: &BoundaryConditions,
    scratch: &mut SweepScratch,
) {
    let n_r = field.len();
    let SweepCoefficients {
        c1,
        c3,
        alpha,
        gamma,
        vx,
        ..
    } = coefficients;
    let SweepScratch {
        beta,
        delta,
        xi,
        eta,
    } = scratch;

    xi[1] = Complex64::from(boundary.kappa_left);
    eta[1] = Complex64::from(boundary.mu_left);

    let c3_dz = *c3 / dz;
    for i in 1..n_r - 1 {
        beta[i] = 2.0 * *c1 + c3_dz + vx[i];
        delta[i] = alpha[i] * field[i + 1] - (beta[i].conj() - vx[i]) * field[i]
            + gamma[i] * field[i - 1];

        let denominator = beta[i] - gamma[i] * xi[i];
        xi[i + 1] = alpha[i] / denominator;
        eta[i + 1] = (delta[i] + gamma[i] * eta[i]) / denominator;
    }

    field[n_r - 1] = (boundary.mu_right + boundary.kappa_right * eta[n_r - 1])
        / (1.0 - boundary.kappa_right * xi[n_r - 1]);

    for j in (1..n_r).rev() {
        field[j - 1] = xi[j] * field[j] + eta[j];
    }
}
