//! Sellmeier dispersion for transparent crystals and glasses.
//!
//! The linear index follows the three-term Sellmeier equation
//!
//! $$ n^2(\lambda) = 1 + \sum_{i=1}^{3} \frac{B_i \lambda^2}{\lambda^2 - C_i} $$
//!
//! with $\lambda$ in micrometres and $C_i$ in µm². The Kerr index is taken
//! as constant over the transparency window.
//!
//! ## Available media
//!
//! | Identifier | Constructor | Dispersion source |
//! |-----------|-------------|-------------------|
//! | `SiO2` | [`SellmeierMedium::sio2()`] | Malitson (1965) |
//! | `CaF2` | [`SellmeierMedium::caf2()`] | Malitson (1963) |
//! | `LiF`  | [`SellmeierMedium::lif()`]  | Li (1976) |

use crate::provider::{MediumError, MediumProvider};

/// Medium described by Sellmeier coefficients and a constant Kerr index.
#[derive(Debug, Clone)]
pub struct SellmeierMedium {
    name: String,
    b: [f64; 3],
    c_um2: [f64; 3],
    n_2: f64,
    range_m: (f64, f64),
}

impl SellmeierMedium {
    /// Construct from Sellmeier coefficients.
    ///
    /// # Arguments
    /// * `name` - Medium identifier.
    /// * `b` - Oscillator strengths $B_i$.
    /// * `c_um2` - Resonance terms $C_i$ in µm².
    /// * `n_2` - Kerr index in m²/W.
    /// * `range_m` - Valid wavelength range in metres.
    pub fn new(
        name: impl Into<String>,
        b: [f64; 3],
        c_um2: [f64; 3],
        n_2: f64,
        range_m: (f64, f64),
    ) -> Self {
        Self {
            name: name.into(),
            b,
            c_um2,
            n_2,
            range_m,
        }
    }

    /// Fused silica.
    pub fn sio2() -> Self {
        Self::new(
            "SiO2",
            [0.696_166_3, 0.407_942_6, 0.897_479_4],
            [0.068_404_3_f64.powi(2), 0.116_241_4_f64.powi(2), 9.896_161_f64.powi(2)],
            2.2e-20,
            (0.21e-6, 6.7e-6),
        )
    }

    /// Calcium fluoride.
    pub fn caf2() -> Self {
        Self::new(
            "CaF2",
            [0.567_588_8, 0.471_091_4, 3.848_472_3],
            [0.050_263_605_f64.powi(2), 0.100_390_9_f64.powi(2), 34.649_040_f64.powi(2)],
            1.9e-20,
            (0.23e-6, 9.7e-6),
        )
    }

    /// Lithium fluoride.
    pub fn lif() -> Self {
        Self::new(
            "LiF",
            [0.925_49, 6.967_47, 0.0],
            [0.073_76_f64.powi(2), 32.79_f64.powi(2), 0.0],
            1.0e-20,
            (0.1e-6, 10.0e-6),
        )
    }
}

impl MediumProvider for SellmeierMedium {
    fn name(&self) -> &str {
        &self.name
    }

    fn wavelength_range(&self) -> (f64, f64) {
        self.range_m
    }

    fn linear_index(&self, wavelength_m: f64) -> Result<f64, MediumError> {
        self.check_range(wavelength_m)?;

        let l2 = (wavelength_m * 1e6).powi(2);
        let n_sq = 1.0
            + self
                .b
                .iter()
                .zip(self.c_um2.iter())
                .map(|(b, c)| b * l2 / (l2 - c))
                .sum::<f64>();
        if n_sq <= 1.0 {
            return Err(MediumError::DataError(format!(
                "{}: non-physical index n^2 = {} at {:e} m",
                self.name, n_sq, wavelength_m
            )));
        }
        Ok(n_sq.sqrt())
    }

    fn nonlinear_index(&self, wavelength_m: f64) -> Result<f64, MediumError> {
        self.check_range(wavelength_m)?;
        Ok(self.n_2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_fused_silica_index() {
        let sio2 = SellmeierMedium::sio2();
        // Well-known reference values for fused silica
        assert_abs_diff_eq!(sio2.linear_index(0.5876e-6).unwrap(), 1.4585, epsilon = 1e-3);
        assert_abs_diff_eq!(sio2.linear_index(1.8e-6).unwrap(), 1.4409, epsilon = 1e-3);
    }

    #[test]
    fn test_caf2_index() {
        let caf2 = SellmeierMedium::caf2();
        assert_abs_diff_eq!(caf2.linear_index(0.5876e-6).unwrap(), 1.4338, epsilon = 1e-3);
    }

    #[test]
    fn test_lif_is_low_index() {
        let lif = SellmeierMedium::lif();
        let n = lif.linear_index(1.8e-6).unwrap();
        assert!(n > 1.37 && n < 1.40, "LiF n0 at 1.8 um = {}", n);
    }

    #[test]
    fn test_normal_dispersion_in_visible() {
        let sio2 = SellmeierMedium::sio2();
        let n_blue = sio2.linear_index(0.45e-6).unwrap();
        let n_red = sio2.linear_index(0.65e-6).unwrap();
        assert!(n_blue > n_red);
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let sio2 = SellmeierMedium::sio2();
        let err = sio2.linear_index(10.0e-6).unwrap_err();
        assert!(matches!(err, MediumError::OutOfRange { .. }));
        assert!(sio2.nonlinear_index(0.1e-6).is_err());
    }
}
