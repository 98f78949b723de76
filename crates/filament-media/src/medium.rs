//! A medium resolved at a single carrier wavelength.

use serde::{Deserialize, Serialize};

use crate::provider::{MediumError, MediumProvider};
use crate::sellmeier::SellmeierMedium;

/// Optical constants of a medium at the carrier wavelength.
///
/// This is the read-only view the propagation core works with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medium {
    /// Medium identifier.
    pub name: String,
    /// Carrier wavelength in vacuum (m).
    pub lmbda: f64,
    /// Linear refractive index.
    pub n_0: f64,
    /// Kerr index (m²/W).
    pub n_2: f64,
    /// Wavenumber in the medium, $k_0 = 2\pi n_0 / \lambda$ (1/m).
    pub k_0: f64,
}

impl Medium {
    /// Resolve a provider at wavelength `lmbda` (metres).
    pub fn new(provider: &dyn MediumProvider, lmbda: f64) -> Result<Self, MediumError> {
        let n_0 = provider.linear_index(lmbda)?;
        let n_2 = provider.nonlinear_index(lmbda)?;
        Ok(Self::from_constants(provider.name(), lmbda, n_0, n_2))
    }

    /// Build a medium from explicit constants.
    pub fn from_constants(name: impl Into<String>, lmbda: f64, n_0: f64, n_2: f64) -> Self {
        Self {
            name: name.into(),
            lmbda,
            n_0,
            n_2,
            k_0: 2.0 * std::f64::consts::PI * n_0 / lmbda,
        }
    }
}

/// Identifiers of the built-in media.
pub const BUILTIN_MEDIA: [&str; 3] = ["SiO2", "CaF2", "LiF"];

/// Look up a built-in medium by identifier (case-insensitive).
pub fn medium_by_name(name: &str) -> Result<Box<dyn MediumProvider>, MediumError> {
    let provider: Box<dyn MediumProvider> = match name.to_ascii_lowercase().as_str() {
        "sio2" => Box::new(SellmeierMedium::sio2()),
        "caf2" => Box::new(SellmeierMedium::caf2()),
        "lif" => Box::new(SellmeierMedium::lif()),
        _ => {
            return Err(MediumError::NotFound(format!(
                "'{}'. Valid identifiers: {}",
                name,
                BUILTIN_MEDIA.join(", ")
            )))
        }
    };
    Ok(provider)
}
