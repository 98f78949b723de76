//! # Filament Media
//!
//! Optical media for the Filament framework. All media implement the
//! [`MediumProvider`](provider::MediumProvider) trait, which provides the
//! wavelength-dependent linear index and the Kerr index. A provider resolved
//! at the carrier wavelength becomes a [`Medium`](medium::Medium), the
//! read-only set of constants (`k_0`, `n_0`, `n_2`) used by the propagation
//! core.
//!
//! ## Available data sources
//!
//! | Source | Module | Media |
//! |--------|--------|-------|
//! | Sellmeier fits | [`sellmeier`] | SiO2, CaF2, LiF |

pub mod medium;
pub mod provider;
pub mod sellmeier;

pub use medium::{medium_by_name, Medium, BUILTIN_MEDIA};
pub use provider::{MediumError, MediumProvider};
pub use sellmeier::SellmeierMedium;
