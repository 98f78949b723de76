//! # Filament Compute
//!
//! Compute backend abstraction for the Filament framework. This crate
//! provides a [`ComputeBackend`](backend::ComputeBackend) trait that isolates
//! the diffraction code from thread pools and FFT planning.
//!
//! ## Available backends
//!
//! | Backend | Status |
//! |---------|--------|
//! | CPU (Rayon + rustfft) | Implemented |

pub mod backend;
pub mod cpu;

pub use backend::{ComputeBackend, ComputeError, DeviceInfo};
pub use cpu::{logical_cpus, CpuBackend};
