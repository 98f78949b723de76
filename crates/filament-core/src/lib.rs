//! # Filament Core
//!
//! The numerical backbone of the Filament framework. This crate propagates a
//! laser beam through a Kerr medium by integrating the paraxial wave equation
//! with a split-step scheme: linear diffraction and nonlinear self-focusing
//! are applied alternately over adaptive steps along `z`.
//!
//! ## Architecture
//!
//! A [`beam::Beam`] owns the transverse field. The
//! [`diffraction::DiffractionExecutor`] picks the scheme from the beam
//! symmetry (Fourier for Cartesian beams, a tridiagonal sweep for radial
//! beams) and the [`kerr::KerrExecutor`] applies the intensity-dependent
//! phase. [`propagation::Propagator`] drives both, records the state
//! history and reports to a [`propagation::PropagationObserver`].
//!
//! ## Modules
//!
//! - [`beam`]: Radial and Cartesian beams, critical power, beam profiles.
//! - [`diffraction`]: Fourier and sweep diffraction executors.
//! - [`kerr`]: Kerr phase sub-step.
//! - [`propagation`]: Propagation loop, state history, observers, timings.
//! - [`types`]: Run parameters and history columns.

pub mod beam;
pub mod diffraction;
pub mod kerr;
pub mod propagation;
pub mod types;
