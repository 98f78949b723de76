//! Propagation runner: ties together medium, beam, executors and observer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use filament_compute::{logical_cpus, ComputeBackend, CpuBackend};
use filament_core::beam::{Beam, BeamR, BeamXy};
use filament_core::diffraction::DiffractionExecutor;
use filament_core::kerr::KerrExecutor;
use filament_core::propagation::{PropagationOutcome, Propagator};
use filament_media::{medium_by_name, Medium, MediumProvider, BUILTIN_MEDIA};

use crate::config::{BeamConfig, JobConfig, MediumConfig};
use crate::output::FileObserver;

/// Results of a propagation run.
pub struct RunOutput {
    pub outcome: PropagationOutcome,
    pub results_dir: PathBuf,
}

/// Resolve the medium of a beam section at its carrier wavelength.
pub fn resolve_medium(config: &MediumConfig) -> Result<Medium> {
    let provider = medium_by_name(&config.medium)?;
    Medium::new(provider.as_ref(), config.wavelength).with_context(|| {
        format!(
            "Medium '{}' at {:.1} nm",
            config.medium,
            config.wavelength * 1e9
        )
    })
}

/// Build the initial beam described by the config.
pub fn build_beam(config: &BeamConfig) -> Result<Beam> {
    let medium = resolve_medium(config.medium())?;
    let beam: Beam = match config {
        BeamConfig::R { params, .. } => BeamR::new(medium, params)?.into(),
        BeamConfig::Xy { params, .. } => BeamXy::new(medium, params)?.into(),
    };
    Ok(beam)
}

/// Run a full propagation from a parsed job configuration.
pub fn run_propagation(job: &JobConfig, output: Option<&Path>) -> Result<RunOutput> {
    let beam = build_beam(&job.beam)?;
    print_beam_summary(&beam);

    let propagation = &job.propagation;
    let params = propagation.to_params(beam.z_diff());

    let threads = propagation.threads.unwrap_or_else(logical_cpus);
    let backend: Arc<dyn ComputeBackend> = Arc::new(CpuBackend::with_workers(threads)?);
    println!("Backend: {}", backend.device_info().name);

    let mut propagator = Propagator::new(beam, params)?;
    if propagation.diffraction {
        let diffraction = DiffractionExecutor::for_beam(propagator.beam(), backend)?;
        println!("Diffraction: {}", diffraction.info());
        propagator = propagator.with_diffraction(diffraction);
    }
    if propagation.kerr {
        let kerr = KerrExecutor::new();
        println!("Kerr effect: {}", kerr.info());
        propagator = propagator.with_kerr(kerr);
    }

    let directory = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(&job.output.directory));
    let mut observer = FileObserver::new(&directory, &job.output.prefix, job.output.save_json);

    let outcome = propagator
        .propagate(&mut observer)
        .context("Propagation failed")?;

    Ok(RunOutput {
        outcome,
        results_dir: observer.results_dir().to_path_buf(),
    })
}

fn print_beam_summary(beam: &Beam) {
    let summary = beam.summary();
    let medium = beam.medium();
    println!(
        "Beam: {} {:?}, M = {}, m = {}",
        summary.info, summary.shape, summary.ring_order, summary.charge
    );
    println!(
        "Medium: {} at {:.1} nm (n_0 = {:.5}, n_2 = {:.3e} m^2/W)",
        medium.name,
        medium.lmbda * 1e9,
        medium.n_0,
        medium.n_2
    );
    println!(
        "P_0 / P_cr = {}, P_cr = {:.4e} W, i_0 = {:.4e} W/m^2, z_diff = {:.4e} m",
        summary.p_0_to_p_cr, summary.p_cr, summary.i_0, summary.z_diff
    );
}

/// Print the built-in media with their ranges and Kerr indices.
pub fn list_media() -> Result<()> {
    println!("Available media:");
    println!();
    for name in BUILTIN_MEDIA {
        let provider = medium_by_name(name)?;
        print_medium(provider.as_ref())?;
    }
    Ok(())
}

fn print_medium(provider: &dyn MediumProvider) -> Result<()> {
    let (min, max) = provider.wavelength_range();
    let n_2 = provider.nonlinear_index(0.5 * (min + max))?;
    println!(
        "  {:<6} {:.0}-{:.0} nm, n_2 = {:.2e} m^2/W",
        provider.name(),
        min * 1e9,
        max * 1e9,
        n_2
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    #[test]
    fn test_build_radial_beam_from_config() {
        let job = parse_config(
            r#"
            [beam]
            symmetry = "r"
            medium = "LiF"
            wavelength = 1800e-9
            n_r = 128
            "#,
        )
        .unwrap();
        let beam = build_beam(&job.beam).unwrap();
        assert_eq!(beam.info(), "beam_r");
        assert_eq!(beam.shape(), vec![128]);
        assert_eq!(beam.medium().name, "LiF");
    }

    #[test]
    fn test_unknown_medium_is_an_error() {
        let job = parse_config(
            r#"
            [beam]
            symmetry = "xy"
            medium = "Unobtainium"
            wavelength = 800e-9
            "#,
        )
        .unwrap();
        assert!(build_beam(&job.beam).is_err());
    }

    #[test]
    fn test_run_writes_results_tree() {
        let dir = std::env::temp_dir().join(format!("filament-cli-run-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let job = parse_config(
            r#"
            [beam]
            symmetry = "r"
            medium = "SiO2"
            wavelength = 1800e-9
            n_r = 64

            [propagation]
            n_z = 5
            plot_beam_every = 5
            print_current_state_every = 0
            threads = 1

            [output]
            prefix = "test"
            save_json = true
            "#,
        )
        .unwrap();

        let output = run_propagation(&job, Some(dir.as_path())).unwrap();
        assert_eq!(output.outcome.steps_taken, 5);
        assert!(output.results_dir.starts_with(&dir));

        let results = &output.results_dir;
        assert!(results.join("parameters.json").is_file());
        assert!(results.join("times.txt").is_file());
        assert!(results.join("track").join("track.csv").is_file());
        assert!(results.join("track").join("track.json").is_file());
        assert!(results.join("track").join("intensity_ratio.csv").is_file());
        assert!(results.join("beam").join("beam_0.csv").is_file());
        assert!(results.join("beam").join("beam_5.csv").is_file());

        let parameters = std::fs::read_to_string(results.join("parameters.json")).unwrap();
        let parameters: serde_json::Value = serde_json::from_str(&parameters).unwrap();
        assert_eq!(parameters["n_z"], 5);
        assert_eq!(parameters["diffraction"], "sweep_diffraction_r");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
