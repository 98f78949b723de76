//! TOML configuration deserialisation for propagation jobs.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use filament_core::beam::{BeamRParams, BeamXyParams};
use filament_core::types::{
    PropagationParams, StateColumn, DEFAULT_MAX_INTENSITY_TO_STOP, DEFAULT_NONLIN_PHASE_MAX,
};

/// Top-level job configuration.
#[derive(Debug, Deserialize)]
pub struct JobConfig {
    pub beam: BeamConfig,
    #[serde(default)]
    pub propagation: PropagationConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Beam section, tagged by symmetry (`symmetry = "r"` or `"xy"`).
#[derive(Debug, Deserialize)]
#[serde(tag = "symmetry", rename_all = "lowercase")]
pub enum BeamConfig {
    R {
        #[serde(flatten)]
        medium: MediumConfig,
        #[serde(flatten)]
        params: BeamRParams,
    },
    Xy {
        #[serde(flatten)]
        medium: MediumConfig,
        #[serde(flatten)]
        params: BeamXyParams,
    },
}

impl BeamConfig {
    pub fn medium(&self) -> &MediumConfig {
        match self {
            BeamConfig::R { medium, .. } | BeamConfig::Xy { medium, .. } => medium,
        }
    }
}

/// Medium and carrier wavelength of the beam.
#[derive(Debug, Deserialize)]
pub struct MediumConfig {
    /// Built-in medium name (e.g. "SiO2", "CaF2", "LiF").
    pub medium: String,
    /// Carrier wavelength in metres.
    pub wavelength: f64,
}

/// Propagation section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    pub n_z: usize,
    /// Initial step in metres. Takes precedence over `dz_0_to_z_diff`.
    pub dz_0: Option<f64>,
    /// Initial step as a fraction of the diffraction length.
    pub dz_0_to_z_diff: f64,
    pub const_dz: bool,
    /// Apply the diffraction sub-step.
    pub diffraction: bool,
    /// Apply the Kerr sub-step.
    pub kerr: bool,
    pub print_current_state_every: usize,
    pub plot_beam_every: usize,
    pub plot_track: bool,
    pub track_parameter: StateColumn,
    pub max_intensity_to_stop: f64,
    pub nonlin_phase_max: f64,
    /// FFT worker threads (default: logical CPU count).
    pub threads: Option<usize>,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            n_z: 1000,
            dz_0: None,
            dz_0_to_z_diff: 1e-3,
            const_dz: false,
            diffraction: true,
            kerr: true,
            print_current_state_every: 10,
            plot_beam_every: 0,
            plot_track: true,
            track_parameter: StateColumn::IntensityRatio,
            max_intensity_to_stop: DEFAULT_MAX_INTENSITY_TO_STOP,
            nonlin_phase_max: DEFAULT_NONLIN_PHASE_MAX,
            threads: None,
        }
    }
}

impl PropagationConfig {
    /// Resolve the loop parameters for a beam with diffraction length `z_diff`.
    pub fn to_params(&self, z_diff: f64) -> PropagationParams {
        PropagationParams {
            n_z: self.n_z,
            dz_0: self.dz_0.unwrap_or(self.dz_0_to_z_diff * z_diff),
            const_dz: self.const_dz,
            print_current_state_every: self.print_current_state_every,
            plot_beam_every: self.plot_beam_every,
            plot_track: self.plot_track,
            track_parameter: self.track_parameter,
            max_intensity_to_stop: self.max_intensity_to_stop,
            nonlin_phase_max: self.nonlin_phase_max,
        }
    }
}

/// Output configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Parent directory of the per-run results directory (default: "./results").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Prefix of the per-run results directory name (default: "filament").
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Whether to also save the track as JSON (default: false).
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            prefix: default_prefix(),
            save_json: false,
        }
    }
}

fn default_output_dir() -> String {
    "./results".into()
}
fn default_prefix() -> String {
    "filament".into()
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &std::path::Path) -> Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid config file '{}'", path.display()))
}

/// Parse and sanity-check a TOML job configuration.
pub fn parse_config(content: &str) -> Result<JobConfig> {
    let config: JobConfig = toml::from_str(content)?;

    if config.propagation.threads == Some(0) {
        bail!("propagation.threads must be at least 1");
    }
    if !config.propagation.diffraction && !config.propagation.kerr {
        bail!("at least one of propagation.diffraction and propagation.kerr must be enabled");
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radial_config_with_defaults() {
        let config = parse_config(
            r#"
            [beam]
            symmetry = "r"
            medium = "SiO2"
            wavelength = 1800e-9
            ring_order = 1
            charge = 1
            p_0_to_p_cr = 5
            n_r = 2048
            "#,
        )
        .unwrap();

        match &config.beam {
            BeamConfig::R { medium, params } => {
                assert_eq!(medium.medium, "SiO2");
                assert_eq!(medium.wavelength, 1800e-9);
                assert_eq!(params.ring_order, 1);
                assert_eq!(params.charge, 1);
                assert_eq!(params.p_0_to_p_cr, 5.0);
                assert_eq!(params.n_r, 2048);
                assert_eq!(params.r_0, BeamRParams::default().r_0);
            }
            other => panic!("expected a radial beam, got {:?}", other),
        }
        assert_eq!(config.propagation.n_z, 1000);
        assert!(config.propagation.kerr);
        assert_eq!(config.output.prefix, "filament");
    }

    #[test]
    fn test_cartesian_config_and_propagation_section() {
        let config = parse_config(
            r#"
            [beam]
            symmetry = "xy"
            medium = "CaF2"
            wavelength = 800e-9
            n_x = 256
            n_y = 128

            [propagation]
            n_z = 300
            dz_0 = 2e-5
            const_dz = true
            track_parameter = "intensity"
            threads = 2

            [output]
            directory = "/tmp/out"
            save_json = true
            "#,
        )
        .unwrap();

        match &config.beam {
            BeamConfig::Xy { params, .. } => {
                assert_eq!((params.n_x, params.n_y), (256, 128));
            }
            other => panic!("expected a Cartesian beam, got {:?}", other),
        }
        assert_eq!(config.beam.medium().medium, "CaF2");
        assert_eq!(config.propagation.threads, Some(2));
        assert_eq!(config.propagation.track_parameter, StateColumn::Intensity);

        let params = config.propagation.to_params(1.0);
        assert_eq!(params.n_z, 300);
        assert_eq!(params.dz_0, 2e-5);
        assert!(params.const_dz);
        assert!(config.output.save_json);
    }

    #[test]
    fn test_step_defaults_to_fraction_of_diffraction_length() {
        let propagation = PropagationConfig {
            dz_0_to_z_diff: 0.01,
            ..Default::default()
        };
        let params = propagation.to_params(0.5);
        assert_eq!(params.dz_0, 0.005);
    }

    #[test]
    fn test_unknown_symmetry_is_rejected() {
        let result = parse_config(
            r#"
            [beam]
            symmetry = "rt"
            medium = "SiO2"
            wavelength = 1800e-9
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_threads_is_rejected() {
        let result = parse_config(
            r#"
            [beam]
            symmetry = "r"
            medium = "SiO2"
            wavelength = 1800e-9

            [propagation]
            threads = 0
            "#,
        );
        assert!(result.is_err());
    }
}
