//! Filament command-line interface.
//!
//! Run beam propagations from TOML configuration files:
//! ```sh
//! filament run job.toml
//! filament validate job.toml
//! filament media
//! ```

mod config;
mod output;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "filament")]
#[command(about = "Filament: split-step propagation of laser beams in Kerr media")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a propagation from a TOML configuration file.
    Run {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Parent output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file and build the beam without propagating.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// Display information about available media.
    Media,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            println!("Filament beam propagation");
            println!("=========================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let result = runner::run_propagation(&job, output.as_deref())?;

            let outcome = result.outcome;
            if outcome.stopped_early {
                println!(
                    "Stopped at step {} (z = {:.4e} m): peak intensity above threshold.",
                    outcome.steps_taken, outcome.final_z
                );
            } else {
                println!(
                    "Completed {} steps (z = {:.4e} m, dz = {:.4e} m).",
                    outcome.steps_taken, outcome.final_z, outcome.final_dz
                );
            }
            println!("Results written to: {}", result.results_dir.display());
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            let beam = runner::build_beam(&job.beam)?;
            let params = job.propagation.to_params(beam.z_diff());
            filament_core::propagation::Propagator::new(beam, params)?;
            println!("Configuration is valid: {}", config.display());
            Ok(())
        }
        Commands::Media => runner::list_media(),
    }
}
