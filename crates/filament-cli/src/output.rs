//! Results directory layout and file writers.
//!
//! ```text
//! <directory>/<prefix>_<unix seconds>/
//!     parameters.json
//!     times.txt
//!     track/track.csv
//!     track/track.json           (save_json)
//!     track/<column>.csv         (plot_track)
//!     beam/beam_<n_step>.csv     (plot_beam_every)
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use filament_core::beam::Beam;
use filament_core::propagation::{
    format_state, HookError, PropagationObserver, StateHistory, Timings,
};
use filament_core::types::{RunParameters, StateColumn};

/// Observer that persists a run to a results directory.
pub struct FileObserver {
    results_dir: PathBuf,
    save_json: bool,
}

impl FileObserver {
    /// Results go to `<directory>/<prefix>_<unix seconds>`; nothing is
    /// created until the run starts.
    pub fn new(directory: &Path, prefix: &str, save_json: bool) -> Self {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self::at(directory.join(format!("{}_{}", prefix, stamp)), save_json)
    }

    /// Results go to exactly `results_dir`.
    pub fn at(results_dir: PathBuf, save_json: bool) -> Self {
        Self {
            results_dir,
            save_json,
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    pub fn track_dir(&self) -> PathBuf {
        self.results_dir.join("track")
    }

    pub fn beam_dir(&self) -> PathBuf {
        self.results_dir.join("beam")
    }
}

impl PropagationObserver for FileObserver {
    fn on_start(&mut self, params: &RunParameters) -> Result<(), HookError> {
        fs::create_dir_all(self.track_dir())?;
        fs::create_dir_all(self.beam_dir())?;

        let json = serde_json::to_string_pretty(params)
            .map_err(|e| HookError::Serialize(e.to_string()))?;
        fs::write(self.results_dir.join("parameters.json"), json)?;

        println!("Results directory: {}", self.results_dir.display());
        Ok(())
    }

    fn on_print_state(&mut self, n_step: usize, history: &StateHistory) -> Result<(), HookError> {
        if let Some(row) = history.row(n_step) {
            println!("{}", format_state(n_step, &row));
        }
        Ok(())
    }

    fn on_beam(&mut self, n_step: usize, z: f64, beam: &Beam) -> Result<(), HookError> {
        let path = self.beam_dir().join(format!("beam_{}.csv", n_step));
        write_beam_csv(beam, n_step, z, &path)?;
        Ok(())
    }

    fn on_track(&mut self, history: &StateHistory) -> Result<(), HookError> {
        write_track_csv(history, &self.track_dir().join("track.csv"))?;
        if self.save_json {
            let rows: Vec<_> = history.rows().collect();
            let json = serde_json::to_string_pretty(&rows)
                .map_err(|e| HookError::Serialize(e.to_string()))?;
            fs::write(self.track_dir().join("track.json"), json)?;
        }
        Ok(())
    }

    fn on_track_plot(&mut self, history: &StateHistory, column: StateColumn) -> Result<(), HookError> {
        let path = self.track_dir().join(format!("{}.csv", column.key()));
        write_column_csv(history, column, &path)?;
        Ok(())
    }

    fn on_timings(&mut self, timings: &Timings) -> Result<(), HookError> {
        let report = timings.report();
        fs::write(self.results_dir.join("times.txt"), &report)?;
        log::info!("Timings:\n{}", report);
        Ok(())
    }
}

/// Write the full history with a metadata header.
pub fn write_track_csv(history: &StateHistory, path: &Path) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    writeln!(file, "# Filament propagation track")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(file, "# Rows: {}", history.n_rows())?;
    writeln!(file, "#")?;
    let labels = StateHistory::labels();
    writeln!(file, "n_step,{}", labels.map(|l| format!("\"{}\"", l)).join(","))?;

    for (n, row) in history.rows().enumerate() {
        writeln!(
            file,
            "{},{:.10e},{:.10e},{:.10e},{:.10e}",
            n, row.z, row.dz, row.i_max_to_i_0, row.i_max
        )?;
    }
    file.flush()
}

/// Write one history column as an `(n_step, value)` series.
pub fn write_column_csv(history: &StateHistory, column: StateColumn, path: &Path) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "n_step,\"{}\"", column.label())?;
    for (n, value) in history.column(column).iter().enumerate() {
        writeln!(file, "{},{:.10e}", n, value)?;
    }
    file.flush()
}

/// Write an intensity snapshot `|E|^2` (in units of `i_0`).
///
/// Radial beams give the full profile against `r`; Cartesian beams give the
/// profiles through the grid centre along `x` and along `y`.
pub fn write_beam_csv(beam: &Beam, n_step: usize, z: f64, path: &Path) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "# {} at n_step = {}, z = {:.6e} m", beam.info(), n_step, z)?;
    writeln!(file, "# i_0 = {:.6e} W/m^2", beam.i_0())?;

    match beam {
        Beam::R(b) => {
            writeln!(file, "r_m,intensity")?;
            for (r, i) in b.rs.iter().zip(b.intensity().iter()) {
                writeln!(file, "{:.6e},{:.6e}", r, i)?;
            }
        }
        Beam::Xy(b) => {
            let intensity = b.intensity();
            writeln!(file, "axis,coordinate_m,intensity")?;
            let centre_y = b.n_y / 2;
            for (i, x) in b.xs.iter().enumerate() {
                writeln!(file, "x,{:.6e},{:.6e}", x, intensity[[i, centre_y]])?;
            }
            let centre_x = b.n_x / 2;
            for (j, y) in b.ys.iter().enumerate() {
                writeln!(file, "y,{:.6e},{:.6e}", y, intensity[[centre_x, j]])?;
            }
        }
    }
    file.flush()
}
