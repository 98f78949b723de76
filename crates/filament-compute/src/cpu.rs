//! CPU compute backend using Rayon for shared-memory parallelism.
//!
//! 2D transforms are applied as 1D FFTs over rows, then over columns. Columns
//! are gathered into a transposed scratch buffer so that every 1D transform
//! runs on a contiguous slice. Each 1D transform is computed by exactly one
//! worker, so results do not depend on the number of workers.

use std::sync::{Arc, Mutex};

use num_complex::Complex64;
use rayon::prelude::*;
use rustfft::{Fft, FftDirection, FftPlanner};

use crate::backend::{check_shape, ComputeBackend, ComputeError, DeviceInfo};

/// CPU backend that runs FFTs on a dedicated Rayon thread pool.
pub struct CpuBackend {
    workers: usize,
    pool: rayon::ThreadPool,
    planner: Mutex<FftPlanner<f64>>,
}

impl CpuBackend {
    /// Create a CPU backend using every logical CPU of the host.
    pub fn new() -> Result<Self, ComputeError> {
        Self::with_workers(logical_cpus())
    }

    /// Create a CPU backend with a specified worker count.
    pub fn with_workers(workers: usize) -> Result<Self, ComputeError> {
        if workers == 0 {
            return Err(ComputeError::Unavailable(
                "CPU backend needs at least one worker".into(),
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("filament-fft-{i}"))
            .build()
            .map_err(|e| ComputeError::Unavailable(e.to_string()))?;
        log::debug!("CPU FFT backend with {} workers", workers);

        Ok(Self {
            workers,
            pool,
            planner: Mutex::new(FftPlanner::new()),
        })
    }

    fn plans(
        &self,
        rows: usize,
        cols: usize,
        direction: FftDirection,
    ) -> Result<(Arc<dyn Fft<f64>>, Arc<dyn Fft<f64>>), ComputeError> {
        let mut planner = self
            .planner
            .lock()
            .map_err(|_| ComputeError::Unavailable("FFT planner lock poisoned".into()))?;
        let row_fft = planner.plan_fft(cols, direction);
        let col_fft = planner.plan_fft(rows, direction);
        Ok((row_fft, col_fft))
    }

    fn transform(
        &self,
        data: &mut [Complex64],
        rows: usize,
        cols: usize,
        direction: FftDirection,
    ) -> Result<(), ComputeError> {
        check_shape(data.len(), rows, cols)?;
        let (row_fft, col_fft) = self.plans(rows, cols, direction)?;
        let mut transposed = vec![Complex64::new(0.0, 0.0); data.len()];

        self.pool.install(|| {
            // 1) Rows
            data.par_chunks_mut(cols).for_each(|row| row_fft.process(row));

            // 2) Columns, via transpose: transposed[c * rows + r] = data[r * cols + c]
            {
                let data_ro: &[Complex64] = &*data;
                transposed
                    .par_chunks_mut(rows)
                    .enumerate()
                    .for_each(|(c, col)| {
                        for (r, v) in col.iter_mut().enumerate() {
                            *v = data_ro[r * cols + c];
                        }
                    });
            }
            transposed
                .par_chunks_mut(rows)
                .for_each(|col| col_fft.process(col));

            // 3) Transpose back
            let transposed_ro: &[Complex64] = &transposed;
            data.par_chunks_mut(cols).enumerate().for_each(|(r, row)| {
                for (c, v) in row.iter_mut().enumerate() {
                    *v = transposed_ro[c * rows + r];
                }
            });
        });

        Ok(())
    }
}

impl ComputeBackend for CpuBackend {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: format!("CPU ({} threads)", self.workers),
            workers: self.workers,
        }
    }

    fn fft2(&self, data: &mut [Complex64], rows: usize, cols: usize) -> Result<(), ComputeError> {
        self.transform(data, rows, cols, FftDirection::Forward)
    }

    fn ifft2(&self, data: &mut [Complex64], rows: usize, cols: usize) -> Result<(), ComputeError> {
        self.transform(data, rows, cols, FftDirection::Inverse)?;

        // rustfft is unnormalised
        let scale = 1.0 / (rows * cols) as f64;
        self.pool
            .install(|| data.par_iter_mut().for_each(|v| *v *= scale));
        Ok(())
    }
}

/// Number of logical CPUs on the host, falling back to one.
pub fn logical_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn sample_grid(rows: usize, cols: usize) -> Vec<Complex64> {
        (0..rows * cols)
            .map(|idx| {
                let r = (idx / cols) as f64;
                let c = (idx % cols) as f64;
                Complex64::new((0.3 * r).sin() + 0.1 * c, (0.7 * c).cos() - 0.05 * r * c)
            })
            .collect()
    }

    #[test]
    fn test_impulse_has_flat_spectrum() {
        let backend = CpuBackend::with_workers(2).unwrap();
        let (rows, cols) = (8, 6);
        let mut data = vec![Complex64::new(0.0, 0.0); rows * cols];
        data[0] = Complex64::new(1.0, 0.0);

        backend.fft2(&mut data, rows, cols).unwrap();

        for v in &data {
            assert_abs_diff_eq!(v.re, 1.0, epsilon = 1e-12);
            assert_abs_diff_eq!(v.im, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_plane_wave_lands_in_single_bin() {
        let backend = CpuBackend::with_workers(2).unwrap();
        let (rows, cols) = (16, 8);
        let (kr, kc) = (3usize, 5usize);
        let mut data: Vec<Complex64> = (0..rows * cols)
            .map(|idx| {
                let r = (idx / cols) as f64;
                let c = (idx % cols) as f64;
                let phase = 2.0 * PI * (r * kr as f64 / rows as f64 + c * kc as f64 / cols as f64);
                Complex64::new(0.0, phase).exp()
            })
            .collect();

        backend.fft2(&mut data, rows, cols).unwrap();

        for (idx, v) in data.iter().enumerate() {
            let expected = if idx == kr * cols + kc { (rows * cols) as f64 } else { 0.0 };
            assert_abs_diff_eq!(v.re, expected, epsilon = 1e-9);
            assert_abs_diff_eq!(v.im, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_inverse_undoes_forward() {
        let backend = CpuBackend::with_workers(3).unwrap();
        let (rows, cols) = (12, 10);
        let original = sample_grid(rows, cols);
        let mut data = original.clone();

        backend.fft2(&mut data, rows, cols).unwrap();
        backend.ifft2(&mut data, rows, cols).unwrap();

        for (a, b) in data.iter().zip(original.iter()) {
            assert!((a - b).norm() < 1e-12);
        }
    }

    #[test]
    fn test_result_is_independent_of_worker_count() {
        let (rows, cols) = (32, 24);
        let mut single = sample_grid(rows, cols);
        let mut many = single.clone();

        CpuBackend::with_workers(1).unwrap().fft2(&mut single, rows, cols).unwrap();
        CpuBackend::with_workers(4).unwrap().fft2(&mut many, rows, cols).unwrap();

        assert_eq!(single, many);
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let backend = CpuBackend::with_workers(1).unwrap();
        let mut data = vec![Complex64::new(1.0, 0.0); 10];
        let err = backend.fft2(&mut data, 3, 4).unwrap_err();
        assert!(matches!(err, ComputeError::ShapeMismatch { len: 10, rows: 3, cols: 4 }));
        assert_eq!(data[0], Complex64::new(1.0, 0.0));
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        assert!(CpuBackend::with_workers(0).is_err());
    }
}
