//! CPU compute backend using Rayon for shared-memory parallelism.

use rayon::prelude::*;
use rayon::ThreadPool;

use crate::backend::{BackendType, ComputeBackend, ComputeError, DeviceInfo};

/// CPU backend that parallelises work across threads via Rayon.
pub struct CpuBackend {
    num_threads: usize,
    /// Dedicated pool; `None` means the global Rayon pool.
    pool: Option<ThreadPool>,
}

impl CpuBackend {
    /// Create a new CPU backend on the global Rayon pool.
    pub fn new() -> Self {
        Self {
            num_threads: rayon::current_num_threads(),
            pool: None,
        }
    }

    /// Create a CPU backend with its own pool of `num_threads` workers.
    pub fn with_threads(num_threads: usize) -> Result<Self, ComputeError> {
        if num_threads == 0 {
            return Err(ComputeError::Unavailable(
                "CPU backend needs at least one thread".into(),
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| ComputeError::DeviceError(e.to_string()))?;
        Ok(Self {
            num_threads,
            pool: Some(pool),
        })
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for CpuBackend {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: format!("CPU ({} threads)", self.num_threads),
            backend_type: BackendType::Cpu,
            compute_units: Some(self.num_threads),
        }
    }

    fn parallel_map(
        &self,
        count: usize,
        task: &(dyn Fn(usize) -> f64 + Send + Sync),
    ) -> Result<Vec<f64>, ComputeError> {
        let run = || (0..count).into_par_iter().map(task).collect::<Vec<f64>>();
        Ok(match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SerialBackend;

    #[test]
    fn test_cpu_matches_serial_sum() {
        let task = |i: usize| ((i as f64) * 0.37).sin();
        let cpu = CpuBackend::with_threads(4).unwrap();
        let parallel = cpu.ordered_sum(10_000, &task).unwrap();
        let serial = SerialBackend.ordered_sum(10_000, &task).unwrap();
        // Same accumulation order, so the sums are bit-identical.
        assert_eq!(parallel, serial);
    }

    #[test]
    fn test_zero_threads_rejected() {
        assert!(matches!(
            CpuBackend::with_threads(0),
            Err(ComputeError::Unavailable(_))
        ));
    }

    #[test]
    fn test_device_info_reports_threads() {
        let cpu = CpuBackend::with_threads(2).unwrap();
        let info = cpu.device_info();
        assert_eq!(info.backend_type, BackendType::Cpu);
        assert_eq!(info.compute_units, Some(2));
    }
}
