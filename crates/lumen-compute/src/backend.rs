//! Compute backend trait and device abstraction.
//!
//! The [`ComputeBackend`] trait abstracts over execution strategies so that
//! the integrators in `lumen-core` stay scheduling-agnostic. Work is always
//! expressed as `count` independent tasks whose results come back in index
//! order, which keeps reductions reproducible across backends.

use thiserror::Error;

/// Errors originating from compute backends.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Backend not available: {0}")]
    Unavailable(String),

    #[error("Device error: {0}")]
    DeviceError(String),
}

/// Describes the capabilities of a compute backend.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub backend_type: BackendType,
    pub compute_units: Option<usize>,
}

/// The type of compute backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Serial,
    Cpu,
}

/// Abstraction over compute backends.
pub trait ComputeBackend: Send + Sync {
    /// Return information about the device.
    fn device_info(&self) -> DeviceInfo;

    /// Evaluate `task(i)` for every `i` in `0..count`.
    ///
    /// The returned vector is indexed by task, regardless of the order in
    /// which the backend executed the tasks.
    fn parallel_map(
        &self,
        count: usize,
        task: &(dyn Fn(usize) -> f64 + Send + Sync),
    ) -> Result<Vec<f64>, ComputeError>;

    /// Sum `task(i)` over `0..count`.
    ///
    /// Partial results are accumulated in index order so the floating-point
    /// result does not depend on thread scheduling.
    fn ordered_sum(
        &self,
        count: usize,
        task: &(dyn Fn(usize) -> f64 + Send + Sync),
    ) -> Result<f64, ComputeError> {
        Ok(self.parallel_map(count, task)?.iter().sum())
    }
}

/// Single-threaded backend that runs every task on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialBackend;

impl ComputeBackend for SerialBackend {
    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            name: "Serial".into(),
            backend_type: BackendType::Serial,
            compute_units: Some(1),
        }
    }

    fn parallel_map(
        &self,
        count: usize,
        task: &(dyn Fn(usize) -> f64 + Send + Sync),
    ) -> Result<Vec<f64>, ComputeError> {
        Ok((0..count).map(task).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_map_preserves_order() {
        let values = SerialBackend.parallel_map(5, &|i| i as f64 * 2.0).unwrap();
        assert_eq!(values, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_serial_ordered_sum() {
        let total = SerialBackend.ordered_sum(101, &|i| i as f64).unwrap();
        assert_eq!(total, 5050.0);
        assert_eq!(SerialBackend.ordered_sum(0, &|_| 1.0).unwrap(), 0.0);
    }
}
