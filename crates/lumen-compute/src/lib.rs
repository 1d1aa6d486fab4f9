//! # Lumen Compute
//!
//! Compute backend abstraction for the Lumen framework. This crate
//! provides a [`ComputeBackend`](backend::ComputeBackend) trait that isolates
//! the photometric integrators from how their independent work items are
//! scheduled.
//!
//! ## Available backends
//!
//! | Backend | Feature flag | Status |
//! |---------|-------------|--------|
//! | Serial | always | Implemented |
//! | CPU (Rayon) | `cpu` (default) | Implemented |

pub mod backend;

#[cfg(feature = "cpu")]
pub mod cpu;

pub use backend::{BackendType, ComputeBackend, ComputeError, DeviceInfo, SerialBackend};

#[cfg(feature = "cpu")]
pub use cpu::CpuBackend;
