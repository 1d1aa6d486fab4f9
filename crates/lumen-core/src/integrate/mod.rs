//! Luminous flux integrators.
//!
//! Total flux is the integral of intensity over the full sphere,
//!
//! $$\Phi = \int_0^{2\pi}\int_0^{\pi} I(\phi, \theta) \sin\theta \, d\theta \, d\phi.$$
//!
//! Two independent estimators are provided. Their disagreement, or a large
//! error against the manufacturer's rating, points at a parser or model
//! defect rather than a numerical one.
//!
//! The free functions ([`luminous_power_mc`], [`luminous_power_trapz`]) run
//! on the calling thread; the [`FluxIntegrator`] implementations distribute
//! the same work over a [`ComputeBackend`](lumen_compute::ComputeBackend).

pub mod monte_carlo;
pub mod quadrature;

use lumen_compute::ComputeError;
use rand::Rng;
use thiserror::Error;

use crate::edf::Edf;

pub use monte_carlo::{luminous_power_mc, MonteCarloIntegrator};
pub use quadrature::{luminous_power_trapz, QuadratureIntegrator};

/// Errors that can occur while integrating flux.
#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("Sample count must be positive")]
    NoSamples,

    #[error("Compute backend error: {0}")]
    Compute(#[from] ComputeError),
}

/// A method for estimating total luminous flux from an EDF.
pub trait FluxIntegrator {
    /// Estimate the total flux in lumens (relative to the file's candela scale).
    fn luminous_power(&self, edf: &Edf) -> Result<f64, IntegrationError>;

    /// Human-readable name of the integration method.
    fn method_name(&self) -> &str;
}

impl Edf {
    /// Stochastic flux estimate from `sample_count` uniform directions drawn
    /// from `rng`.
    pub fn luminous_power_mc<R: Rng + ?Sized>(&self, sample_count: usize, rng: &mut R) -> f64 {
        luminous_power_mc(self, sample_count, rng)
    }

    /// Deterministic flux estimate on a uniform grid of roughly
    /// `sample_count` patches, or on the file's own grid when `None` or zero.
    pub fn luminous_power_trapz(&self, sample_count: Option<usize>) -> f64 {
        luminous_power_trapz(self, sample_count)
    }
}
