//! Stochastic flux estimation.
//!
//! Directions are drawn uniformly in $(\phi, \theta) \in [0, 2\pi) \times [0, \pi)$
//! and weighted by $\sin\theta$, so the estimator is
//! $\Phi \approx \frac{2\pi^2}{N} \sum_k I(\phi_k, \theta_k) \sin\theta_k$.

use std::f64::consts::{PI, TAU};
use std::sync::Arc;

use lumen_compute::{ComputeBackend, SerialBackend};
use rand::Rng;
use rand_pcg::Pcg64;

use super::{FluxIntegrator, IntegrationError};
use crate::edf::Edf;

/// Samples drawn per independent random stream.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Monte Carlo flux estimate on the calling thread.
///
/// Returns `0.0` when `sample_count` is zero.
pub fn luminous_power_mc<R: Rng + ?Sized>(edf: &Edf, sample_count: usize, rng: &mut R) -> f64 {
    if sample_count == 0 {
        return 0.0;
    }
    weighted_sum(edf, sample_count, rng) * measure(sample_count)
}

/// Σ I(φ, θ)·sin θ over `count` uniform draws.
fn weighted_sum<R: Rng + ?Sized>(edf: &Edf, count: usize, rng: &mut R) -> f64 {
    let mut acc = 0.0;
    for _ in 0..count {
        let phi = rng.gen_range(0.0..TAU);
        let theta = rng.gen_range(0.0..PI);
        acc += edf.sample(phi, theta) * theta.sin();
    }
    acc
}

/// Sphere measure in (φ, θ) space divided by the sample count.
fn measure(sample_count: usize) -> f64 {
    2.0 * PI * PI / sample_count as f64
}

/// Monte Carlo integrator that splits its budget into independently seeded
/// chunks.
///
/// Chunk `c` draws from a PCG stream selected by `c` under the shared seed,
/// and partial sums are reduced in chunk order, so a given seed yields the
/// same estimate on every backend.
pub struct MonteCarloIntegrator {
    pub backend: Arc<dyn ComputeBackend>,
    pub samples: usize,
    pub seed: u64,
    pub chunk_size: usize,
}

impl MonteCarloIntegrator {
    pub fn new(samples: usize, seed: u64) -> Self {
        Self {
            samples,
            seed,
            ..Default::default()
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn ComputeBackend>) -> Self {
        self.backend = backend;
        self
    }

    fn chunk_rng(&self, chunk: usize) -> Pcg64 {
        Pcg64::new(u128::from(self.seed), chunk as u128)
    }
}

impl Default for MonteCarloIntegrator {
    fn default() -> Self {
        Self {
            backend: Arc::new(SerialBackend),
            samples: 100_000,
            seed: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl FluxIntegrator for MonteCarloIntegrator {
    fn luminous_power(&self, edf: &Edf) -> Result<f64, IntegrationError> {
        if self.samples == 0 {
            return Err(IntegrationError::NoSamples);
        }
        let chunk_size = self.chunk_size.max(1);
        let chunks = self.samples.div_ceil(chunk_size);

        let total = self.backend.ordered_sum(chunks, &|chunk| {
            let start = chunk * chunk_size;
            let count = chunk_size.min(self.samples - start);
            weighted_sum(edf, count, &mut self.chunk_rng(chunk))
        })?;

        log::debug!(
            "Monte Carlo: {} samples in {} chunks on {}",
            self.samples,
            chunks,
            self.backend.device_info().name
        );
        Ok(total * measure(self.samples))
    }

    fn method_name(&self) -> &str {
        "Monte Carlo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edf::tests::parts_with;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    fn isotropic(candela: f64) -> Edf {
        Edf::from_parts(parts_with(&[0.0], &[0.0, 180.0], |_, _| candela)).unwrap()
    }

    #[test]
    fn test_isotropic_source_recovers_four_pi() {
        let edf = isotropic(100.0);
        let mut rng = Pcg64::seed_from_u64(7);
        let flux = luminous_power_mc(&edf, 200_000, &mut rng);
        assert_relative_eq!(flux, 400.0 * PI, max_relative = 0.01);
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let edf = isotropic(10.0);
        let a = edf.luminous_power_mc(1000, &mut Pcg64::seed_from_u64(3));
        let b = edf.luminous_power_mc(1000, &mut Pcg64::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_samples() {
        let edf = isotropic(10.0);
        assert_eq!(luminous_power_mc(&edf, 0, &mut Pcg64::seed_from_u64(0)), 0.0);
        let integrator = MonteCarloIntegrator::new(0, 1);
        assert!(matches!(
            integrator.luminous_power(&edf),
            Err(IntegrationError::NoSamples)
        ));
    }

    #[test]
    fn test_chunked_integrator_handles_partial_chunk() {
        let edf = isotropic(50.0);
        let integrator = MonteCarloIntegrator {
            chunk_size: 1000,
            ..MonteCarloIntegrator::new(25_500, 11)
        };
        let flux = integrator.luminous_power(&edf).unwrap();
        assert_relative_eq!(flux, 200.0 * PI, max_relative = 0.03);
        assert_eq!(flux, integrator.luminous_power(&edf).unwrap());
    }
}
