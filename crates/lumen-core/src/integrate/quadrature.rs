//! Deterministic patch quadrature.
//!
//! The sphere is cut into rectangular $(\phi, \theta)$ patches, each sampled
//! once at its centre and weighted by its approximate solid angle
//! $\Delta\phi\,\Delta\theta\,\sin\theta_c$. Either a uniform grid of a
//! requested size or the file's own angular grid is used.

use std::f64::consts::{PI, TAU};
use std::sync::Arc;

use lumen_compute::{ComputeBackend, SerialBackend};

use super::{FluxIntegrator, IntegrationError};
use crate::edf::Edf;
use crate::symmetry::HorizontalSymmetry;

/// Uniform grid shape for a target patch count: an even number of azimuth
/// columns, about twice the number of zenith rows.
fn uniform_grid(sample_count: usize) -> (usize, usize) {
    let columns = (2 * (sample_count as f64 / 2.0).sqrt() as usize).max(1);
    let rows = (sample_count / columns).max(1);
    (columns, rows)
}

/// Flux through one azimuth column of the uniform grid.
fn uniform_column(edf: &Edf, column: usize, columns: usize, rows: usize) -> f64 {
    let dh = TAU / columns as f64;
    let dv = PI / rows as f64;
    let phi = dh * column as f64 + dh / 2.0;
    (0..rows)
        .map(|row| {
            let theta = dv * row as f64 + dv / 2.0;
            dh * dv * theta.sin() * edf.sample(phi, theta)
        })
        .sum()
}

/// Flux through the patches between stored planes `column` and `column + 1`.
fn native_column(edf: &Edf, column: usize) -> f64 {
    let horz = edf.horz_angles();
    let vert = edf.vert_angles();
    let dh = horz[column + 1] - horz[column];
    let phi = horz[column] + dh / 2.0;
    vert.windows(2)
        .map(|pair| {
            let dv = pair[1] - pair[0];
            let theta = pair[0] + dv / 2.0;
            dh * dv * theta.sin() * edf.sample(phi, theta)
        })
        .sum()
}

/// Flux of full-circle latitude bands through a single-row (cylindrical) web.
fn cylindrical_bands(edf: &Edf) -> f64 {
    edf.vert_angles()
        .windows(2)
        .map(|pair| {
            let dv = pair[1] - pair[0];
            let theta = pair[0] + dv / 2.0;
            // Linear in θ, so the centre sample is the mean of the band edges.
            TAU * dv * theta.sin() * edf.sample(0.0, theta)
        })
        .sum()
}

/// Expand the integral over the stored span to the full sphere.
fn complete_native(edf: &Edf, stored: f64) -> f64 {
    match edf.horz_symmetry() {
        HorizontalSymmetry::Cylindrical => stored + cylindrical_bands(edf),
        // A lone plane at a non-zero azimuth is still sampled as a solid of revolution.
        _ if edf.horz_angles().len() == 1 => cylindrical_bands(edf),
        symmetry => stored * symmetry.coverage_factor(),
    }
}

/// Requested uniform patch count; zero falls back to the native grid.
fn uniform_target(sample_count: Option<usize>) -> Option<usize> {
    sample_count.filter(|&n| n > 0)
}

/// Patch quadrature on the calling thread.
///
/// With `Some(n)`, integrates a uniform grid of about `n` patches. With
/// `None` or `Some(0)`, integrates the file's own angular grid and scales by
/// the horizontal symmetry.
pub fn luminous_power_trapz(edf: &Edf, sample_count: Option<usize>) -> f64 {
    match uniform_target(sample_count) {
        Some(n) => {
            let (columns, rows) = uniform_grid(n);
            (0..columns)
                .map(|c| uniform_column(edf, c, columns, rows))
                .sum()
        }
        None => {
            let columns = edf.horz_angles().len() - 1;
            let stored = (0..columns).map(|c| native_column(edf, c)).sum();
            complete_native(edf, stored)
        }
    }
}

/// Patch quadrature distributed by azimuth column over a compute backend.
pub struct QuadratureIntegrator {
    pub backend: Arc<dyn ComputeBackend>,
    /// Target patch count, or `None` (or zero) for the file's own grid.
    pub samples: Option<usize>,
}

impl QuadratureIntegrator {
    pub fn new(samples: Option<usize>) -> Self {
        Self {
            samples,
            ..Default::default()
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn ComputeBackend>) -> Self {
        self.backend = backend;
        self
    }
}

impl Default for QuadratureIntegrator {
    fn default() -> Self {
        Self {
            backend: Arc::new(SerialBackend),
            samples: None,
        }
    }
}

impl FluxIntegrator for QuadratureIntegrator {
    fn luminous_power(&self, edf: &Edf) -> Result<f64, IntegrationError> {
        match uniform_target(self.samples) {
            Some(n) => {
                let (columns, rows) = uniform_grid(n);
                Ok(self
                    .backend
                    .ordered_sum(columns, &|c| uniform_column(edf, c, columns, rows))?)
            }
            None => {
                let columns = edf.horz_angles().len() - 1;
                let stored = self
                    .backend
                    .ordered_sum(columns, &|c| native_column(edf, c))?;
                Ok(complete_native(edf, stored))
            }
        }
    }

    fn method_name(&self) -> &str {
        match uniform_target(self.samples) {
            Some(_) => "uniform-grid quadrature",
            None => "native-grid quadrature",
        }
    }
}
