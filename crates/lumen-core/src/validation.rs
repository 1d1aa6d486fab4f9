//! Cross-validation of the flux integrators.
//!
//! A correctly parsed web integrates to the same flux under both methods,
//! and to the manufacturer's declared rating within measurement tolerance.

use serde::Serialize;

use crate::edf::Edf;
use crate::integrate::{FluxIntegrator, IntegrationError};

/// Relative error bound that well-formed reference files stay within.
pub const DEFAULT_TOLERANCE: f64 = 0.03;

/// Outcome of running both integrators on one EDF.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Stochastic estimate (lm).
    pub monte_carlo_lm: f64,
    /// Quadrature estimate (lm).
    pub quadrature_lm: f64,
    /// Manufacturer's rating (lm), if known.
    pub declared_lm: Option<f64>,
    /// Relative difference of the Monte Carlo estimate from the quadrature one.
    pub agreement: f64,
    /// Relative error of the Monte Carlo estimate against the rating.
    pub monte_carlo_error: Option<f64>,
    /// Relative error of the quadrature estimate against the rating.
    pub quadrature_error: Option<f64>,
    pub tolerance: f64,
    pub passed: bool,
}

/// `(value - reference) / reference`, infinite when only the reference is zero.
pub fn relative_error(value: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        if value == 0.0 {
            0.0
        } else {
            f64::INFINITY
        }
    } else {
        (value - reference) / reference
    }
}

/// Run both integrators and judge them against each other and `declared_lm`.
pub fn cross_validate(
    edf: &Edf,
    monte_carlo: &dyn FluxIntegrator,
    quadrature: &dyn FluxIntegrator,
    declared_lm: Option<f64>,
    tolerance: f64,
) -> Result<ValidationReport, IntegrationError> {
    let monte_carlo_lm = monte_carlo.luminous_power(edf)?;
    let quadrature_lm = quadrature.luminous_power(edf)?;

    let agreement = relative_error(monte_carlo_lm, quadrature_lm);
    let monte_carlo_error = declared_lm.map(|d| relative_error(monte_carlo_lm, d));
    let quadrature_error = declared_lm.map(|d| relative_error(quadrature_lm, d));

    let within = |e: f64| e.abs() <= tolerance;
    let passed = within(agreement)
        && monte_carlo_error.map_or(true, within)
        && quadrature_error.map_or(true, within);

    log::debug!(
        "{} {:.6} lm vs {} {:.6} lm (declared {:?})",
        monte_carlo.method_name(),
        monte_carlo_lm,
        quadrature.method_name(),
        quadrature_lm,
        declared_lm
    );

    Ok(ValidationReport {
        monte_carlo_lm,
        quadrature_lm,
        declared_lm,
        agreement,
        monte_carlo_error,
        quadrature_error,
        tolerance,
        passed,
    })
}
