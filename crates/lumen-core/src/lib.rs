//! # Lumen Core
//!
//! The numerical backbone of the Lumen framework. This crate models a
//! luminaire's goniometric light emission as an immutable Emission
//! Distribution Function ([`edf::Edf`]) that can be sampled at arbitrary
//! directions and integrated to recover total luminous flux.
//!
//! ## Architecture
//!
//! Flux estimators implement the [`integrate::FluxIntegrator`] trait, which
//! lets the CLI drive either integrator against any compute backend. Both a
//! stochastic ([`integrate::monte_carlo`]) and a deterministic
//! ([`integrate::quadrature`]) method are provided so that their agreement
//! can be used to cross-check a loaded photometric web.
//!
//! ## Modules
//!
//! - [`edf`]: The EDF data model, header records and load warnings.
//! - [`interp`]: 1D piecewise-linear table lookup.
//! - [`tilt`]: Tilt-angle multiplier curves.
//! - [`symmetry`]: Horizontal symmetry classification and azimuth folding.
//! - [`sample`]: Intensity lookup at a direction.
//! - [`integrate`]: Luminous flux integrators.
//! - [`validation`]: Integrator cross-validation against a declared rating.

pub mod edf;
pub mod integrate;
pub mod interp;
pub mod sample;
pub mod symmetry;
pub mod tilt;
pub mod validation;

pub use edf::{Edf, EdfError, EdfParts, LoadWarning, Orientation};
pub use symmetry::HorizontalSymmetry;
