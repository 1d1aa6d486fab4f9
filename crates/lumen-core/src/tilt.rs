//! Tilt correction curves.
//!
//! Some lamps change output with burning orientation. LM-63 files can embed
//! a table of multipliers indexed by tilt angle; the curve is evaluated with
//! the same zero-outside-domain rule as the photometric web itself.

use ndarray::ArrayView1;
use serde::Serialize;

use crate::edf::EdfError;
use crate::interp::{first_unsorted, interp_or_zero};

/// A piecewise-linear map from tilt angle (radians) to output multiplier.
#[derive(Debug, Clone, Serialize)]
pub struct TiltCurve {
    angles: Vec<f64>,
    multipliers: Vec<f64>,
}

impl TiltCurve {
    /// Build a curve from angles in radians.
    pub fn new(angles: Vec<f64>, multipliers: Vec<f64>) -> Result<Self, EdfError> {
        if angles.is_empty() {
            return Err(EdfError::EmptyTilt);
        }
        if angles.len() != multipliers.len() {
            return Err(EdfError::TiltLengthMismatch {
                angles: angles.len(),
                multipliers: multipliers.len(),
            });
        }
        if let Some(index) = first_unsorted(&angles) {
            return Err(EdfError::UnsortedAngles {
                axis: "tilt",
                index,
            });
        }
        Ok(Self {
            angles,
            multipliers,
        })
    }

    /// Build a curve from angles in degrees, as stored in LM-63 files.
    pub fn from_degrees(angles_deg: &[f64], multipliers: Vec<f64>) -> Result<Self, EdfError> {
        Self::new(angles_deg.iter().map(|a| a.to_radians()).collect(), multipliers)
    }

    /// Tilt angles in radians.
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    pub fn multipliers(&self) -> &[f64] {
        &self.multipliers
    }

    /// Multiplier at `tilt` radians; zero outside the tabulated range.
    pub fn multiplier_at(&self, tilt: f64) -> f64 {
        interp_or_zero(tilt, &self.angles, ArrayView1::from(&self.multipliers[..]))
    }
}
