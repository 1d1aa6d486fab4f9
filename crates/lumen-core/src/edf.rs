//! The Emission Distribution Function and its supporting header types.
//!
//! An [`Edf`] is built once from a parsed photometric file and is read-only
//! afterwards, so it can be shared freely between threads. Angles are stored
//! in radians, luminaire dimensions in metres, and intensities in the file's
//! native candela scale.

use std::fmt;

use indexmap::IndexMap;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interp::first_unsorted;
use crate::symmetry::{classify, HorizontalSymmetry};
use crate::tilt::TiltCurve;

/// Bracketed header keywords, in file order.
pub type Metadata = IndexMap<String, String>;

/// One foot in metres.
pub const FOOT_IN_METRES: f64 = 0.3048;

/// Errors raised when the pieces of an EDF violate its invariants.
#[derive(Debug, Error)]
pub enum EdfError {
    #[error("No {axis} angles given")]
    EmptyAngles { axis: &'static str },

    #[error("{axis} angles must be strictly increasing (index {index})")]
    UnsortedAngles { axis: &'static str, index: usize },

    #[error("Intensity matrix is {rows}x{cols} but the angle grid is {expected_rows}x{expected_cols}")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },

    #[error("Invalid intensity {value} at horizontal index {row}, vertical index {col}")]
    InvalidIntensity { row: usize, col: usize, value: f64 },

    #[error("Tilt table needs at least one entry")]
    EmptyTilt,

    #[error("Tilt table has {angles} angles but {multipliers} multipliers")]
    TiltLengthMismatch { angles: usize, multipliers: usize },
}

/// Revision of the LM-63 standard a file was written against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileFormat {
    Lm63_1986,
    Lm63_1991,
    Lm63_1995,
    Lm63_2002,
}

impl FileFormat {
    /// Recognise the optional first-line format tag.
    pub fn from_tag(line: &str) -> Option<Self> {
        match line {
            "IESNA91" => Some(Self::Lm63_1991),
            "IESNA:LM-63-1995" => Some(Self::Lm63_1995),
            "IESNA:LM-63-2002" => Some(Self::Lm63_2002),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Lm63_1986 => "LM-63-1986",
            Self::Lm63_1991 => "LM-63-1991",
            Self::Lm63_1995 => "LM-63-1995",
            Self::Lm63_2002 => "LM-63-2002",
        }
    }
}

/// IES photometric type letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhotometricType {
    /// Polar axis vertical; 0–180° plane along the luminaire length.
    C,
    /// Polar axis along the luminaire width.
    B,
    /// Polar axis along the luminaire length.
    A,
}

impl PhotometricType {
    /// Map the numeric code of the lamp record (1, 2, 3).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::C),
            2 => Some(Self::B),
            3 => Some(Self::A),
            _ => None,
        }
    }

    pub fn orientation(self) -> Orientation {
        match self {
            Self::C => Orientation::YUpXLength,
            Self::B => Orientation::YWidthXUp,
            Self::A => Orientation::YLengthXUp,
        }
    }
}

impl fmt::Display for PhotometricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Self::C => "C",
            Self::B => "B",
            Self::A => "A",
        };
        f.write_str(letter)
    }
}

/// Frame in which the photometric web is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// IES Type C: y up, x along the luminaire length.
    YUpXLength,
    /// IES Type B: y along the width, x up.
    YWidthXUp,
    /// IES Type A: y along the length, x up.
    YLengthXUp,
}

/// Length unit used for the luminaire dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Units {
    Feet,
    Meters,
}

impl Units {
    /// Map the numeric units code of the lamp record (1 = feet, 2 = metres).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Feet),
            2 => Some(Self::Meters),
            _ => None,
        }
    }

    pub fn to_metres(self, value: f64) -> f64 {
        match self {
            Self::Feet => value * FOOT_IN_METRES,
            Self::Meters => value,
        }
    }
}

/// Lamp and electrical data carried over from the file's numeric header.
///
/// None of these values feed the sampler; they are kept for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotometricHeader {
    pub format: FileFormat,
    pub photometric_type: PhotometricType,
    /// Units the dimensions were declared in (the EDF stores metres).
    pub units: Units,
    pub lamp_count: u32,
    /// Rated lumens per lamp; `-1` marks absolute photometry.
    pub lumens_per_lamp: f64,
    pub input_watts: f64,
    /// Lamp-to-luminaire geometry code of an inline tilt table.
    pub lamp_to_luminaire: Option<i64>,
}

/// A non-fatal condition found while building an EDF.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LoadWarning {
    /// Only Type C webs are sampled angularly; others return a constant.
    UnsupportedOrientation(PhotometricType),
    /// The horizontal span matched no symmetry class and is left unfolded.
    UnclassifiableSymmetry { min_deg: f64, max_deg: f64 },
    /// The tilt table lives in an external file that was not read.
    UnsupportedTiltReference(String),
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedOrientation(t) => write!(
                f,
                "photometric type {} is not supported; sampling returns a constant",
                t
            ),
            Self::UnclassifiableSymmetry { min_deg, max_deg } => write!(
                f,
                "horizontal angles span {}..{} degrees, which matches no symmetry class",
                min_deg, max_deg
            ),
            Self::UnsupportedTiltReference(name) => {
                write!(f, "external tilt file '{}' is not supported; tilt ignored", name)
            }
        }
    }
}

/// Raw ingredients of an EDF, in the units used by LM-63 files.
///
/// Angles are in degrees and the size in the declared `header.units`.
/// [`Edf::from_parts`] validates and converts them.
#[derive(Debug, Clone)]
pub struct EdfParts {
    pub metadata: Metadata,
    pub header: PhotometricHeader,
    /// Width, length, height.
    pub size: [f64; 3],
    pub tilt: Option<TiltCurve>,
    pub ballast_multiplier: f64,
    pub intensity_multiplier: f64,
    pub vert_angles_deg: Vec<f64>,
    pub horz_angles_deg: Vec<f64>,
    /// One row per horizontal angle, one column per vertical angle.
    pub intensities: Vec<Vec<f64>>,
    /// Warnings raised before the EDF was assembled.
    pub warnings: Vec<LoadWarning>,
}

/// An immutable goniometric light-emission model.
#[derive(Debug, Clone, Serialize)]
pub struct Edf {
    pub(crate) metadata: Metadata,
    pub(crate) header: PhotometricHeader,
    pub(crate) orientation: Orientation,
    /// Width, length, height in metres.
    pub(crate) size: [f64; 3],
    pub(crate) tilt: Option<TiltCurve>,
    pub(crate) ballast_multiplier: f64,
    pub(crate) intensity_multiplier: f64,
    /// Zenith angles θ in radians, strictly increasing.
    pub(crate) vert_angles: Vec<f64>,
    /// Azimuth angles φ in radians, strictly increasing.
    pub(crate) horz_angles: Vec<f64>,
    pub(crate) horz_symmetry: HorizontalSymmetry,
    /// Indexed `[horizontal, vertical]`.
    pub(crate) intensities: Array2<f64>,
    pub(crate) warnings: Vec<LoadWarning>,
}

impl Edf {
    /// Validate `parts` and assemble the EDF.
    ///
    /// Converts angles to radians and the size to metres, derives the
    /// horizontal symmetry from the angular span, and records a warning for
    /// unsupported orientations and unclassifiable spans.
    pub fn from_parts(parts: EdfParts) -> Result<Self, EdfError> {
        let EdfParts {
            metadata,
            header,
            size,
            tilt,
            ballast_multiplier,
            intensity_multiplier,
            vert_angles_deg,
            horz_angles_deg,
            intensities,
            mut warnings,
        } = parts;

        check_axis("vertical", &vert_angles_deg)?;
        check_axis("horizontal", &horz_angles_deg)?;

        let rows = horz_angles_deg.len();
        let cols = vert_angles_deg.len();
        if intensities.len() != rows || intensities.iter().any(|row| row.len() != cols) {
            return Err(EdfError::ShapeMismatch {
                rows: intensities.len(),
                cols: intensities.first().map_or(0, Vec::len),
                expected_rows: rows,
                expected_cols: cols,
            });
        }

        let mut flat = Vec::with_capacity(rows * cols);
        for (row, values) in intensities.into_iter().enumerate() {
            for (col, value) in values.into_iter().enumerate() {
                if !(value.is_finite() && value >= 0.0) {
                    return Err(EdfError::InvalidIntensity { row, col, value });
                }
                flat.push(value);
            }
        }
        let intensities =
            Array2::from_shape_vec((rows, cols), flat).map_err(|_| EdfError::ShapeMismatch {
                rows,
                cols,
                expected_rows: rows,
                expected_cols: cols,
            })?;

        // Sorted and non-empty, so the extremes are the end points.
        let min_deg = horz_angles_deg[0];
        let max_deg = horz_angles_deg[rows - 1];
        let horz_symmetry = match classify(min_deg, max_deg) {
            Some(symmetry) => symmetry,
            None => {
                warnings.push(LoadWarning::UnclassifiableSymmetry { min_deg, max_deg });
                HorizontalSymmetry::None
            }
        };

        let orientation = header.photometric_type.orientation();
        if orientation != Orientation::YUpXLength {
            warnings.push(LoadWarning::UnsupportedOrientation(header.photometric_type));
        }

        let size = size.map(|v| header.units.to_metres(v));

        Ok(Self {
            metadata,
            header,
            orientation,
            size,
            tilt,
            ballast_multiplier,
            intensity_multiplier,
            vert_angles: vert_angles_deg.iter().map(|a| a.to_radians()).collect(),
            horz_angles: horz_angles_deg.iter().map(|a| a.to_radians()).collect(),
            horz_symmetry,
            intensities,
            warnings,
        })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn header(&self) -> &PhotometricHeader {
        &self.header
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Width, length, height in metres.
    pub fn size(&self) -> [f64; 3] {
        self.size
    }

    pub fn tilt(&self) -> Option<&TiltCurve> {
        self.tilt.as_ref()
    }

    pub fn ballast_multiplier(&self) -> f64 {
        self.ballast_multiplier
    }

    pub fn intensity_multiplier(&self) -> f64 {
        self.intensity_multiplier
    }

    /// Zenith angles in radians.
    pub fn vert_angles(&self) -> &[f64] {
        &self.vert_angles
    }

    /// Azimuth angles in radians.
    pub fn horz_angles(&self) -> &[f64] {
        &self.horz_angles
    }

    pub fn horz_symmetry(&self) -> HorizontalSymmetry {
        self.horz_symmetry
    }

    /// Intensity matrix indexed `[horizontal, vertical]`.
    pub fn intensities(&self) -> &Array2<f64> {
        &self.intensities
    }

    /// Intensities of the `index`-th horizontal plane.
    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.intensities.row(index)
    }

    /// Degradations recorded while building this EDF.
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Whether sampling follows the angular web (Type C only).
    pub fn is_fully_supported(&self) -> bool {
        self.orientation == Orientation::YUpXLength
    }

    /// The manufacturer's declared total output, if the header states one.
    ///
    /// Uses `_ABSOLUTELUMENS` when present, otherwise the first
    /// comma-separated field of `LAMP` containing a `<number> lm` pair.
    pub fn declared_lumens(&self) -> Option<f64> {
        if let Some(value) = self.metadata.get("_ABSOLUTELUMENS") {
            if let Ok(lumens) = value.trim().parse::<f64>() {
                return Some(lumens);
            }
        }

        let lamp = self.metadata.get("LAMP")?;
        lamp.split(',').find_map(|field| {
            let tokens: Vec<&str> = field.split_whitespace().collect();
            let at = tokens.iter().position(|t| *t == "lm")?;
            tokens.get(at.checked_sub(1)?)?.parse::<f64>().ok()
        })
    }
}

fn check_axis(axis: &'static str, angles: &[f64]) -> Result<(), EdfError> {
    if angles.is_empty() {
        return Err(EdfError::EmptyAngles { axis });
    }
    match first_unsorted(angles) {
        Some(index) => Err(EdfError::UnsortedAngles { axis, index }),
        None => Ok(()),
    }
}
