//! Typed intermediate representation of an LM-63 file.
//!
//! Fields keep the file's own units (degrees, declared length unit). The
//! [`builder`](super::builder) converts them when assembling the EDF.

use lumen_core::edf::{FileFormat, Metadata, PhotometricType, Units};

/// The `TILT=` directive and any inline tilt table.
#[derive(Debug, Clone, PartialEq)]
pub enum TiltSpec {
    /// `TILT=NONE`
    None,
    /// `TILT=INCLUDE`, followed by records 6–9.
    Include(TiltTable),
    /// `TILT=<filename>`; the table lives in another file.
    External(String),
}

/// Inline tilt records.
#[derive(Debug, Clone, PartialEq)]
pub struct TiltTable {
    pub lamp_to_luminaire: i64,
    pub angles_deg: Vec<f64>,
    pub multipliers: Vec<f64>,
}

/// Record 10: lamps, counts, type and luminous opening.
#[derive(Debug, Clone, PartialEq)]
pub struct LampRecord {
    pub lamp_count: u32,
    pub lumens_per_lamp: f64,
    pub candela_multiplier: f64,
    pub vertical_count: usize,
    pub horizontal_count: usize,
    pub photometric_type: PhotometricType,
    pub units: Units,
    pub width: f64,
    pub length: f64,
    pub height: f64,
}

/// Record 11: ballast factor, reserved field, input watts.
#[derive(Debug, Clone, PartialEq)]
pub struct ElectricalRecord {
    pub ballast_factor: f64,
    /// Reserved by the standard; kept verbatim.
    pub future_use: String,
    pub input_watts: f64,
}

/// A fully parsed but not yet validated LM-63 file.
#[derive(Debug, Clone)]
pub struct IesRecord {
    pub format: FileFormat,
    pub metadata: Metadata,
    pub tilt: TiltSpec,
    pub lamp: LampRecord,
    pub electrical: ElectricalRecord,
    pub vert_angles: Vec<f64>,
    pub horz_angles: Vec<f64>,
    /// One row per horizontal angle, in file order.
    pub intensities: Vec<Vec<f64>>,
}
