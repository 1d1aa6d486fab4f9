//! Reader for IES LM-63 photometric data files.
//!
//! Loading runs in two stages. The [`parser`] turns normalised text lines
//! into an [`IesRecord`](record::IesRecord) that mirrors the file's record
//! structure; the [`builder`] then validates that record and assembles an
//! [`Edf`].
//!
//! ```text
//! IESNA:LM-63-2002
//! [TEST] 1234
//! [MANUFAC] Example Lighting
//! TILT=NONE
//! 1 1000 1 3 1 1 2 0.6 0.6 0.1
//! 1 1 25
//! 0 45 90
//! 0
//! 100 80 0
//! ```

pub mod builder;
pub mod lines;
pub mod parser;
pub mod record;

use std::borrow::Cow;
use std::path::Path;
use std::str::FromStr;

use lumen_core::edf::{EdfError, LoadWarning, PhotometricType};
use lumen_core::Edf;
use thiserror::Error;

pub use builder::build_edf;
pub use parser::parse_record;

/// Errors during LM-63 loading.
#[derive(Debug, Error)]
pub enum IesError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Structural { line: usize, message: String },

    #[error("External tilt file '{0}' is not supported")]
    UnsupportedTiltReference(String),

    #[error("Photometric type {0} is not supported")]
    UnsupportedOrientation(PhotometricType),

    #[error("Horizontal angles {min_deg}..{max_deg} degrees match no symmetry class")]
    UnclassifiableSymmetry { min_deg: f64, max_deg: f64 },

    #[error("Invalid photometric web: {0}")]
    InvalidWeb(#[from] EdfError),
}

impl From<LoadWarning> for IesError {
    fn from(warning: LoadWarning) -> Self {
        match warning {
            LoadWarning::UnsupportedOrientation(t) => Self::UnsupportedOrientation(t),
            LoadWarning::UnclassifiableSymmetry { min_deg, max_deg } => {
                Self::UnclassifiableSymmetry { min_deg, max_deg }
            }
            LoadWarning::UnsupportedTiltReference(name) => Self::UnsupportedTiltReference(name),
        }
    }
}

/// How non-structural problems are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Record the problem as a [`LoadWarning`] on the EDF and carry on.
    #[default]
    Lenient,
    /// Fail on the first problem.
    Strict,
}

impl FromStr for LoadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!(
                "Unknown load policy '{}'. Valid policies: lenient, strict",
                other
            )),
        }
    }
}

/// Parse LM-63 content that is already in memory.
pub fn parse_str(content: &str, policy: LoadPolicy) -> Result<Edf, IesError> {
    let record = parse_record(content)?;
    build_edf(record, policy)
}

/// Read and parse the LM-63 file at `path`.
///
/// Bytes that are not valid UTF-8 (typically Latin-1 symbols in the free
/// text of the metadata) are replaced with U+FFFD; the numeric records are
/// ASCII and parse unchanged.
pub fn load(path: impl AsRef<Path>, policy: LoadPolicy) -> Result<Edf, IesError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    log::debug!("Loading {} ({} bytes)", path.display(), bytes.len());
    let content = String::from_utf8_lossy(&bytes);
    if let Cow::Owned(_) = content {
        log::warn!("{} is not valid UTF-8; replaced undecodable bytes", path.display());
    }
    parse_str(&content, policy)
}
