//! Assemble an [`Edf`] from a parsed [`IesRecord`].

use lumen_core::edf::{EdfParts, LoadWarning, PhotometricHeader};
use lumen_core::tilt::TiltCurve;
use lumen_core::Edf;

use super::record::{IesRecord, TiltSpec};
use super::{IesError, LoadPolicy};

/// Validate `record` and build the EDF.
///
/// Under [`LoadPolicy::Strict`] the first [`LoadWarning`] becomes an error.
/// Under [`LoadPolicy::Lenient`] warnings are logged and kept on the EDF.
pub fn build_edf(record: IesRecord, policy: LoadPolicy) -> Result<Edf, IesError> {
    let IesRecord {
        format,
        metadata,
        tilt,
        lamp,
        electrical,
        vert_angles,
        horz_angles,
        intensities,
    } = record;

    let mut warnings = Vec::new();
    let (tilt, lamp_to_luminaire) = match tilt {
        TiltSpec::None => (None, None),
        TiltSpec::Include(table) => {
            let curve = TiltCurve::from_degrees(&table.angles_deg, table.multipliers)?;
            (Some(curve), Some(table.lamp_to_luminaire))
        }
        TiltSpec::External(name) => {
            if policy == LoadPolicy::Strict {
                return Err(IesError::UnsupportedTiltReference(name));
            }
            warnings.push(LoadWarning::UnsupportedTiltReference(name));
            (None, None)
        }
    };

    let parts = EdfParts {
        metadata,
        header: PhotometricHeader {
            format,
            photometric_type: lamp.photometric_type,
            units: lamp.units,
            lamp_count: lamp.lamp_count,
            lumens_per_lamp: lamp.lumens_per_lamp,
            input_watts: electrical.input_watts,
            lamp_to_luminaire,
        },
        size: [lamp.width, lamp.length, lamp.height],
        tilt,
        ballast_multiplier: electrical.ballast_factor,
        intensity_multiplier: lamp.candela_multiplier,
        vert_angles_deg: vert_angles,
        horz_angles_deg: horz_angles,
        intensities,
        warnings,
    };

    let edf = Edf::from_parts(parts)?;

    match policy {
        LoadPolicy::Strict => {
            if let Some(warning) = edf.warnings().first() {
                return Err(warning.clone().into());
            }
        }
        LoadPolicy::Lenient => {
            for warning in edf.warnings() {
                log::warn!("{}", warning);
            }
        }
    }

    Ok(edf)
}
