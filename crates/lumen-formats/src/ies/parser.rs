//! LM-63 record grammar.
//!
//! The file is a fixed sequence of records:
//!
//! | # | record | lines |
//! |---|--------|-------|
//! | 0 | format tag (absent in 1986 files) | 0–1 |
//! | 1–4 | `[KEYWORD] value` metadata | any |
//! | 5 | `TILT=NONE` / `TILT=INCLUDE` / `TILT=<file>` | 1 |
//! | 6–9 | inline tilt table (`INCLUDE` only) | 2+ |
//! | 10 | lamp / geometry record | 1 |
//! | 11 | electrical record | 1 |
//! | 12 | vertical angles | 1+ |
//! | 13 | horizontal angles | 1+ |
//! | 14+ | one intensity record per horizontal angle | 1+ each |
//!
//! Each stage takes the line list and a start index and returns what it
//! parsed together with the number of lines consumed.

use lumen_core::edf::{FileFormat, Metadata, PhotometricType, Units};

use super::lines::{parse_token, structural, take_values, SourceLines, Step};
use super::record::{ElectricalRecord, IesRecord, LampRecord, TiltSpec, TiltTable};
use super::IesError;

/// Parse LM-63 text into an [`IesRecord`].
///
/// Every line must belong to a record; leftover lines are an error.
pub fn parse_record(content: &str) -> Result<IesRecord, IesError> {
    let lines = SourceLines::new(content);
    if lines.is_empty() {
        return Err(structural(0, "File is empty"));
    }

    let mut at = 0;

    let format = parse_format_tag(&lines, at);
    at += format.consumed;

    let metadata = parse_metadata(&lines, at)?;
    at += metadata.consumed;

    let tilt = parse_tilt(&lines, at)?;
    at += tilt.consumed;

    let lamp = parse_lamp_record(&lines, at)?;
    at += lamp.consumed;

    let electrical = parse_electrical_record(&lines, at)?;
    at += electrical.consumed;

    let vert = take_values(&lines, at, lamp.value.vertical_count, "vertical angles")?;
    at += vert.consumed;

    let horz = take_values(&lines, at, lamp.value.horizontal_count, "horizontal angles")?;
    at += horz.consumed;

    let intensities = parse_intensities(
        &lines,
        at,
        lamp.value.horizontal_count,
        lamp.value.vertical_count,
    )?;
    at += intensities.consumed;

    if let Some(extra) = lines.get(at) {
        return Err(structural(
            extra.number,
            format!(
                "Unexpected content after the last intensity record ({} unread lines)",
                lines.len() - at
            ),
        ));
    }

    log::debug!(
        "Parsed {} file: {} metadata keys, {}x{} intensity grid",
        format.value.label(),
        metadata.value.len(),
        lamp.value.horizontal_count,
        lamp.value.vertical_count
    );

    Ok(IesRecord {
        format: format.value,
        metadata: metadata.value,
        tilt: tilt.value,
        lamp: lamp.value,
        electrical: electrical.value,
        vert_angles: vert.value,
        horz_angles: horz.value,
        intensities: intensities.value,
    })
}

/// Record 0: the optional revision tag. Untagged files are LM-63-1986.
fn parse_format_tag(lines: &SourceLines<'_>, at: usize) -> Step<FileFormat> {
    match lines.get(at).and_then(|line| FileFormat::from_tag(line.text)) {
        Some(format) => Step::new(format, 1),
        None => Step::new(FileFormat::Lm63_1986, 0),
    }
}

/// Records 1–4: `[KEY] value` lines up to the first line not starting
/// with `[`. A repeated key keeps its first position and takes the last
/// value.
fn parse_metadata(lines: &SourceLines<'_>, at: usize) -> Result<Step<Metadata>, IesError> {
    let mut metadata = Metadata::new();
    let mut consumed = 0;
    while let Some(line) = lines.get(at + consumed) {
        let Some(rest) = line.text.strip_prefix('[') else {
            break;
        };
        let end = rest.find(']').ok_or_else(|| {
            structural(line.number, format!("Unterminated keyword: '{}'", line.text))
        })?;
        let key = &rest[..end];
        let value = rest[end + 1..].trim_start();
        metadata.insert(key.to_string(), value.to_string());
        consumed += 1;
    }
    Ok(Step::new(metadata, consumed))
}

/// Record 5 and, for `TILT=INCLUDE`, records 6–9.
fn parse_tilt(lines: &SourceLines<'_>, at: usize) -> Result<Step<TiltSpec>, IesError> {
    let line = lines.require(at, "TILT= directive")?;
    let mode = match line.text.split_once('=') {
        Some((key, mode)) if key.trim() == "TILT" => mode,
        _ => {
            return Err(structural(
                line.number,
                format!("Expected TILT= directive, got '{}'", line.text),
            ))
        }
    };

    match mode.trim() {
        "NONE" => Ok(Step::new(TiltSpec::None, 1)),
        "INCLUDE" => {
            let mut consumed = 1;

            let geometry = lines.require(at + consumed, "lamp-to-luminaire geometry")?;
            let lamp_to_luminaire =
                parse_token::<i64>(geometry.text, geometry.number, "lamp-to-luminaire geometry")?;
            consumed += 1;

            let pairs = lines.require(at + consumed, "tilt pair count")?;
            let count = parse_token::<usize>(pairs.text, pairs.number, "tilt pair count")?;
            consumed += 1;

            let angles = take_values(lines, at + consumed, count, "tilt angles")?;
            consumed += angles.consumed;

            let multipliers = take_values(lines, at + consumed, count, "tilt multipliers")?;
            consumed += multipliers.consumed;

            Ok(Step::new(
                TiltSpec::Include(TiltTable {
                    lamp_to_luminaire,
                    angles_deg: angles.value,
                    multipliers: multipliers.value,
                }),
                consumed,
            ))
        }
        file => Ok(Step::new(TiltSpec::External(file.to_string()), 1)),
    }
}

/// Record 10, on a single line:
/// `<lamps> <lumens/lamp> <multiplier> <#vert> <#horz> <type> <units> <width> <length> <height>`
fn parse_lamp_record(lines: &SourceLines<'_>, at: usize) -> Result<Step<LampRecord>, IesError> {
    let line = lines.require(at, "lamp record")?;
    let fields: Vec<&str> = line.text.split_whitespace().collect();
    if fields.len() < 10 {
        return Err(structural(
            line.number,
            format!("Lamp record needs 10 fields, got {}", fields.len()),
        ));
    }
    let n = line.number;

    let type_code = parse_token::<i64>(fields[5], n, "photometric type")?;
    let photometric_type = PhotometricType::from_code(type_code)
        .ok_or_else(|| structural(n, format!("Unknown photometric type code {}", type_code)))?;
    let units_code = parse_token::<i64>(fields[6], n, "units type")?;
    let units = Units::from_code(units_code)
        .ok_or_else(|| structural(n, format!("Unknown units code {}", units_code)))?;

    let record = LampRecord {
        lamp_count: parse_token(fields[0], n, "lamp count")?,
        lumens_per_lamp: parse_token(fields[1], n, "lumens per lamp")?,
        candela_multiplier: parse_token(fields[2], n, "candela multiplier")?,
        vertical_count: parse_token(fields[3], n, "vertical angle count")?,
        horizontal_count: parse_token(fields[4], n, "horizontal angle count")?,
        photometric_type,
        units,
        width: parse_token(fields[7], n, "width")?,
        length: parse_token(fields[8], n, "length")?,
        height: parse_token(fields[9], n, "height")?,
    };
    if fields.len() > 10 {
        log::debug!("Line {}: ignoring {} extra lamp fields", n, fields.len() - 10);
    }
    Ok(Step::new(record, 1))
}

/// Record 11: `<ballast factor> <future use> <input watts>`.
fn parse_electrical_record(
    lines: &SourceLines<'_>,
    at: usize,
) -> Result<Step<ElectricalRecord>, IesError> {
    let line = lines.require(at, "electrical record")?;
    let fields: Vec<&str> = line.text.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(structural(
            line.number,
            format!("Electrical record needs 3 fields, got {}", fields.len()),
        ));
    }
    Ok(Step::new(
        ElectricalRecord {
            ballast_factor: parse_token(fields[0], line.number, "ballast factor")?,
            future_use: fields[1].to_string(),
            input_watts: parse_token(fields[2], line.number, "input watts")?,
        },
        1,
    ))
}

/// Records 14+: `rows` intensity records of `cols` values each.
fn parse_intensities(
    lines: &SourceLines<'_>,
    at: usize,
    rows: usize,
    cols: usize,
) -> Result<Step<Vec<Vec<f64>>>, IesError> {
    let total = rows.checked_mul(cols).unwrap_or(usize::MAX);
    lines.ensure_tokens(at, total, "intensity values")?;

    let mut intensities = Vec::with_capacity(rows);
    let mut consumed = 0;
    for row in 0..rows {
        let what = format!("intensities for horizontal angle #{}", row + 1);
        let step = take_values(lines, at + consumed, cols, &what)?;
        consumed += step.consumed;
        intensities.push(step.value);
    }
    Ok(Step::new(intensities, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "TILT=NONE\n1 1000 1 2 1 1 2 0 0 0\n1 1 100\n0 90\n0\n100 50\n";

    #[test]
    fn test_parse_minimal_1986() {
        let record = parse_record(MINIMAL).unwrap();
        assert_eq!(record.format, FileFormat::Lm63_1986);
        assert!(record.metadata.is_empty());
        assert_eq!(record.tilt, TiltSpec::None);
        assert_eq!(record.lamp.vertical_count, 2);
        assert_eq!(record.lamp.photometric_type, PhotometricType::C);
        assert_eq!(record.lamp.units, Units::Meters);
        assert_eq!(record.electrical.input_watts, 100.0);
        assert_eq!(record.intensities, vec![vec![100.0, 50.0]]);
    }

    #[test]
    fn test_format_tags() {
        for (tag, format) in [
            ("IESNA91", FileFormat::Lm63_1991),
            ("IESNA:LM-63-1995", FileFormat::Lm63_1995),
            ("IESNA:LM-63-2002", FileFormat::Lm63_2002),
        ] {
            let record = parse_record(&format!("{}\n{}", tag, MINIMAL)).unwrap();
            assert_eq!(record.format, format);
        }
    }

    #[test]
    fn test_metadata_key_value_split() {
        let content = format!(
            "IESNA:LM-63-2002\n[TEST]   ABC123\n[MANUFAC] Acme [Lights]\n[MORE] one\n[MORE] two\n[BLANK]\n{}",
            MINIMAL
        );
        let record = parse_record(&content).unwrap();
        let keys: Vec<&str> = record.metadata.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["TEST", "MANUFAC", "MORE", "BLANK"]);
        assert_eq!(record.metadata["TEST"], "ABC123");
        assert_eq!(record.metadata["MANUFAC"], "Acme [Lights]");
        assert_eq!(record.metadata["MORE"], "two");
        assert_eq!(record.metadata["BLANK"], "");
    }

    #[test]
    fn test_tilt_include_spans_lines() {
        let content = "TILT=INCLUDE\n1\n5\n0 22.5\n45 67.5 90\n1.0 0.95 0.9\n0.85 0.8\n\
                       1 1000 1 2 1 1 2 0 0 0\n1 1 100\n0 90\n0\n100 50\n";
        let record = parse_record(content).unwrap();
        match record.tilt {
            TiltSpec::Include(table) => {
                assert_eq!(table.lamp_to_luminaire, 1);
                assert_eq!(table.angles_deg, vec![0.0, 22.5, 45.0, 67.5, 90.0]);
                assert_eq!(table.multipliers, vec![1.0, 0.95, 0.9, 0.85, 0.8]);
            }
            other => panic!("expected inline tilt, got {:?}", other),
        }
    }

    #[test]
    fn test_tilt_external_reference() {
        let content = MINIMAL.replace("TILT=NONE", "TILT= lamp_tilt.dat ");
        let record = parse_record(&content).unwrap();
        assert_eq!(record.tilt, TiltSpec::External("lamp_tilt.dat".into()));
    }

    #[test]
    fn test_structural_failures() {
        let cases = [
            ("", "empty"),
            ("[TEST] x\n", "TILT"),
            ("[TEST x\nTILT=NONE\n", "Unterminated"),
            ("NOT A TILT LINE\n", "TILT"),
            ("LIFT=NONE\n", "TILT"),
            ("TILT=NONE\n1 1000 1 2 1\n", "10 fields"),
            ("TILT=NONE\n1 1000 1 2 1 9 2 0 0 0\n1 1 100\n", "photometric type code 9"),
            ("TILT=NONE\n1 1000 1 2 1 1 3 0 0 0\n1 1 100\n", "units code 3"),
            ("TILT=NONE\n1 1000 1 2 1 1 2 0 0 0\n1 1\n", "Electrical"),
            ("TILT=NONE\n1 1000 1 2 1 1 2 0 0 0\n1 1 100\n0 90\n0\n100\n", "Unexpected end"),
            ("TILT=NONE\n1 lots 1 2 1 1 2 0 0 0\n1 1 100\n", "lumens per lamp"),
        ];
        for (content, needle) in cases {
            let err = parse_record(content).unwrap_err();
            assert!(
                matches!(err, IesError::Structural { .. }),
                "{:?} should be structural",
                content
            );
            assert!(
                err.to_string().contains(needle),
                "error for {:?} should mention '{}': {}",
                content,
                needle,
                err
            );
        }
    }

    #[test]
    fn test_oversized_counts_are_structural() {
        let huge_vertical = "TILT=NONE\n1 1000 1 1000000000000000 1 1 2 0 0 0\n1 1 100\n0 90\n0\n100 50\n";
        let huge_tilt = format!(
            "TILT=INCLUDE\n1\n99999999999999999\n0 90\n1 0.5\n{}",
            &MINIMAL["TILT=NONE\n".len()..]
        );
        let huge_grid = "TILT=NONE\n1 1000 1 2 3 1 2 0 0 0\n1 1 100\n0 90\n0 90 180\n100 50\n";
        for (content, needle) in [
            (huge_vertical.to_string(), "vertical angles"),
            (huge_tilt, "tilt angles"),
            (huge_grid.to_string(), "intensity values"),
        ] {
            let err = parse_record(&content).unwrap_err();
            match err {
                IesError::Structural { message, .. } => {
                    assert!(message.contains(needle), "{}", message);
                    assert!(message.contains("values remain"), "{}", message);
                }
                other => panic!("expected structural error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_leftover_lines_rejected() {
        let err = parse_record(&format!("{}42\n", MINIMAL)).unwrap_err();
        match err {
            IesError::Structural { line, message } => {
                assert_eq!(line, 7);
                assert!(message.contains("1 unread lines"));
            }
            other => panic!("expected structural error, got {:?}", other),
        }
    }
}
