//! Normalised line list and value accumulation.
//!
//! Blank lines carry no meaning in LM-63, so they are dropped up front and
//! every remaining line is trimmed. Parser stages address this list by
//! index and report how many lines they consumed; they never move a shared
//! cursor.

use std::str::FromStr;

use super::IesError;

/// A trimmed, non-empty line with its 1-based position in the source text.
#[derive(Debug, Clone, Copy)]
pub struct SourceLine<'a> {
    pub number: usize,
    pub text: &'a str,
}

/// The normalised lines of one file.
#[derive(Debug, Clone)]
pub struct SourceLines<'a> {
    lines: Vec<SourceLine<'a>>,
    /// `tokens_from[i]` counts the tokens on lines `i..`; one extra entry
    /// holds zero for the end of the file.
    tokens_from: Vec<usize>,
}

/// A parsed value and the number of lines it occupied.
#[derive(Debug, Clone)]
pub struct Step<T> {
    pub value: T,
    pub consumed: usize,
}

impl<T> Step<T> {
    pub fn new(value: T, consumed: usize) -> Self {
        Self { value, consumed }
    }
}

impl<'a> SourceLines<'a> {
    pub fn new(content: &'a str) -> Self {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let lines = content
            .lines()
            .enumerate()
            .map(|(idx, text)| SourceLine {
                number: idx + 1,
                text: text.trim(),
            })
            .filter(|line| !line.text.is_empty())
            .collect::<Vec<_>>();

        let mut tokens_from = vec![0; lines.len() + 1];
        for (idx, line) in lines.iter().enumerate().rev() {
            tokens_from[idx] = tokens_from[idx + 1] + line.text.split_whitespace().count();
        }
        Self { lines, tokens_from }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, at: usize) -> Option<SourceLine<'a>> {
        self.lines.get(at).copied()
    }

    /// The line at `at`, or a structural error naming what was expected.
    pub fn require(&self, at: usize, what: &str) -> Result<SourceLine<'a>, IesError> {
        self.get(at).ok_or_else(|| {
            structural(
                self.last_line_number(),
                format!("Unexpected end of file, expected {}", what),
            )
        })
    }

    /// Number of whitespace-separated tokens from line `at` to the end.
    pub fn tokens_from(&self, at: usize) -> usize {
        self.tokens_from.get(at).copied().unwrap_or(0)
    }

    /// Fail unless at least `count` tokens remain from line `at`.
    ///
    /// Counts come from the file header, so they are checked against the
    /// text before anything is sized from them.
    pub fn ensure_tokens(&self, at: usize, count: usize, what: &str) -> Result<(), IesError> {
        let available = self.tokens_from(at);
        if count > available {
            return Err(structural(
                self.get(at).map_or(self.last_line_number(), |line| line.number),
                format!(
                    "Unexpected end of file, expected {} {} but only {} values remain",
                    count, what, available
                ),
            ));
        }
        Ok(())
    }

    /// Source line number of the final line, or 0 for an empty file.
    pub fn last_line_number(&self) -> usize {
        self.lines.last().map_or(0, |line| line.number)
    }
}

pub(crate) fn structural(line: usize, message: impl Into<String>) -> IesError {
    IesError::Structural {
        line,
        message: message.into(),
    }
}

/// Parse one whitespace-separated token.
pub fn parse_token<T: FromStr>(token: &str, line: usize, what: &str) -> Result<T, IesError> {
    token
        .parse()
        .map_err(|_| structural(line, format!("Invalid {}: '{}'", what, token)))
}

/// Collect exactly `count` numbers starting at line `at`, reading as many
/// lines as needed.
///
/// A record always ends at a line boundary, so a line that would push the
/// total past `count` is an error.
pub fn take_values(
    lines: &SourceLines<'_>,
    at: usize,
    count: usize,
    what: &str,
) -> Result<Step<Vec<f64>>, IesError> {
    lines.ensure_tokens(at, count, what)?;
    let mut values = Vec::with_capacity(count);
    let mut consumed = 0;
    while values.len() < count {
        let line = lines.require(
            at + consumed,
            &format!("{} ({} of {} values read)", what, values.len(), count),
        )?;
        for token in line.text.split_whitespace() {
            values.push(parse_token::<f64>(token, line.number, what)?);
        }
        consumed += 1;
        if values.len() > count {
            return Err(structural(
                line.number,
                format!("Expected {} {} but found {}", count, what, values.len()),
            ));
        }
    }
    Ok(Step::new(values, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_dropped_and_trimmed() {
        let lines = SourceLines::new("\u{feff}  a  \n\n   \n\tb\n");
        assert_eq!(lines.len(), 2);
        let b = lines.get(1).unwrap();
        assert_eq!(b.text, "b");
        assert_eq!(b.number, 4);
    }

    #[test]
    fn test_take_values_spans_lines() {
        let lines = SourceLines::new("0 10 20\n30\n40 50\nrest");
        let step = take_values(&lines, 0, 6, "vertical angles").unwrap();
        assert_eq!(step.value, vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
        assert_eq!(step.consumed, 3);
    }

    #[test]
    fn test_take_zero_values_consumes_nothing() {
        let lines = SourceLines::new("1 2");
        let step = take_values(&lines, 0, 0, "angles").unwrap();
        assert!(step.value.is_empty());
        assert_eq!(step.consumed, 0);
    }

    #[test]
    fn test_take_values_errors() {
        let lines = SourceLines::new("1 2\n3 x");
        let err = take_values(&lines, 0, 4, "intensities").unwrap_err();
        assert!(matches!(err, IesError::Structural { line: 2, .. }));
        assert!(err.to_string().contains("'x'"));

        let lines = SourceLines::new("1 2 3");
        let err = take_values(&lines, 0, 2, "horizontal angles").unwrap_err();
        assert!(err.to_string().contains("Expected 2 horizontal angles but found 3"));

        let lines = SourceLines::new("1 2");
        let err = take_values(&lines, 0, 3, "vertical angles").unwrap_err();
        assert!(err.to_string().contains("Unexpected end of file"));
    }

    #[test]
    fn test_token_counts_per_suffix() {
        let lines = SourceLines::new("a b\n\n c \nd e f");
        assert_eq!(lines.tokens_from(0), 6);
        assert_eq!(lines.tokens_from(1), 4);
        assert_eq!(lines.tokens_from(2), 3);
        assert_eq!(lines.tokens_from(3), 0);
        assert_eq!(lines.tokens_from(99), 0);
    }

    #[test]
    fn test_huge_count_fails_before_reading() {
        let lines = SourceLines::new("1 2 3\n4");
        let err = take_values(&lines, 0, usize::MAX, "vertical angles").unwrap_err();
        match err {
            IesError::Structural { line, message } => {
                assert_eq!(line, 1);
                assert!(message.contains("only 4 values remain"), "{}", message);
            }
            other => panic!("expected structural error, got {:?}", other),
        }
    }
}
