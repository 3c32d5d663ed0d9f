//! Energy trace parser
//!
//! The simulator writes a two-column trace file (`step energy`) with
//! `#` comment lines permitted anywhere. Trace files may be partially
//! written or malformed — a run can be interrupted mid-line — so
//! parsing is tolerant: lines that do not yield a numeric step index
//! and a floating-point energy value are silently skipped.
//!
//! An absent file is not an error either; it yields an empty
//! [`TraceSummary`], propagated as missing data rather than zero.

use std::fs;
use std::io;
use std::path::Path;

// =================================================================================================
// Trace Summary
// =================================================================================================

/// First/last energy reading and valid-line count of one trace file.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TraceSummary {
    /// Energy value of the first successfully parsed line
    pub first: Option<f64>,

    /// Energy value of the last successfully parsed line
    pub last: Option<f64>,

    /// Number of lines that parsed successfully
    pub valid_lines: usize,
}

impl TraceSummary {
    /// Summary with no readings (absent or empty trace).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the trace carried no usable reading at all.
    pub fn is_empty(&self) -> bool {
        self.valid_lines == 0
    }

    /// Parse a trace file into `(first, last, count)`.
    ///
    /// Returns the empty summary when the file does not exist. Read
    /// failures on an existing file are real I/O errors and propagate.
    pub fn parse(path: &Path) -> io::Result<Self> {
        if !path.exists() {
            return Ok(Self::empty());
        }

        let mut summary = Self::empty();
        for value in read_valid_energies(path)? {
            if summary.first.is_none() {
                summary.first = Some(value);
            }
            summary.last = Some(value);
            summary.valid_lines += 1;
        }
        Ok(summary)
    }
}

// =================================================================================================
// Full Series
// =================================================================================================

/// Read every valid energy value of a trace file, in file order.
///
/// Used by the sanity validator, which needs the step-to-step behaviour
/// and not just the endpoints. Absent file yields an empty series.
pub fn read_series(path: &Path) -> io::Result<Vec<f64>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    read_valid_energies(path)
}

/// Shared line filter: skip blanks and `#` comments, require at least
/// two whitespace-separated fields, a numeric step index (float input
/// coerced to integer, as the simulator sometimes writes `12.0`) and a
/// finite energy value.
fn read_valid_energies(path: &Path) -> io::Result<Vec<f64>> {
    // Lossy decoding mirrors the tolerance toward partially written
    // files: a torn multi-byte sequence must not abort the parse.
    let bytes = fs::read(path)?;
    let contents = String::from_utf8_lossy(&bytes);

    let mut values = Vec::new();
    for line in contents.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut fields = trimmed.split_whitespace();
        let (Some(step), Some(energy)) = (fields.next(), fields.next()) else {
            continue;
        };
        let Ok(step) = step.parse::<f64>() else {
            continue;
        };
        if !step.is_finite() {
            continue;
        }
        let Ok(energy) = energy.parse::<f64>() else {
            continue;
        };
        values.push(energy);
    }
    Ok(values)
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_trace(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_mixed_file_counts_only_valid_lines() {
        let file = write_trace(
            "# step energy\n\
             0 10.0\n\
             \n\
             1 8.5\n\
             2 not_a_number\n\
             3 7.25 extra_field\n\
             # trailing comment\n",
        );
        let summary = TraceSummary::parse(file.path()).unwrap();
        assert_eq!(summary.first, Some(10.0));
        assert_eq!(summary.last, Some(7.25));
        assert_eq!(summary.valid_lines, 3);
    }

    #[test]
    fn test_absent_file_yields_empty_summary() {
        let path = Path::new("definitely/not/a/trace.dat");
        let summary = TraceSummary::parse(path).unwrap();
        assert_eq!(summary, TraceSummary::empty());
        assert!(summary.is_empty());
        assert!(read_series(path).unwrap().is_empty());
    }

    #[test]
    fn test_single_field_lines_are_skipped() {
        let file = write_trace("0\n1 5.0\n");
        let summary = TraceSummary::parse(file.path()).unwrap();
        assert_eq!(summary.valid_lines, 1);
        assert_eq!(summary.first, Some(5.0));
    }

    #[test]
    fn test_float_step_indices_are_accepted() {
        // The simulator occasionally writes the step as a float.
        let file = write_trace("0.0 10.0\n1.0 9.0\n");
        let summary = TraceSummary::parse(file.path()).unwrap();
        assert_eq!(summary.valid_lines, 2);
        assert_eq!(summary.last, Some(9.0));
    }

    #[test]
    fn test_non_numeric_step_is_skipped() {
        let file = write_trace("step 10.0\n0 10.0\n");
        let summary = TraceSummary::parse(file.path()).unwrap();
        assert_eq!(summary.valid_lines, 1);
    }

    #[test]
    fn test_read_series_returns_all_values_in_order() {
        let file = write_trace("0 10.0\n1 12.0\n2 9.0\n3 11.0\n");
        let series = read_series(file.path()).unwrap();
        assert_eq!(series, vec![10.0, 12.0, 9.0, 11.0]);
    }
}
