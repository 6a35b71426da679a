//! Line parser for WWDB location exports
//!
//! Each line holds a name followed by a latitude and a longitude, separated
//! by tabs, commas or runs of whitespace. Bad lines are skipped and reported,
//! never fatal; only input with nothing usable in it is an error.

use crate::{
    data::record::{GeoRecord, RecordSet},
    MapError, Result,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::BufRead;

/// `name <sep> lat <sep> lon [# comment]`
static LINE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?P<name>\p{L}(?:[\p{L}\p{M}'.\- ]*[\p{L}\p{M}'.])?)(?:\s*[\t,]\s*|\s+)(?P<lat>[^\s,]+)(?:\s*[\t,]\s*|\s+)(?P<lon>[^\s,#]+)\s*(?:#.*)?$",
    )
    .expect("line pattern is valid")
});

/// Signed decimal, optional fraction. No exponents, no inf/NaN.
static NUMBER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)$").expect("number pattern is valid"));

/// Why a line did not become a record
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkipReason {
    #[error("line does not match `name, latitude, longitude`")]
    Malformed,

    #[error("{field} `{value}` is not a decimal number")]
    InvalidNumber { field: &'static str, value: String },

    #[error("coordinate ({latitude}, {longitude}) is out of range")]
    CoordinateOutOfRange { latitude: f64, longitude: f64 },

    #[error("line is not valid UTF-8")]
    InvalidEncoding,

    #[error("no {0} found")]
    MissingField(&'static str),
}

/// A dropped input line and the reason it was dropped
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    /// 1-based line number in the input
    pub line_number: usize,
    pub reason: SkipReason,
}

/// Records that parsed, plus every line that did not
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    pub records: RecordSet,
    pub skipped: Vec<SkippedLine>,
}

impl ParseOutcome {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn into_records(self) -> RecordSet {
        self.records
    }

    fn skip(&mut self, line_number: usize, reason: SkipReason) {
        match &reason {
            SkipReason::Malformed => log::debug!("skipping line {}: {}", line_number, reason),
            _ => log::warn!("skipping line {}: {}", line_number, reason),
        }
        self.skipped.push(SkippedLine {
            line_number,
            reason,
        });
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecordParser;

impl RecordParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses a whole text export.
    ///
    /// Fails with [`MapError::EmptyDataset`] when the text is blank or when
    /// no line yields a valid record.
    pub fn parse(&self, text: &str) -> Result<ParseOutcome> {
        self.parse_lines(text.lines().map(|line| Ok(Ok(line.to_string()))))
    }

    /// Parses line by line from any buffered reader.
    ///
    /// A line that is not UTF-8 is skipped as [`SkipReason::InvalidEncoding`];
    /// only a failing read is an [`MapError::Io`].
    pub fn parse_reader<R: BufRead>(&self, mut reader: R) -> Result<ParseOutcome> {
        let mut buf = Vec::new();
        let lines = std::iter::from_fn(move || {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => None,
                Ok(_) => {
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                        if buf.last() == Some(&b'\r') {
                            buf.pop();
                        }
                    }
                    let text = String::from_utf8(std::mem::take(&mut buf))
                        .map_err(|_| SkipReason::InvalidEncoding);
                    Some(Ok(text))
                }
                Err(e) => Some(Err(MapError::from(e))),
            }
        });
        self.parse_lines(lines)
    }

    /// Parses a single line.
    ///
    /// Returns `None` for blank and comment lines, which are not records and
    /// not counted as skipped either.
    pub fn parse_line(&self, line: &str) -> Option<std::result::Result<GeoRecord, SkipReason>> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        let Some(caps) = LINE_PATTERN.captures(line) else {
            return Some(Err(SkipReason::Malformed));
        };

        Some(Self::build_record(&caps["name"], &caps["lat"], &caps["lon"]))
    }

    fn build_record(
        name: &str,
        lat: &str,
        lon: &str,
    ) -> std::result::Result<GeoRecord, SkipReason> {
        let latitude = parse_decimal(lat, "latitude")?;
        let longitude = parse_decimal(lon, "longitude")?;

        GeoRecord::new(name, latitude, longitude).map_err(|_| SkipReason::CoordinateOutOfRange {
            latitude,
            longitude,
        })
    }

    /// Outer `Result` is a read failure, inner one a line that could not be
    /// decoded.
    fn parse_lines<I>(&self, lines: I) -> Result<ParseOutcome>
    where
        I: Iterator<Item = Result<std::result::Result<String, SkipReason>>>,
    {
        let mut outcome = ParseOutcome::default();
        let mut saw_content = false;

        for (index, line) in lines.enumerate() {
            let line_number = index + 1;
            let line = match line? {
                Ok(line) => line,
                Err(reason) => {
                    saw_content = true;
                    outcome.skip(line_number, reason);
                    continue;
                }
            };
            saw_content |= !line.trim().is_empty();

            match self.parse_line(&line) {
                None => {}
                Some(Ok(record)) => outcome.records.push(record),
                Some(Err(reason)) => outcome.skip(line_number, reason),
            }
        }

        if !saw_content {
            return Err(MapError::EmptyDataset("input is empty".to_string()));
        }
        if outcome.records.is_empty() {
            return Err(MapError::EmptyDataset(format!(
                "no valid records ({} lines skipped)",
                outcome.skipped_count()
            )));
        }

        log::info!(
            "parsed {} records, skipped {} lines",
            outcome.records.len(),
            outcome.skipped_count()
        );
        Ok(outcome)
    }
}

pub(crate) fn parse_decimal(value: &str, field: &'static str) -> std::result::Result<f64, SkipReason> {
    let invalid = || SkipReason::InvalidNumber {
        field,
        value: value.to_string(),
    };

    if !NUMBER_PATTERN.is_match(value) {
        return Err(invalid());
    }
    value.parse::<f64>().map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;

    fn parse(text: &str) -> ParseOutcome {
        RecordParser::new().parse(text).unwrap()
    }

    #[test]
    fn test_parse_tab_separated_line() {
        let outcome = parse("Cataract Falls\t37.93132\t-122.63520");
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.skipped_count(), 0);

        let record = &outcome.records.as_slice()[0];
        assert_eq!(record.name(), "Cataract Falls");
        assert_eq!(record.latitude(), 37.93132);
        assert_eq!(record.longitude(), -122.63520);
    }

    #[test]
    fn test_invalid_number_is_skipped() {
        let outcome = parse(
            "Cataract Falls\tnot-a-number\t-122.6\n\
             Carson Falls\t37.9767\t-122.6347",
        );
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records.as_slice()[0].name(), "Carson Falls");
        assert_eq!(outcome.skipped_count(), 1);
        assert_eq!(
            outcome.skipped[0],
            SkippedLine {
                line_number: 1,
                reason: SkipReason::InvalidNumber {
                    field: "latitude",
                    value: "not-a-number".to_string(),
                },
            }
        );
    }

    #[test]
    fn test_space_and_comma_separators() {
        let outcome = parse(
            "  Alamere Falls   37.9531  -122.7836  \n\
             Bridalveil Fall, 37.7167, -119.6467\n\
             Yosemite Falls,37.7566,-119.5969",
        );
        let names: Vec<&str> = outcome.records.iter().map(GeoRecord::name).collect();
        assert_eq!(names, ["Alamere Falls", "Bridalveil Fall", "Yosemite Falls"]);
        assert_eq!(
            outcome.records.as_slice()[1].position(),
            LatLng::new(37.7167, -119.6467)
        );
    }

    #[test]
    fn test_headers_blanks_and_comments() {
        let outcome = parse(
            "name\tlatitude\tlongitude\n\
             \n\
             # exported from WWDB\n\
             Multnomah Falls\t45.5762\t-122.1158 # upper tier\n\
             \t\t\n",
        );
        assert_eq!(outcome.records.len(), 1);
        // Only the header row counts; blanks and comments are ignored.
        assert_eq!(outcome.skipped_count(), 1);
        assert_eq!(outcome.skipped[0].line_number, 1);
    }

    #[test]
    fn test_names_need_letters() {
        let parser = RecordParser::new();
        assert_eq!(
            parser.parse_line("12345\t37.9\t-122.6"),
            Some(Err(SkipReason::Malformed))
        );
        assert_eq!(
            parser.parse_line("\t37.9\t-122.6"),
            Some(Err(SkipReason::Malformed))
        );
        let record = parser
            .parse_line("Devil's Punchbowl\t44.6683\t-123.9719")
            .unwrap()
            .unwrap();
        assert_eq!(record.name(), "Devil's Punchbowl");
    }

    #[test]
    fn test_too_many_or_too_few_fields() {
        let parser = RecordParser::new();
        assert_eq!(
            parser.parse_line("Falls\t37.9"),
            Some(Err(SkipReason::Malformed))
        );
        assert_eq!(
            parser.parse_line("Falls\t37.9\t-122.6\t12"),
            Some(Err(SkipReason::Malformed))
        );
    }

    #[test]
    fn test_out_of_range_is_skipped() {
        let parser = RecordParser::new();
        assert_eq!(
            parser.parse_line("Nowhere Falls\t91.0\t10.0"),
            Some(Err(SkipReason::CoordinateOutOfRange {
                latitude: 91.0,
                longitude: 10.0
            }))
        );
        assert!(matches!(
            parser.parse_line("Nowhere Falls\t10.0\t-180.5"),
            Some(Err(SkipReason::CoordinateOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_only_plain_decimals() {
        let parser = RecordParser::new();
        for bad in ["inf", "NaN", "1e3", "--3", "3.1.4", "."] {
            let line = format!("Falls\t{}\t-122.6", bad);
            assert!(
                matches!(
                    parser.parse_line(&line),
                    Some(Err(SkipReason::InvalidNumber { .. }))
                ),
                "accepted {}",
                bad
            );
        }
        for good in ["37", "+37.5", "-0.25", ".5", "37."] {
            let line = format!("Falls\t{}\t-122.6", good);
            assert!(matches!(parser.parse_line(&line), Some(Ok(_))), "rejected {}", good);
        }
    }

    #[test]
    fn test_empty_input_is_fatal() {
        let parser = RecordParser::new();
        assert!(matches!(parser.parse(""), Err(MapError::EmptyDataset(_))));
        assert!(matches!(
            parser.parse("  \n\t\n"),
            Err(MapError::EmptyDataset(_))
        ));
        assert!(matches!(
            parser.parse("name\tlatitude\tlongitude\n"),
            Err(MapError::EmptyDataset(_))
        ));
    }

    #[test]
    fn test_parse_reader() {
        let input = std::io::Cursor::new("Latourell Falls\t45.5394\t-122.2176\nbad line\n");
        let outcome = RecordParser::new().parse_reader(input).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.skipped_count(), 1);
        assert_eq!(outcome.skipped[0].line_number, 2);
    }

    #[test]
    fn test_parse_reader_skips_undecodable_line() {
        // "Salto Ñandú" in ISO-8859-1
        let input = std::io::Cursor::new(
            &b"Cataract Falls\t37.93132\t-122.63520\r\n\
               Salto \xd1and\xfa\t-25.6953\t-54.4367\n\
               Carson Falls\t37.9767\t-122.6347\n"[..],
        );
        let outcome = RecordParser::new().parse_reader(input).unwrap();

        let names: Vec<&str> = outcome.records.iter().map(GeoRecord::name).collect();
        assert_eq!(names, ["Cataract Falls", "Carson Falls"]);
        assert_eq!(outcome.records.as_slice()[0].longitude(), -122.6352);
        assert_eq!(
            outcome.skipped,
            [SkippedLine {
                line_number: 2,
                reason: SkipReason::InvalidEncoding,
            }]
        );
    }

    #[test]
    fn test_parse_reader_all_undecodable_is_empty_dataset() {
        let input = std::io::Cursor::new(&b"\xff\xfe\n"[..]);
        assert!(matches!(
            RecordParser::new().parse_reader(input),
            Err(MapError::EmptyDataset(_))
        ));
    }

    #[test]
    fn test_unicode_names() {
        let outcome = parse("Salto Ñandú\t-25.6953\t-54.4367");
        assert_eq!(outcome.records.as_slice()[0].name(), "Salto Ñandú");
    }
}
