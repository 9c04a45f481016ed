// src/feed/parser.rs
use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use thiserror::Error;

use crate::feed::types::SeismicRecord;

/// Whole match plus date, time, lat, lon, depth, quality, magnitude,
/// secondary magnitude and place.
pub const EXPECTED_GROUPS: usize = 10;

/// Column layout of the KOERI "last events" list.
pub const DEFAULT_PATTERN: &str = r"^\s*(\d{4}[./-]\d{2}[./-]\d{2})\s+(\d{2}:\d{2}:\d{2}(?:\.\d+)?)\s+(-?\d+(?:\.\d+)?)\s+(-?\d+(?:\.\d+)?)\s+(\d+(?:\.\d+)?)\s+(\S+)\s+(\S+)\s+(\S+)\s+(.+?)\s*$";

const DATE_FORMATS: [&str; 3] = ["%Y.%m.%d", "%Y-%m-%d", "%Y/%m/%d"];

/// Any of these means the upstream layout changed; none is recoverable.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("line does not match the record pattern: {line:?}")]
    Malformed { line: String },
    #[error("field `{field}` has unparsable value {value:?}")]
    BadField { field: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct RecordParser {
    pattern: Regex,
}

impl RecordParser {
    /// Compiles `pattern`, which must expose exactly nine capture groups.
    pub fn new(pattern: &str) -> Result<Self> {
        let re = Regex::new(pattern).with_context(|| format!("compiling line pattern {pattern:?}"))?;
        if re.captures_len() != EXPECTED_GROUPS {
            return Err(anyhow!(
                "line pattern has {} capture groups, expected {}",
                re.captures_len() - 1,
                EXPECTED_GROUPS - 1
            ));
        }
        Ok(Self { pattern: re })
    }

    pub fn parse(&self, line: &str) -> Result<SeismicRecord, ParseError> {
        let malformed = || ParseError::Malformed {
            line: line.to_string(),
        };
        let caps = self.pattern.captures(line).ok_or_else(malformed)?;

        let mut fields = Vec::with_capacity(EXPECTED_GROUPS - 1);
        for i in 1..EXPECTED_GROUPS {
            // Optional groups that did not participate count as a shape mismatch.
            let m = caps.get(i).ok_or_else(malformed)?;
            fields.push(m.as_str().trim());
        }

        let date = parse_date(fields[0])?;
        let time = NaiveTime::parse_from_str(fields[1], "%H:%M:%S%.f")
            .map_err(|_| bad("time", fields[1]))?;
        let depth_km = parse_f64("depth", fields[4])?;
        if depth_km < 0.0 {
            return Err(bad("depth", fields[4]));
        }

        // fields[5] (quality) and fields[7] (secondary magnitude) are not used.
        Ok(SeismicRecord {
            occurred_at: NaiveDateTime::new(date, time),
            latitude: parse_f64("latitude", fields[2])?,
            longitude: parse_f64("longitude", fields[3])?,
            depth_km,
            magnitude: parse_f64("magnitude", fields[6])?,
            place: fields[8].to_string(),
        })
    }
}

impl Default for RecordParser {
    fn default() -> Self {
        Self {
            pattern: Regex::new(DEFAULT_PATTERN).expect("default pattern compiles"),
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, ParseError> {
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .ok_or_else(|| bad("date", s))
}

fn parse_f64(field: &'static str, s: &str) -> Result<f64, ParseError> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| bad(field, s))
}

fn bad(field: &'static str, value: &str) -> ParseError {
    ParseError::BadField {
        field,
        value: value.to_string(),
    }
}
