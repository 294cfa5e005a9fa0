//! Parsing of the textual fields found in raw trip rows.
//!
//! Every function here reports failure as a [`RejectReason`] so the validator
//! can use `?` and still end up with a tagged outcome instead of an error.

use std::str::FromStr;

use chrono::NaiveDateTime;

use crate::validate::RejectReason;

/// The only accepted timestamp layout, e.g. `2016-03-14 17:24:55`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses a timezone-naive `YYYY-MM-DD HH:MM:SS` timestamp.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, RejectReason> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
        .map_err(|_| RejectReason::MalformedTimestamp)
}

/// Returns the trimmed field, or `MissingField` when absent or blank.
pub fn required(field: Option<&str>) -> Result<&str, RejectReason> {
    match field.map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(RejectReason::MissingField),
    }
}

/// Parses a numeric field that is known to be present.
///
/// Integer columns written as `3.0` by upstream tooling are accepted as long as
/// they carry no fractional part.
pub fn parse_number<T: FromStr>(s: &str) -> Result<T, RejectReason> {
    if let Ok(v) = s.parse::<T>() {
        return Ok(v);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f.fract() == 0.0 => {
            format!("{}", f as i64).parse::<T>().map_err(|_| RejectReason::MalformedField)
        }
        _ => Err(RejectReason::MalformedField),
    }
}
