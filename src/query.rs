//! Validation of textual query parameters at the edge of the system.
//!
//! Callers (the CLI here, an HTTP layer elsewhere) collect raw strings into
//! [`FilterParams`]; [`FilterParams::parse`] either returns well-formed
//! [`FilterCriteria`] or a [`FilterParamError`] describing the first problem.
//! The analyzers never see unvalidated input.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::analyzers::FilterCriteria;
use crate::analyzers::histogram::regular_bins;
use crate::parser::TIMESTAMP_FORMAT;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterParamError {
    #[error("{param}: expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS, got {value:?}")]
    InvalidTimestamp { param: &'static str, value: String },

    #[error("{param}: expected a non-negative integer, got {value:?}")]
    InvalidInteger { param: &'static str, value: String },

    #[error("{param}: expected 1/0/true/false/yes/no, got {value:?}")]
    InvalidFlag { param: &'static str, value: String },

    #[error("start ({start}) is after end ({end})")]
    InvertedRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("min_passengers ({min}) exceeds max_passengers ({max})")]
    InvertedPassengerRange { min: u32, max: u32 },

    #[error("k must be at least 1, got {0}")]
    InvalidTopN(usize),

    #[error("bin_size must be a positive number giving at most 10000 bins, got {0:?}")]
    InvalidBucketWidth(String),
}

/// Unparsed filter parameters as they arrive from a caller. Blank values are
/// treated as absent.
#[derive(Debug, Default, Clone)]
pub struct FilterParams {
    pub start: Option<String>,
    pub end: Option<String>,
    pub rush: Option<String>,
    pub min_passengers: Option<String>,
    pub max_passengers: Option<String>,
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

impl FilterParams {
    pub fn parse(&self) -> Result<FilterCriteria, FilterParamError> {
        let start = present(&self.start)
            .map(|v| parse_bound("start", v, Bound::Start))
            .transpose()?;
        let end = present(&self.end)
            .map(|v| parse_bound("end", v, Bound::End))
            .transpose()?;
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(FilterParamError::InvertedRange { start, end });
            }
        }

        let rush = present(&self.rush)
            .map(|v| parse_flag("rush", v))
            .transpose()?;

        let min_passengers = present(&self.min_passengers)
            .map(|v| parse_count("min_passengers", v))
            .transpose()?;
        let max_passengers = present(&self.max_passengers)
            .map(|v| parse_count("max_passengers", v))
            .transpose()?;
        if let (Some(min), Some(max)) = (min_passengers, max_passengers) {
            if min > max {
                return Err(FilterParamError::InvertedPassengerRange { min, max });
            }
        }

        Ok(FilterCriteria {
            start,
            end,
            rush,
            min_passengers,
            max_passengers,
        })
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// A bare date widens to the first or last second of that day.
fn parse_bound(
    param: &'static str,
    value: &str,
    bound: Bound,
) -> Result<NaiveDateTime, FilterParamError> {
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT) {
        return Ok(ts);
    }
    let invalid = || FilterParamError::InvalidTimestamp {
        param,
        value: value.to_string(),
    };
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())?;
    let (h, m, s) = match bound {
        Bound::Start => (0, 0, 0),
        Bound::End => (23, 59, 59),
    };
    date.and_hms_opt(h, m, s).ok_or_else(invalid)
}

fn parse_flag(param: &'static str, value: &str) -> Result<bool, FilterParamError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(FilterParamError::InvalidFlag {
            param,
            value: value.to_string(),
        }),
    }
}

fn parse_count(param: &'static str, value: &str) -> Result<u32, FilterParamError> {
    value
        .parse::<u32>()
        .map_err(|_| FilterParamError::InvalidInteger {
            param,
            value: value.to_string(),
        })
}

/// Validates the `k` of a busiest-hours query.
pub fn parse_top_n(k: usize) -> Result<usize, FilterParamError> {
    if k == 0 {
        return Err(FilterParamError::InvalidTopN(k));
    }
    Ok(k)
}

/// Validates an optional histogram bin width against the overflow floor it
/// will be laid out under.
pub fn parse_bucket_width(
    value: Option<&str>,
    overflow_floor: f64,
) -> Result<Option<f64>, FilterParamError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(w) if w > 0.0 && w.is_finite() && regular_bins(w, overflow_floor).is_some() => {
            Ok(Some(w))
        }
        _ => Err(FilterParamError::InvalidBucketWidth(raw.to_string())),
    }
}
