//! Request parameter parsing and bounds checking.
//!
//! # Responsibilities
//! - Read `time`, `headers` and `body` from the query string
//! - Substitute defaults for absent parameters
//! - Reject malformed integers and out-of-range values
//!
//! # Design Decisions
//! - First occurrence of a repeated parameter wins
//! - Parameters are checked in order (`time`, `headers`, `body`) and the first
//!   failure ends validation

use std::num::ParseIntError;
use std::ops::RangeInclusive;

/// Query parameter controlling the artificial delay, in milliseconds.
pub const TIME_PARAM: &str = "time";
/// Query parameter controlling the header budget, in bytes.
pub const HEADERS_PARAM: &str = "headers";
/// Query parameter controlling the body size, in bytes.
pub const BODY_PARAM: &str = "body";

pub const DEFAULT_WAIT_MILLIS: u64 = 0;
pub const DEFAULT_HEADER_BYTES: u64 = 400;
pub const DEFAULT_BODY_BYTES: u64 = 400;

pub const WAIT_MILLIS_RANGE: RangeInclusive<i64> = 0..=5000;
pub const HEADER_BYTES_RANGE: RangeInclusive<i64> = 0..=1000;
pub const BODY_BYTES_RANGE: RangeInclusive<i64> = 0..=2000;

/// Error produced when a request parameter cannot be accepted.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParamError {
    /// The raw value is not a base-10 integer.
    #[error("parameter `{param}` is not an integer: {value:?} ({source})")]
    Malformed {
        param: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// The value parsed but lies outside the accepted range.
    #[error("parameter `{param}` out of range: {value} not in [{min}, {max}]")]
    OutOfRange {
        param: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

impl ParamError {
    /// Name of the offending query parameter.
    pub fn param(&self) -> &'static str {
        match self {
            ParamError::Malformed { param, .. } | ParamError::OutOfRange { param, .. } => param,
        }
    }
}

/// Validated shaping parameters for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestParameters {
    /// Artificial delay before responding.
    pub wait_millis: u64,
    /// Target size of the header block.
    pub header_bytes: u64,
    /// Target size of the body.
    pub body_bytes: u64,
}

impl Default for RequestParameters {
    fn default() -> Self {
        Self {
            wait_millis: DEFAULT_WAIT_MILLIS,
            header_bytes: DEFAULT_HEADER_BYTES,
            body_bytes: DEFAULT_BODY_BYTES,
        }
    }
}

impl RequestParameters {
    /// Validate parameters from a raw (still percent-encoded) query string.
    pub fn from_query(query: Option<&str>) -> Result<Self, ParamError> {
        let pairs = url::form_urlencoded::parse(query.unwrap_or_default().as_bytes());
        Self::from_pairs(pairs)
    }

    /// Validate parameters from decoded `(name, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, ParamError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut time = None;
        let mut headers = None;
        let mut body = None;

        for (name, value) in pairs {
            let slot = match name.as_ref() {
                TIME_PARAM => &mut time,
                HEADERS_PARAM => &mut headers,
                BODY_PARAM => &mut body,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.as_ref().to_owned());
            }
        }

        Ok(Self {
            wait_millis: resolve(TIME_PARAM, time.as_deref(), DEFAULT_WAIT_MILLIS, WAIT_MILLIS_RANGE)?,
            header_bytes: resolve(HEADERS_PARAM, headers.as_deref(), DEFAULT_HEADER_BYTES, HEADER_BYTES_RANGE)?,
            body_bytes: resolve(BODY_PARAM, body.as_deref(), DEFAULT_BODY_BYTES, BODY_BYTES_RANGE)?,
        })
    }
}

fn resolve(
    param: &'static str,
    raw: Option<&str>,
    default: u64,
    range: RangeInclusive<i64>,
) -> Result<u64, ParamError> {
    let Some(raw) = raw else {
        return Ok(default);
    };

    let value: i64 = raw.parse().map_err(|source: ParseIntError| {
        tracing::error!(param, value = raw, error = %source, "Invalid query value");
        ParamError::Malformed {
            param,
            value: raw.to_owned(),
            source,
        }
    })?;

    if !range.contains(&value) {
        return Err(ParamError::OutOfRange {
            param,
            value,
            min: *range.start(),
            max: *range.end(),
        });
    }

    // Every accepted range starts at zero.
    Ok(value as u64)
}
