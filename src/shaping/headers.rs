//! Sample header pool and header-block padding.
//!
//! The pool is a fixed palette of realistic response headers. Padding
//! re-applies the whole palette until the requested byte budget is spent, so
//! the resulting header block overshoots the budget by at most one pass.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Budget charged for `Content-Type: application/json; charset=utf-8`.
pub const CONTENT_TYPE_COST: i64 = 45;

/// Built-in palette. Names are lowercase as they appear on the HTTP/1.1 wire.
static BUILTIN_HEADERS: &[(&str, &str)] = &[
    ("etag", "489bbe95-4221-49a8-90c9-0050ffe752b5"),
    ("x-config-id", "87428fc522803d31065e7bce3cf03fe475096631e5e07bbd7a0fde60c4cf25c7"),
    ("x-device-id", "123456"),
    ("x-server-pool", "my-pool.server.pauloavelar.com"),
    ("x-random-seed", "AKQUW9912X"),
    ("cache-control", "no-cache"),
    ("x-custom-header", "custom-value"),
    ("x-request-id", "ABCDEFGHIJKLMNOPQRSTUV"),
    ("x-forwarded-for", "192.168.1.1"),
    ("x-forwarded-host", "pauloavelar.com"),
    ("x-random-date", "Mon, 02 Jan 2006 15:04:05 MST"),
    ("server", "Apache/2.4.41 (Unix)"),
    ("set-cookie", "sessionid=123456789; Path=/; Secure; HttpOnly"),
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-powered-by", "PHP/7.4.9"),
    ("x-xss-protection", "1; mode=block"),
    ("x-custom-header-1", "custom_value=1"),
    ("x-custom-header-2", "custom_value=2"),
    ("x-custom-header-3", "custom_value=3"),
    ("x-custom-header-4", "custom_value=4"),
    ("x-custom-header-5", "custom_value=5"),
    ("x-custom-header-6", "custom_value=6"),
    ("x-custom-header-7", "custom_value=7"),
    ("x-custom-header-8", "custom_value=8"),
    ("x-custom-header-9", "custom_value=9"),
    ("x-custom-header-0", "custom_value=0"),
];

/// Error building a pool from caller-supplied pairs.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("invalid header name {0:?}")]
    InvalidName(String),

    #[error("invalid value for header {0:?}")]
    InvalidValue(String),
}

#[derive(Debug, Clone)]
struct PoolEntry {
    name: HeaderName,
    value: HeaderValue,
    cost: i64,
}

impl PoolEntry {
    fn new(name: HeaderName, value: HeaderValue) -> Self {
        let cost = (name.as_str().len() + value.len()) as i64;
        Self { name, value, cost }
    }
}

/// Immutable palette of `(name, value)` pairs used to pad header blocks.
///
/// Built once at startup and shared behind an `Arc`; reads need no locking.
#[derive(Debug, Clone, Default)]
pub struct SampleHeaderPool {
    entries: Vec<PoolEntry>,
    pass_cost: i64,
}

/// Outcome of a padding run, reported for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Padding {
    /// Full passes over the pool.
    pub passes: u32,
    /// Budget left after the last pass (zero or negative unless nothing ran).
    pub remaining: i64,
}

impl SampleHeaderPool {
    /// The built-in palette.
    pub fn builtin() -> Self {
        Self::from_entries(
            BUILTIN_HEADERS
                .iter()
                .map(|&(name, value)| PoolEntry::new(HeaderName::from_static(name), HeaderValue::from_static(value)))
                .collect(),
        )
    }

    /// Build a pool from arbitrary pairs. Later duplicates replace earlier ones.
    pub fn new<I, K, V>(pairs: I) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut entries: Vec<PoolEntry> = Vec::new();
        for (name, value) in pairs {
            let name = HeaderName::from_bytes(name.as_ref().as_bytes())
                .map_err(|_| PoolError::InvalidName(name.as_ref().to_owned()))?;
            let value = HeaderValue::from_str(value.as_ref())
                .map_err(|_| PoolError::InvalidValue(name.as_str().to_owned()))?;
            entries.retain(|entry| entry.name != name);
            entries.push(PoolEntry::new(name, value));
        }
        Ok(Self::from_entries(entries))
    }

    fn from_entries(entries: Vec<PoolEntry>) -> Self {
        let pass_cost = entries.iter().map(|entry| entry.cost).sum();
        Self { entries, pass_cost }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes charged for one full pass over the pool.
    pub fn pass_cost(&self) -> i64 {
        self.pass_cost
    }

    /// Iterate the palette as `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.entries.iter().map(|entry| (&entry.name, &entry.value))
    }

    /// Apply whole passes of the pool to `headers` until `budget` is spent.
    ///
    /// The budget is only checked between passes. A pool whose pass costs
    /// nothing can never spend the budget, so padding stops immediately.
    pub fn pad(&self, budget: i64, headers: &mut HeaderMap) -> Padding {
        let mut padding = Padding {
            passes: 0,
            remaining: budget,
        };
        if self.pass_cost <= 0 {
            return padding;
        }

        while padding.remaining > 0 {
            for entry in &self.entries {
                headers.insert(entry.name.clone(), entry.value.clone());
                padding.remaining -= entry.cost;
            }
            padding.passes += 1;
        }
        padding
    }
}
