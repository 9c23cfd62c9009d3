//! Synthetic body templates.
//!
//! | size | body |
//! |------|------|
//! | 0    | none |
//! | 1    | `1` |
//! | 2    | `12` |
//! | 3-7  | `"` + quoted run of `3` + `"` |
//! | 8+   | `{"a":"` + quoted run of `B` + `"}` |
//!
//! The run is quoted a second time inside already-quoted text, so the
//! written length is not the requested size. Output must stay byte-stable.

use axum::body::Bytes;

/// Build the body for a requested size, or `None` when no body is written.
pub fn generate(body_bytes: u64) -> Option<Bytes> {
    let body = match body_bytes {
        0 => return None,
        1 => String::from("1"),
        2 => String::from("12"),
        3..=7 => format!("\"{}\"", quote(&run('3', body_bytes - 2))),
        _ => format!("{{\"a\":\"{}\"}}", quote(&run('B', body_bytes - 8))),
    };
    Some(Bytes::from(body))
}

fn run(ch: char, count: u64) -> String {
    std::iter::repeat(ch).take(count as usize).collect()
}

/// Quote `raw` as a double-quoted string literal.
fn quote(raw: &str) -> String {
    serde_json::Value::String(raw.to_owned()).to_string()
}
