//! Response shaping subsystem.
//!
//! # Data Flow
//! ```text
//! raw query string
//!     → params.rs (parse, default, bounds-check)
//!     → [handler sleeps for wait_millis]
//!     → response.rs (status selection)
//!         → headers.rs (pad header block from the sample pool)
//!         → body.rs (synthesize body from templates)
//!     → ShapedResponse → client
//! ```
//!
//! # Design Decisions
//! - Validation is the only fallible step; shaping is a pure function
//! - The sample pool is built once and shared read-only across requests
//! - Body bytes are reproducible across runs for the same `body` value

pub mod body;
pub mod headers;
pub mod params;
pub mod response;

pub use headers::SampleHeaderPool;
pub use params::{ParamError, RequestParameters};
pub use response::{shape, ShapedResponse};
