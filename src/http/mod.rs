//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (hyper http1 connection, read-header timeout)
//!     → request.rs (add request ID, open request span)
//!     → server.rs handler (validate, wait, shape)
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer, INVALID_PARAMS_BODY, REQUEST_PATH};
