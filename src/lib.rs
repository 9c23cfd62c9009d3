//! Configurable HTTP Response Simulator
//!
//! Serves `/request?time=&headers=&body=` with an artificial delay, a padded
//! header block and a synthetic body, for exercising HTTP clients, proxies and
//! load-testing harnesses against varied response shapes.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ net::listener ──▶ http::server ──▶ shaping::params
//!                     (bounded accept)  (hyper http1,    (validate)
//!                                        request id,         │
//!                                        trace span)         ▼
//!                                                        sleep(time)
//!                                                            │
//!     Client Response                                        ▼
//!     ◀────────────── ShapedResponse ◀─── shaping::response (headers + body)
//!
//!     Cross-cutting: config, observability, lifecycle
//! ```

// Core subsystems
pub mod http;
pub mod net;
pub mod shaping;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::SimulatorConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
