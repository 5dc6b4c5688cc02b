//! Scan relay library.
//!
//! Forwards manga page and chapter requests to the scan host under a fixed
//! mount prefix, trying alternate title spellings, and relays JSON, text and
//! images back with cache directives or a JSON error envelope.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod scans;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::{Relay, RelayError};
