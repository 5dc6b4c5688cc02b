//! Upstream relay subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound path-and-query
//!     → path.rs (strip mount prefix, reject empty/foreign paths)
//!     → variants.rs (base URL + residual, alternate title spellings)
//!     → fetch.rs (try candidates in order with the header profile)
//!     → translate.rs (JSON / text / binary, cache directives)
//!     → Send to client
//!
//! Any failure:
//!     → error.rs (RelayError → JSON envelope with mirrored status)
//! ```
//!
//! # Request States
//! ```text
//! Start → PathResolved → CandidateAttempt* → Success | AllCandidatesFailed → ResponseEmitted
//! ```
//!
//! # Design Decisions
//! - Stateless per request; the relay holds only immutable config and a
//!   shared HTTP client
//! - Variant expansion is pure; the orchestrator only sees URLs
//! - Errors never escape the handler: everything becomes an envelope

pub mod error;
pub mod fetch;
pub mod headers;
pub mod path;
pub mod service;
pub mod translate;
pub mod variants;

pub use error::{AttemptFailure, ErrorEnvelope, RelayError, SetupError, UpstreamFailure};
pub use headers::HeaderProfile;
pub use service::Relay;
