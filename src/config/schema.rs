//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files, and
//! every field has a default matching the production deployment, so an empty
//! file (or no file at all) yields a working relay.

use serde::{Deserialize, Serialize};

use crate::relay::headers::HeaderProfile;

/// Root configuration for the scan relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream scan host, mount prefix and request shaping.
    pub upstream: UpstreamConfig,

    /// Timeout configuration for upstream attempts.
    pub timeouts: TimeoutConfig,

    /// Cache directives attached to relayed bodies.
    pub cache: CacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Upstream scan host configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Path prefix the relay is mounted under (no trailing slash).
    pub mount_prefix: String,

    /// Base URL every residual path is appended to (no trailing slash).
    pub base_url: String,

    /// Headers sent with every upstream attempt.
    pub headers: HeaderProfile,

    /// Alternate title spellings tried when the original path fails.
    pub variants: Vec<Substitution>,

    /// Maximum number of characters of an upstream error body echoed back.
    pub error_body_limit: usize,

    /// Honour HTTP(S)_PROXY environment variables for upstream traffic.
    pub system_proxy: bool,
}

pub const DEFAULT_MOUNT_PREFIX: &str = "/api/anime-sama";
pub const DEFAULT_BASE_URL: &str = "https://anime-sama.si/s2/scans";
pub const DEFAULT_SITE_ORIGIN: &str = "https://anime-sama.si";

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            mount_prefix: DEFAULT_MOUNT_PREFIX.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            headers: HeaderProfile::site_mimicking(DEFAULT_SITE_ORIGIN),
            variants: default_variants(),
            error_body_limit: 500,
            system_proxy: true,
        }
    }
}

/// A textual substitution producing one alternate candidate path.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Substitution {
    /// Text to look for in the residual path (matched as-is, still encoded).
    pub pattern: String,

    /// Text every occurrence is replaced with.
    pub replacement: String,

    /// Match the pattern ignoring ASCII case.
    #[serde(default = "default_ignore_case")]
    pub ignore_case: bool,
}

impl Substitution {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
            ignore_case: true,
        }
    }
}

fn default_ignore_case() -> bool {
    true
}

/// The scan host spells multi-word titles several ways; the browser always
/// asks with the space-encoded form.
fn default_variants() -> Vec<Substitution> {
    vec![
        Substitution::new("One%20Piece", "One-Piece"),
        Substitution::new("One%20Piece", "one-piece"),
    ]
}

/// Timeout configuration for upstream attempts.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Total time allowed for one candidate attempt, in seconds.
    pub attempt_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            attempt_secs: 30,
        }
    }
}

/// Cache lifetimes for relayed bodies.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// `max-age` for parsed JSON bodies (chapter metadata changes often).
    pub json_max_age_secs: u64,

    /// `max-age` for binary bodies, sent with `immutable`.
    pub binary_max_age_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            json_max_age_secs: 300,
            binary_max_age_secs: 31_536_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as flattened JSON instead of the human format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
