//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, the mount prefix and the upstream base URL
//! - Check the header profile and substitution table
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first; at most one per field
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: {value:?} is not a socket address")]
    Address { field: &'static str, value: String },

    #[error("upstream.mount_prefix: {0}")]
    MountPrefix(String),

    #[error("upstream.base_url: {0}")]
    BaseUrl(String),

    #[error("upstream.headers: {0}")]
    Headers(String),

    #[error("upstream.variants[{index}]: pattern must not be empty")]
    EmptyPattern { index: usize },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let upstream = &config.upstream;
    if let Some(problem) = mount_prefix_problem(&upstream.mount_prefix) {
        errors.push(ValidationError::MountPrefix(problem));
    }
    if let Some(problem) = base_url_problem(&upstream.base_url) {
        errors.push(ValidationError::BaseUrl(problem));
    }
    if let Err(e) = upstream.headers.to_header_map() {
        errors.push(ValidationError::Headers(e.to_string()));
    }
    for (index, substitution) in upstream.variants.iter().enumerate() {
        if substitution.pattern.is_empty() {
            errors.push(ValidationError::EmptyPattern { index });
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.connect_secs"));
    }
    if config.timeouts.attempt_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.attempt_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field,
            value: value.to_string(),
        });
    }
}

fn mount_prefix_problem(prefix: &str) -> Option<String> {
    if !prefix.starts_with('/') {
        Some(format!("{prefix:?} must start with '/'"))
    } else if prefix == "/" {
        Some("the relay cannot be mounted at the root".to_string())
    } else if prefix.ends_with('/') {
        Some(format!("{prefix:?} must not end with '/'"))
    } else if prefix.contains('?') {
        Some(format!("{prefix:?} must not contain a query"))
    } else {
        None
    }
}

fn base_url_problem(base: &str) -> Option<String> {
    let url = match Url::parse(base) {
        Ok(url) => url,
        Err(e) => return Some(format!("{base:?}: {e}")),
    };
    if !matches!(url.scheme(), "http" | "https") {
        Some(format!("{base:?} must use http or https"))
    } else if url.host_str().is_none() {
        Some(format!("{base:?} has no host"))
    } else if url.query().is_some() || url.fragment().is_some() {
        Some(format!("{base:?} must not carry a query or fragment"))
    } else if base.ends_with('/') {
        Some(format!("{base:?} must not end with '/'"))
    } else {
        None
    }
}
