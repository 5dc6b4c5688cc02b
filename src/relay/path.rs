//! Inbound path resolution.
//!
//! # Responsibilities
//! - Strip the mount prefix from the raw path-and-query
//! - Reject paths outside the mount and mounts with nothing after them
//! - Hand the residual (still percent-encoded) to the URL builder
//!
//! # Design Decisions
//! - Prefix match is case-sensitive (paths are, hosts are not)
//! - The residual must start a new segment (`/`) or a query (`?`), so
//!   `/api/anime-samaXYZ` is not mistaken for a relay path

use crate::relay::error::RelayError;

/// Strips the relay mount from inbound paths.
#[derive(Debug, Clone)]
pub struct PathResolver {
    prefix: String,
}

impl PathResolver {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Resolve `raw` (path plus optional query) to the residual forwarded
    /// upstream.
    pub fn resolve<'a>(&self, raw: &'a str) -> Result<&'a str, RelayError> {
        let rest = raw
            .strip_prefix(self.prefix.as_str())
            .ok_or_else(|| RelayError::InvalidRequestPath {
                received: raw.to_string(),
            })?;

        if matches!(rest, "" | "/" | "?" | "/?") {
            return Err(RelayError::MissingPath {
                hint: self.expected_format(),
            });
        }

        if !rest.starts_with('/') && !rest.starts_with('?') {
            return Err(RelayError::InvalidRequestPath {
                received: raw.to_string(),
            });
        }

        Ok(rest)
    }

    fn expected_format(&self) -> String {
        format!(
            "Format attendu: {p}/One%20Piece/1/1.jpg ou {p}/get_nb_chap_et_img.php?oeuvre=...",
            p = self.prefix
        )
    }
}
