//! Outbound header profile.
//!
//! The scan host only answers requests that look like they come from its own
//! pages, so every attempt carries a fixed browser-like header set. The set is
//! configuration keyed by header name and is compiled once into a
//! [`HeaderMap`] when the relay is built.

use std::collections::BTreeMap;

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Header the HTTP client negotiates itself; it also owns decompression.
pub const CLIENT_MANAGED: &str = "accept-encoding";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Errors turning a profile into wire headers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HeaderProfileError {
    #[error("invalid header name {0:?}")]
    InvalidName(String),

    #[error("invalid value for header {0:?}")]
    InvalidValue(String),

    #[error("header {0:?} is negotiated by the HTTP client and cannot be overridden")]
    ClientManaged(String),
}

/// Immutable header set keyed by header name.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct HeaderProfile(BTreeMap<String, String>);

impl HeaderProfile {
    /// Headers imitating a same-origin fetch from `origin`'s own pages.
    pub fn site_mimicking(origin: &str) -> Self {
        let origin = origin.trim_end_matches('/');
        let referer = format!("{origin}/");

        [
            ("User-Agent", USER_AGENT),
            ("Accept", "application/json, text/plain, image/*, */*"),
            ("Accept-Language", "fr-FR,fr;q=0.9,en-US;q=0.8,en;q=0.7"),
            ("Referer", referer.as_str()),
            ("Origin", origin),
            ("DNT", "1"),
            ("Cache-Control", "no-cache"),
            ("Pragma", "no-cache"),
            ("Sec-Fetch-Dest", "empty"),
            ("Sec-Fetch-Mode", "cors"),
            ("Sec-Fetch-Site", "same-origin"),
        ]
        .into_iter()
        .collect()
    }

    /// Look up a header, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compile the profile into wire headers.
    pub fn to_header_map(&self) -> Result<HeaderMap, HeaderProfileError> {
        let mut map = HeaderMap::with_capacity(self.0.len());
        for (name, value) in self.iter() {
            let header = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| HeaderProfileError::InvalidName(name.to_string()))?;
            if header.as_str() == CLIENT_MANAGED {
                return Err(HeaderProfileError::ClientManaged(name.to_string()));
            }
            let value = HeaderValue::from_str(value)
                .map_err(|_| HeaderProfileError::InvalidValue(name.to_string()))?;
            map.insert(header, value);
        }
        Ok(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderProfile {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
