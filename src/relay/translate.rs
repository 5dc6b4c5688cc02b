//! Response translation.
//!
//! # Responsibilities
//! - Classify the successful upstream body by its declared content type
//! - Re-parse textual bodies as JSON when possible
//! - Attach the cache directive that matches the body kind
//!
//! # Design Decisions
//! - Bodies are read fully into memory; pages are small images
//! - Exactly one `content-type` and at most one `cache-control` header
//! - Upstream headers other than the content type are not forwarded

use axum::{
    body::Bytes,
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};

use crate::config::schema::CacheConfig;
use crate::observability::metrics;
use crate::relay::error::{error_chain, RelayError};

/// Content type assumed when the upstream sends none.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Classification of an upstream body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Text,
    Binary,
}

impl BodyKind {
    pub fn from_content_type(content_type: &str) -> Self {
        let content_type = content_type.to_ascii_lowercase();
        if content_type.contains("application/json") {
            BodyKind::Json
        } else if content_type.contains("text/html") || content_type.contains("text/plain") {
            BodyKind::Text
        } else {
            BodyKind::Binary
        }
    }

    pub fn is_textual(self) -> bool {
        !matches!(self, BodyKind::Binary)
    }
}

/// Cache directives attached to relayed bodies.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    json: HeaderValue,
    binary: HeaderValue,
}

impl CachePolicy {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            json: HeaderValue::from_str(&format!("public, max-age={}", config.json_max_age_secs))
                .unwrap_or_else(|_| HeaderValue::from_static("public, max-age=300")),
            binary: HeaderValue::from_str(&format!(
                "public, max-age={}, immutable",
                config.binary_max_age_secs
            ))
            .unwrap_or_else(|_| HeaderValue::from_static("public, max-age=31536000, immutable")),
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

/// Turns a successful upstream response into the outbound response.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    cache: CachePolicy,
}

impl Translator {
    pub fn new(cache: CachePolicy) -> Self {
        Self { cache }
    }

    pub async fn translate(&self, upstream: reqwest::Response) -> Result<Response, RelayError> {
        let url = upstream.url().to_string();
        let content_type = upstream
            .headers()
            .get(CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(FALLBACK_CONTENT_TYPE));
        let kind = BodyKind::from_content_type(content_type.to_str().unwrap_or_default());

        let read_failed = |err: reqwest::Error| {
            tracing::error!(url = %url, error = %err, "Failed to read upstream body");
            RelayError::UpstreamTransport {
                message: error_chain(&err),
                tried: vec![url.clone()],
            }
        };

        if kind.is_textual() {
            let text = upstream.text().await.map_err(read_failed)?;
            Ok(self.render_text(content_type, text))
        } else {
            let bytes = upstream.bytes().await.map_err(read_failed)?;
            Ok(self.render_binary(content_type, bytes))
        }
    }

    /// JSON when `text` parses, the raw text under its own type otherwise.
    pub fn render_text(&self, content_type: HeaderValue, text: String) -> Response {
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => {
                tracing::debug!("Relaying parsed JSON body");
                metrics::record_body("json");
                (
                    StatusCode::OK,
                    [
                        (CONTENT_TYPE, HeaderValue::from_static("application/json")),
                        (CACHE_CONTROL, self.cache.json.clone()),
                    ],
                    Json(value),
                )
                    .into_response()
            }
            Err(_) => {
                tracing::debug!(content_type = ?content_type, "Relaying raw text body");
                metrics::record_body("text");
                (StatusCode::OK, [(CONTENT_TYPE, content_type)], text).into_response()
            }
        }
    }

    pub fn render_binary(&self, content_type: HeaderValue, bytes: Bytes) -> Response {
        tracing::debug!(content_type = ?content_type, len = bytes.len(), "Relaying binary body");
        metrics::record_body("binary");
        (
            StatusCode::OK,
            [
                (CONTENT_TYPE, content_type),
                (CACHE_CONTROL, self.cache.binary.clone()),
            ],
            bytes,
        )
            .into_response()
    }
}
