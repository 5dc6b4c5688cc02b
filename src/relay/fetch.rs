//! Fetch orchestration over candidate URLs.
//!
//! # Responsibilities
//! - Try each candidate in order with the fixed header profile
//! - Stop at the first 2xx response
//! - Record every failed attempt instead of raising it
//! - Summarise the failures once the list is exhausted
//!
//! # Design Decisions
//! - Attempts are sequential; each is bounded by the client's timeout
//! - No backoff between candidates: they are different URLs, not retries
//! - The orchestrator knows nothing about how candidates were derived

use axum::http::{HeaderMap, Method, StatusCode};

use crate::observability::metrics;
use crate::relay::error::{error_chain, AttemptFailure, RelayError, UpstreamFailure};

/// Sequentially fetches candidate URLs until one succeeds.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    headers: HeaderMap,
    upstream_host: String,
    error_body_limit: usize,
}

impl Fetcher {
    pub fn new(
        client: reqwest::Client,
        headers: HeaderMap,
        upstream_host: impl Into<String>,
        error_body_limit: usize,
    ) -> Self {
        Self {
            client,
            headers,
            upstream_host: upstream_host.into(),
            error_body_limit,
        }
    }

    /// Return the first successful response among `candidates`.
    pub async fn fetch_first(
        &self,
        method: &Method,
        candidates: &[String],
    ) -> Result<reqwest::Response, RelayError> {
        let mut last_error: Option<AttemptFailure> = None;
        let mut last_body: Option<String> = None;

        for (index, url) in candidates.iter().enumerate() {
            tracing::debug!(attempt = index + 1, url = %url, method = %method, "Trying upstream candidate");

            let result = self
                .client
                .request(method.clone(), url.as_str())
                .headers(self.headers.clone())
                .send()
                .await;

            match result {
                Ok(response) if response.status().is_success() => {
                    tracing::info!(attempt = index + 1, url = %url, status = %response.status(), "Upstream candidate succeeded");
                    metrics::record_attempt("success");
                    return Ok(response);
                }
                Ok(response) => {
                    let status = response.status();
                    tracing::warn!(attempt = index + 1, url = %url, status = %status, "Upstream candidate failed");
                    metrics::record_attempt("status");

                    last_body = self.read_error_body(response).await;
                    last_error = Some(AttemptFailure::Status {
                        status: status.as_u16(),
                        status_text: reason(status),
                        url: url.clone(),
                    });
                }
                Err(err) => {
                    let message = error_chain(&err);
                    tracing::warn!(attempt = index + 1, url = %url, error = %message, "Upstream candidate unreachable");
                    metrics::record_attempt("transport");

                    last_body = None;
                    last_error = Some(AttemptFailure::Transport {
                        error: message,
                        url: url.clone(),
                    });
                }
            }
        }

        tracing::error!(candidates = candidates.len(), "Every upstream candidate failed");
        Err(self.exhausted(candidates, last_error, last_body))
    }

    /// Summarise a failed candidate list from its final attempt.
    ///
    /// A final attempt without a status reports 404, except when it was the
    /// only candidate: that is a plain transport failure.
    fn exhausted(
        &self,
        candidates: &[String],
        last_error: Option<AttemptFailure>,
        last_body: Option<String>,
    ) -> RelayError {
        let tried = candidates.to_vec();

        let last_error = match last_error {
            Some(AttemptFailure::Transport { error, .. }) if tried.len() == 1 => {
                return RelayError::UpstreamTransport {
                    message: error,
                    tried,
                };
            }
            Some(failure) => failure,
            None => {
                return RelayError::UpstreamTransport {
                    message: "Erreur inconnue".to_string(),
                    tried,
                };
            }
        };

        let (status, details) = match &last_error {
            AttemptFailure::Status {
                status,
                status_text,
                ..
            } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                Some(status_text.clone()),
            ),
            AttemptFailure::Transport { .. } => (StatusCode::NOT_FOUND, None),
        };
        let hint = (status == StatusCode::NOT_FOUND).then(|| {
            format!(
                "L'URL demandée n'existe pas sur {}. Vérifiez le nom du manga, le numéro de chapitre et de page.",
                self.upstream_host
            )
        });

        RelayError::UpstreamStatus(Box::new(UpstreamFailure {
            status,
            details,
            url: last_error.url().to_string(),
            error_body: last_body,
            hint,
            tried,
            last_error,
        }))
    }

    async fn read_error_body(&self, response: reqwest::Response) -> Option<String> {
        match response.text().await {
            Ok(text) => Some(truncate_chars(&text, self.error_body_limit)),
            Err(err) => {
                tracing::debug!(error = %err, "Could not read upstream error body");
                None
            }
        }
    }
}

fn reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
