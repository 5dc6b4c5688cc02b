//! Relay error taxonomy and the JSON envelopes the browser receives.
//!
//! Every failure is caught at the relay boundary and rendered through
//! [`IntoResponse`]; no error ever reaches the transport as a bare 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::relay::headers::HeaderProfileError;

/// Outcome of one failed candidate attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttemptFailure {
    /// The upstream answered with a non-2xx status.
    Status {
        status: u16,
        #[serde(rename = "statusText")]
        status_text: String,
        url: String,
    },
    /// The request never produced a response (DNS, connect, timeout, reset).
    Transport { error: String, url: String },
}

impl AttemptFailure {
    pub fn url(&self) -> &str {
        match self {
            AttemptFailure::Status { url, .. } | AttemptFailure::Transport { url, .. } => url,
        }
    }
}

/// Every candidate failed. Status and body describe the final candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamFailure {
    /// Final candidate's status, 404 when it never answered.
    pub status: StatusCode,
    /// Reason phrase of the final candidate's status.
    pub details: Option<String>,
    /// Final candidate URL.
    pub url: String,
    /// Leading part of the final candidate's error body.
    pub error_body: Option<String>,
    /// Reader-facing hint, set for 404s.
    pub hint: Option<String>,
    /// Candidate URLs in attempt order.
    pub tried: Vec<String>,
    /// Failure of the final candidate.
    pub last_error: AttemptFailure,
}

/// Errors produced while relaying one request.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("request path {received:?} is outside the relay mount")]
    InvalidRequestPath { received: String },

    #[error("nothing to relay after the mount prefix")]
    MissingPath { hint: String },

    #[error("{} upstream candidate(s) failed, reporting {}", .0.tried.len(), .0.status)]
    UpstreamStatus(Box<UpstreamFailure>),

    /// The only candidate never produced a response.
    #[error("upstream transport failure: {message}")]
    UpstreamTransport { message: String, tried: Vec<String> },
}

impl RelayError {
    /// Status the envelope is sent with.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidRequestPath { .. } | RelayError::MissingPath { .. } => {
                StatusCode::BAD_REQUEST
            }
            RelayError::UpstreamStatus(failure) => failure.status,
            RelayError::UpstreamTransport { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::InvalidRequestPath { .. } => "invalid_path",
            RelayError::MissingPath { .. } => "missing_path",
            RelayError::UpstreamStatus(failure) if failure.tried.len() > 1 => "variants_exhausted",
            RelayError::UpstreamStatus(_) => "upstream_status",
            RelayError::UpstreamTransport { .. } => "upstream_transport",
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        match self {
            RelayError::InvalidRequestPath { received } => ErrorEnvelope {
                received: Some(received.clone()),
                ..ErrorEnvelope::new("URL invalide")
            },
            RelayError::MissingPath { hint } => ErrorEnvelope {
                hint: Some(hint.clone()),
                ..ErrorEnvelope::new("Chemin manquant")
            },
            RelayError::UpstreamStatus(failure) => {
                let error = if failure.tried.len() > 1 {
                    "Aucune variante n'a fonctionné".to_string()
                } else {
                    format!("Erreur HTTP {}", failure.status.as_u16())
                };
                ErrorEnvelope {
                    details: failure.details.clone(),
                    url: Some(failure.url.clone()),
                    error_body: failure.error_body.clone(),
                    hint: failure.hint.clone(),
                    tried: failure.tried.clone(),
                    last_error: Some(failure.last_error.clone()),
                    ..ErrorEnvelope::new(error)
                }
            }
            RelayError::UpstreamTransport { message, tried } => ErrorEnvelope {
                message: Some(message.clone()),
                tried: tried.clone(),
                ..ErrorEnvelope::new("Erreur serveur")
            },
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.envelope())).into_response()
    }
}

/// Structured error body.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tried: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<AttemptFailure>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Self::default()
        }
    }
}

/// Errors building a relay from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid upstream header profile: {0}")]
    Headers(#[from] HeaderProfileError),

    #[error("invalid upstream base URL {url:?}: {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("failed to build upstream HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Render an error with its whole source chain, e.g.
/// `error sending request: client error (Connect): Connection refused`.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
