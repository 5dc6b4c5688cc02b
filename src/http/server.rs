//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID)
//! - Bind server to listener with graceful shutdown
//! - Dispatch every non-status request to the relay

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::request::{MakeRequestUuidV4, RequestIdExt, X_REQUEST_ID};
use crate::observability::metrics;
use crate::relay::{Relay, SetupError};

/// Path of the relay's own status endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

/// HTTP server for the scan relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, SetupError> {
        let relay = Arc::new(Relay::from_config(&config)?);
        let router = Self::build_router(AppState { relay });
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route(HEALTH_PATH, get(health_handler))
            .fallback(relay_handler)
            .with_state(state)
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mount_prefix = %self.config.upstream.mount_prefix,
            upstream = %self.config.upstream.base_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

#[derive(Serialize)]
struct HealthStatus<'a> {
    status: &'static str,
    version: &'static str,
    upstream: &'a str,
}

async fn health_handler(State(state): State<AppState>) -> Response {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        upstream: state.relay.upstream_base(),
    })
    .into_response()
}

/// Relay handler: everything outside `/health` lands here.
async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request.request_id().to_string();
    let method = request.method().clone();
    let raw = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| request.uri().path())
        .to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %raw,
        "Relaying request"
    );

    let response = match state.relay.forward(&method, &raw).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(
                request_id = %request_id,
                path = %raw,
                kind = err.kind(),
                status = %err.status(),
                error = %err,
                "Relay failed"
            );
            err.into_response()
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}
