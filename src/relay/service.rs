//! The relay pipeline: resolve, expand, fetch, translate.

use std::time::Duration;

use axum::{http::Method, response::Response};
use url::Url;

use crate::config::RelayConfig;
use crate::relay::error::{RelayError, SetupError};
use crate::relay::fetch::Fetcher;
use crate::relay::path::PathResolver;
use crate::relay::translate::{CachePolicy, Translator};
use crate::relay::variants::UrlBuilder;

/// Immutable relay shared by every request task.
#[derive(Debug, Clone)]
pub struct Relay {
    resolver: PathResolver,
    urls: UrlBuilder,
    fetcher: Fetcher,
    translator: Translator,
}

impl Relay {
    pub fn new(
        resolver: PathResolver,
        urls: UrlBuilder,
        fetcher: Fetcher,
        translator: Translator,
    ) -> Self {
        Self {
            resolver,
            urls,
            fetcher,
            translator,
        }
    }

    /// Build the relay and its upstream client from configuration.
    pub fn from_config(config: &RelayConfig) -> Result<Self, SetupError> {
        let upstream = &config.upstream;

        let base = Url::parse(&upstream.base_url).map_err(|e| SetupError::BaseUrl {
            url: upstream.base_url.clone(),
            reason: e.to_string(),
        })?;
        let host = base
            .host_str()
            .ok_or_else(|| SetupError::BaseUrl {
                url: upstream.base_url.clone(),
                reason: "missing host".to_string(),
            })?
            .to_string();

        let headers = upstream.headers.to_header_map()?;

        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .timeout(Duration::from_secs(config.timeouts.attempt_secs));
        if !upstream.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        tracing::debug!(
            base_url = %upstream.base_url,
            mount_prefix = %upstream.mount_prefix,
            headers = headers.len(),
            variants = upstream.variants.len(),
            "Relay configured"
        );

        Ok(Self::new(
            PathResolver::new(upstream.mount_prefix.clone()),
            UrlBuilder::new(
                upstream.base_url.trim_end_matches('/'),
                upstream.variants.clone(),
            ),
            Fetcher::new(client, headers, host, upstream.error_body_limit),
            Translator::new(CachePolicy::from_config(&config.cache)),
        ))
    }

    pub fn mount_prefix(&self) -> &str {
        self.resolver.prefix()
    }

    pub fn upstream_base(&self) -> &str {
        self.urls.base()
    }

    /// Relay one inbound request given its method and raw path-and-query.
    pub async fn forward(&self, method: &Method, raw: &str) -> Result<Response, RelayError> {
        let residual = self.resolver.resolve(raw)?;
        let candidates = self.urls.candidates(residual);
        tracing::debug!(residual = %residual, candidates = ?candidates, "Path resolved");

        let upstream = self.fetcher.fetch_first(method, &candidates).await?;
        self.translator.translate(upstream).await
    }
}
