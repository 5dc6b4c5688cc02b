//! Reader-side client talking to the relay.

use axum::http::StatusCode;
use thiserror::Error;
use url::Url;

use crate::config::schema::DEFAULT_MOUNT_PREFIX;
use crate::scans::chapters::{self, ChapterMap};

/// Errors returned by [`ScanClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("relay answered {status} for {url}")]
    Status { status: StatusCode, url: String },
}

/// Fetches chapter metadata through a running relay.
#[derive(Debug, Clone)]
pub struct ScanClient {
    http: reqwest::Client,
    base: Url,
    mount_prefix: String,
}

impl ScanClient {
    pub fn new(relay_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            http: reqwest::Client::new(),
            base: Url::parse(relay_url)?,
            mount_prefix: DEFAULT_MOUNT_PREFIX.to_string(),
        })
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_mount_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.mount_prefix = prefix.into();
        self
    }

    /// Resolve a relay-relative path (or absolute URL) against the relay.
    pub fn url(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base.join(path)?)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path)?;
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(response.json().await?)
    }

    /// Relay status document.
    pub async fn status(&self) -> Result<serde_json::Value, ClientError> {
        self.get_json(crate::http::HEALTH_PATH).await
    }

    /// Chapter map behind `path`, e.g.
    /// `/api/anime-sama/get_nb_chap_et_img.php?oeuvre=One%20Piece`.
    pub async fn chapter_map(&self, path: &str) -> Result<ChapterMap, ClientError> {
        let map: ChapterMap = self.get_json(path).await?;
        tracing::debug!(path = %path, chapters = chapters::count_chapters(&map), "Chapter map fetched");
        Ok(map)
    }

    pub async fn chapter_count(&self, path: &str) -> Result<usize, ClientError> {
        Ok(chapters::count_chapters(&self.chapter_map(path).await?))
    }

    /// Absolute page URLs of `chapter`, empty when the chapter is unknown.
    pub async fn chapter_pages(
        &self,
        path: &str,
        title: &str,
        chapter: u32,
    ) -> Result<Vec<Url>, ClientError> {
        let map = self.chapter_map(path).await?;
        let pages = chapters::pages_in_chapter(&map, chapter);
        chapters::chapter_page_paths(&self.mount_prefix, title, chapter, pages)
            .iter()
            .map(|page| self.url(page))
            .collect()
    }
}
