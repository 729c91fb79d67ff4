//! Retrieving master image bytes.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::{FetchError, MasterSource};

/// Largest master accepted by default (64 MiB).
pub const DEFAULT_MAX_MASTER_BYTES: u64 = 64 * 1024 * 1024;

/// Content types accepted from a remote master.
pub const ACCEPTED_CONTENT_TYPES: &[&str] = &["image/png", "image/jpeg", "image/webp", "image/gif"];

/// Upstream collaborator that produces encoded master bytes.
///
/// Implementations perform no retries; [`FetchError::is_retryable`] lets the
/// caller decide.
pub trait MasterFetcher: Send + Sync {
    fn fetch(
        &self,
        source: &MasterSource,
    ) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;
}

/// Fetches masters over HTTP(S), from local files, or from inline bytes.
///
/// Bodies and files larger than `max_bytes` are rejected without being
/// read in full.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http: Client,
    max_bytes: u64,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            http: Client::default(),
            max_bytes: DEFAULT_MAX_MASTER_BYTES,
        }
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fetcher whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            ..Self::default()
        })
    }

    /// Replace the size limit for fetched masters.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    fn too_large(&self, source: impl ToString) -> FetchError {
        FetchError::TooLarge {
            source_name: source.to_string(),
            limit: self.max_bytes,
        }
    }

    async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        debug!(url, "Fetching master");
        let mut resp = self.http.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        check_content_type(content_type.as_deref())?;

        if resp.content_length().is_some_and(|len| len > self.max_bytes) {
            return Err(self.too_large(url));
        }

        // Content-Length may be absent or wrong, so enforce the limit while reading.
        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await? {
            if (body.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(self.too_large(url));
            }
            body.extend_from_slice(&chunk);
        }
        debug!(url, bytes = body.len(), "Fetched master");
        Ok(body)
    }

    async fn read_path(&self, path: &Path) -> Result<Vec<u8>, FetchError> {
        let io_error = |source| FetchError::Io {
            path: path.to_path_buf(),
            source,
        };
        let len = tokio::fs::metadata(path).await.map_err(io_error)?.len();
        if len > self.max_bytes {
            return Err(self.too_large(path.display()));
        }
        tokio::fs::read(path).await.map_err(io_error)
    }
}

impl MasterFetcher for HttpFetcher {
    async fn fetch(&self, source: &MasterSource) -> Result<Vec<u8>, FetchError> {
        match source {
            MasterSource::Url(url) => self.fetch_url(url).await,
            MasterSource::Path(path) => self.read_path(path).await,
            MasterSource::Bytes(bytes) if bytes.len() as u64 > self.max_bytes => {
                Err(self.too_large(source))
            }
            MasterSource::Bytes(bytes) => Ok(bytes.clone()),
        }
    }
}

/// Accept a missing header (decode validates the bytes) or a listed image type.
fn check_content_type(header: Option<&str>) -> Result<(), FetchError> {
    let Some(raw) = header else {
        return Ok(());
    };

    let mime = raw
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if ACCEPTED_CONTENT_TYPES.contains(&mime.as_str()) {
        Ok(())
    } else {
        Err(FetchError::UnsupportedContentType(raw.to_string()))
    }
}
