//! Upstream image fetching.
//!
//! # Responsibilities
//! - Issue the outbound GET with the configured user agent
//! - Buffer successful bodies in memory, optionally capped
//! - Report transport failures as values instead of panics
//!
//! # Design Decisions
//! - One pooled `reqwest::Client` per process, shared by all requests
//! - No retries; a failed fetch is terminal for its request
//! - Non-success responses are returned as data so the caller can relay
//!   the upstream status

use std::time::Duration;

use bytes::{Bytes, BytesMut};
use futures_util::future::BoxFuture;
use hyper::ext::ReasonPhrase;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;

/// Errors raised while talking to an upstream host.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The upstream body exceeded `max_body_bytes`.
    #[error("upstream body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Transport(e.to_string())
    }
}

/// What the upstream host answered.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    /// Reason phrase sent on the status line, when it differs from the
    /// standard one for `status`.
    pub reason: Option<String>,
    /// Raw `content-type` header, if present and non-empty.
    pub content_type: Option<String>,
    /// Buffered body. Left empty for non-success statuses.
    pub body: Bytes,
}

impl UpstreamResponse {
    /// Reason phrase as the upstream sent it, falling back to the standard
    /// phrase for the status code.
    pub fn status_text(&self) -> &str {
        self.reason
            .as_deref()
            .or_else(|| self.status.canonical_reason())
            .unwrap_or("")
    }
}

/// Seam between the relay and the network.
pub trait ImageFetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<UpstreamResponse, FetchError>>;
}

/// Production fetcher backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    max_body_bytes: Option<usize>,
}

impl HttpFetcher {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }

    async fn get(&self, url: &Url) -> Result<UpstreamResponse, FetchError> {
        let mut response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        // hyper only records the phrase when it is not the canonical one.
        let reason = response
            .extensions()
            .get::<ReasonPhrase>()
            .map(|phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned());
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        if !status.is_success() {
            return Ok(UpstreamResponse {
                status,
                reason,
                content_type,
                body: Bytes::new(),
            });
        }

        let body = match self.max_body_bytes {
            None => response.bytes().await?,
            Some(limit) => {
                if response.content_length().is_some_and(|len| len > limit as u64) {
                    return Err(FetchError::BodyTooLarge { limit });
                }
                let mut buf = BytesMut::new();
                while let Some(chunk) = response.chunk().await? {
                    if buf.len() + chunk.len() > limit {
                        return Err(FetchError::BodyTooLarge { limit });
                    }
                    buf.extend_from_slice(&chunk);
                }
                buf.freeze()
            }
        };

        Ok(UpstreamResponse {
            status,
            reason,
            content_type,
            body,
        })
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<UpstreamResponse, FetchError>> {
        Box::pin(self.get(url))
    }
}
