//! Image relay core.
//!
//! # Data Flow
//! ```text
//! raw locator (query param or JSON field)
//!     → policy.rs (presence, URL syntax, host allow-list)
//!     → fetch.rs (outbound GET, full buffering)
//!     → status check (non-success relayed to the caller)
//!     → FetchedImage (bytes + content type)
//!     → data_uri.rs (download mode only)
//! ```

pub mod data_uri;
pub mod fetch;
pub mod policy;

use std::sync::Arc;

use bytes::Bytes;
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

pub use data_uri::encode_data_uri;
pub use fetch::{FetchError, HttpFetcher, ImageFetcher, UpstreamResponse};
pub use policy::{HostPolicy, TargetError};

/// Content type assumed when the upstream does not send one.
pub const DEFAULT_CONTENT_TYPE: &str = "image/png";

/// Why a relay attempt failed.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Target(#[from] TargetError),

    #[error("upstream responded {status}")]
    Upstream {
        status: StatusCode,
        status_text: String,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// A successfully fetched image.
#[derive(Debug, Clone)]
pub struct FetchedImage {
    pub content_type: String,
    pub body: Bytes,
}

impl FetchedImage {
    pub fn size(&self) -> usize {
        self.body.len()
    }

    pub fn to_data_uri(&self) -> String {
        encode_data_uri(&self.content_type, &self.body)
    }
}

/// Validates locators and fetches them through an [`ImageFetcher`].
#[derive(Clone)]
pub struct Relay {
    policy: HostPolicy,
    fetcher: Arc<dyn ImageFetcher>,
}

impl Relay {
    pub fn new(policy: HostPolicy, fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self { policy, fetcher }
    }

    pub fn policy(&self) -> &HostPolicy {
        &self.policy
    }

    /// Check a client-supplied locator against the allow-list.
    pub fn validate(&self, raw: Option<&str>) -> Result<Url, TargetError> {
        self.policy.validate(raw)
    }

    /// Fetch a validated URL and buffer the image.
    pub async fn fetch(&self, url: &Url) -> Result<FetchedImage, RelayError> {
        let response = self.fetcher.fetch(url).await?;

        if !response.status.is_success() {
            tracing::warn!(
                url = %url,
                status = response.status.as_u16(),
                status_text = response.status_text(),
                "Failed to fetch image"
            );
            return Err(RelayError::Upstream {
                status: response.status,
                status_text: response.status_text().to_string(),
            });
        }

        Ok(FetchedImage {
            content_type: response
                .content_type
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            body: response.body,
        })
    }

    /// Validate then fetch in one step.
    pub async fn relay(&self, raw: Option<&str>) -> Result<FetchedImage, RelayError> {
        let url = self.validate(raw)?;
        self.fetch(&url).await
    }
}
