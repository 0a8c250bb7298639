//! Error responses.
//!
//! Every failure leaves the relay as `{"error": "<message>"}` JSON. Client
//! mistakes are 400, upstream refusals keep the upstream status, and
//! transport failures collapse to 500 with a per-endpoint message. Causes are
//! logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::relay::{RelayError, TargetError};

pub const INVALID_URL_FORMAT: &str = "Invalid URL format";
pub const INVALID_IMAGE_SOURCE: &str = "Invalid image source";

/// JSON error envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// The relay endpoints, for endpoint-specific wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    ProxyImage,
    DownloadImage,
}

impl Endpoint {
    /// Message for an absent locator.
    pub fn missing_message(self) -> &'static str {
        match self {
            Endpoint::ProxyImage => "Missing URL parameter",
            Endpoint::DownloadImage => "Missing imageUrl in request body",
        }
    }

    /// Message for a transport failure.
    pub fn failure_message(self) -> &'static str {
        match self {
            Endpoint::ProxyImage => "Error fetching image",
            Endpoint::DownloadImage => "Error downloading and converting image",
        }
    }
}

/// An HTTP error ready to be sent.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Map a relay failure to the response for `endpoint`, logging the cause.
    pub fn from_relay(endpoint: Endpoint, err: RelayError) -> Self {
        match err {
            RelayError::Target(target) => {
                tracing::debug!(?endpoint, error = %target, "Rejected image locator");
                let message = match target {
                    TargetError::Missing => endpoint.missing_message(),
                    TargetError::Malformed(_) => INVALID_URL_FORMAT,
                    TargetError::DisallowedHost(_) => INVALID_IMAGE_SOURCE,
                };
                Self::new(StatusCode::BAD_REQUEST, message)
            }
            RelayError::Upstream { status, status_text } => {
                Self::new(status, format!("Failed to fetch image: {status_text}"))
            }
            RelayError::Fetch(cause) => {
                tracing::error!(?endpoint, error = %cause, "Upstream fetch failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, endpoint.failure_message())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}
