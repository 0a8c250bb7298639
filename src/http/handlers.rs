//! Route handlers: health check, binary proxy, base64 download.

use std::borrow::Cow;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::header::{self, HeaderValue};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::response::{ApiError, Endpoint};
use crate::http::server::AppState;
use crate::relay::DEFAULT_CONTENT_TYPE;

/// Cache policy for proxied images (one hour).
pub const PROXY_CACHE_CONTROL: &str = "public, max-age=3600";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    #[serde(rename = "imageUrl")]
    pub image_url: Option<Value>,
}

impl DownloadRequest {
    /// The locator as text. `null`, `false`, `0` and `""` count as absent;
    /// other non-string values are passed on as their JSON text and fail URL
    /// parsing.
    pub fn locator(&self) -> Option<Cow<'_, str>> {
        match self.image_url.as_ref()? {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            other => Some(Cow::Owned(other.to_string())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub success: bool,
    pub data_uri: String,
    pub content_type: String,
    pub size: usize,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// GET /proxy-image?url=...
pub async fn proxy_image(
    State(state): State<AppState>,
    query: Result<Query<ProxyQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let endpoint = Endpoint::ProxyImage;
    let raw = match &query {
        Ok(Query(q)) => q.url.as_deref(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable proxy query");
            None
        }
    };

    let url = state
        .relay
        .validate(raw)
        .map_err(|e| ApiError::from_relay(endpoint, e.into()))?;

    tracing::info!(url = %url, "Proxying image request");

    let image = state
        .relay
        .fetch(&url)
        .await
        .map_err(|e| ApiError::from_relay(endpoint, e))?;

    let content_type = HeaderValue::from_str(&image.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, HeaderValue::from_static(PROXY_CACHE_CONTROL)),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
        ],
        image.body,
    )
        .into_response())
}

/// POST /download-image with `{"imageUrl": "..."}`
pub async fn download_image(
    State(state): State<AppState>,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<Json<DownloadResponse>, ApiError> {
    let endpoint = Endpoint::DownloadImage;
    let raw = match &payload {
        Ok(Json(body)) => body.locator(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable download body");
            None
        }
    };

    let url = state
        .relay
        .validate(raw.as_deref())
        .map_err(|e| ApiError::from_relay(endpoint, e.into()))?;

    tracing::info!(url = %url, "Downloading and converting image to base64");

    let image = state
        .relay
        .fetch(&url)
        .await
        .map_err(|e| ApiError::from_relay(endpoint, e))?;

    tracing::info!(size = image.size(), "Converted image to base64");

    Ok(Json(DownloadResponse {
        success: true,
        data_uri: image.to_data_uri(),
        content_type: image.content_type.clone(),
        size: image.size(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> DownloadRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn falsy_image_urls_are_absent() {
        for json in [r#"{}"#, r#"{"imageUrl":null}"#, r#"{"imageUrl":false}"#, r#"{"imageUrl":0}"#, r#"{"imageUrl":""}"#] {
            assert_eq!(request(json).locator(), None, "{json}");
        }
    }

    #[test]
    fn non_string_image_urls_keep_their_text() {
        assert_eq!(request(r#"{"imageUrl":123}"#).locator().as_deref(), Some("123"));
        assert_eq!(request(r#"{"imageUrl":true}"#).locator().as_deref(), Some("true"));
        assert_eq!(
            request(r#"{"imageUrl":"https://cdn.openai.com/a.png"}"#).locator().as_deref(),
            Some("https://cdn.openai.com/a.png")
        );
    }
}
