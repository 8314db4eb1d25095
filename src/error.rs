// src/error.rs
//! Error taxonomy for the API surface.
//!
//! Only two of these variants ever reach the wire directly: `BadRequest`
//! (missing required input) and `Configuration` (missing required
//! credential). Upstream failures and timeouts during generation are masked
//! by the demo fallback in `veo_client`, and metadata parse failures are
//! swallowed into defaults in `openai_client`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Configuration(String),
    #[error("{0}")]
    Upstream(String),
    #[error("Video generation timed out or failed")]
    Timeout,
    #[error("Failed to parse upstream response: {0}")]
    Parse(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Configuration(_)
            | ApiError::Upstream(_)
            | ApiError::Timeout
            | ApiError::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Upstream(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_maps_to_400() {
        assert_eq!(
            ApiError::BadRequest("Prompt is required".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn everything_else_maps_to_500() {
        assert_eq!(
            ApiError::Configuration("missing key".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Upstream("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::Timeout.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
