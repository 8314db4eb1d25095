// src/handlers/auth.rs
//! OAuth bootstrap endpoints.
//!
//! `/api/auth/url` hands out the Google consent URL; Google redirects back
//! to `/api/auth/callback` with an authorization code, which we exchange for
//! tokens and echo the refresh token for the operator to put in the
//! environment.

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
}

/// GET /api/auth/url - Google consent URL for the upload scope.
pub async fn auth_url(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    match state.youtube_client.as_ref() {
        Some(youtube) => Json(json!({ "url": youtube.consent_url() })).into_response(),
        None => ApiError::Configuration(
            "YouTube OAuth not configured. Set YOUTUBE_CLIENT_ID and YOUTUBE_CLIENT_SECRET.".to_string(),
        )
        .into_response(),
    }
}

/// GET /api/auth/callback?code=... - exchange the authorization code.
pub async fn oauth_callback(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> impl IntoResponse {
    let Some(code) = params.code else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No authorization code provided" })),
        )
            .into_response();
    };

    let Some(youtube) = state.youtube_client.as_ref() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to exchange authorization code" })),
        )
            .into_response();
    };

    match youtube.exchange_code(&code).await {
        Ok(tokens) => {
            let refresh_token = tokens.refresh_token.unwrap_or_default();
            Json(json!({
                "message": "Authorization successful! Add this refresh token to your .env file:",
                "refreshToken": refresh_token,
                "instruction": format!("Set YOUTUBE_REFRESH_TOKEN={}", refresh_token)
            }))
            .into_response()
        }
        Err(e) => {
            tracing::error!("OAuth callback error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to exchange authorization code" })),
            )
                .into_response()
        }
    }
}

pub fn routes() -> Router {
    Router::new()
        .route("/api/auth/url", get(auth_url))
        .route("/api/auth/callback", get(oauth_callback))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn callback_without_code_is_a_400() {
        let state = Arc::new(AppState::from_config(Config::empty()));
        let response = oauth_callback(Extension(state), Query(CallbackParams { code: None }))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "No authorization code provided");
    }

    #[tokio::test]
    async fn callback_without_oauth_config_is_a_500() {
        let state = Arc::new(AppState::from_config(Config::empty()));
        let response = oauth_callback(
            Extension(state),
            Query(CallbackParams {
                code: Some("4/abc".to_string()),
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
