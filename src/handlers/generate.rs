// src/handlers/generate.rs
//! POST /api/generate - one-shot video generation.

use axum::{
    extract::Extension,
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Generate a video for a prompt. Returns the generation result, or the
/// demo payload when the upstream is unavailable. Missing prompt is a 400;
/// missing API key is a 500 configuration error (never demoed).
pub async fn generate_video(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> impl IntoResponse {
    let prompt = request.prompt.unwrap_or_default();
    if prompt.trim().is_empty() {
        return ApiError::BadRequest("Prompt is required".to_string()).into_response();
    }

    let Some(veo) = state.veo_client.as_ref() else {
        return ApiError::Configuration(
            "Google API key not configured. Please add GOOGLE_API_KEY to your environment variables.".to_string(),
        )
        .into_response();
    };

    match veo.generate(&prompt).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => e.into_response(),
    }
}

pub fn routes() -> Router {
    Router::new().route("/api/generate", post(generate_video))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::to_bytes;
    use axum::http::StatusCode;

    async fn call(prompt: Option<&str>) -> (StatusCode, serde_json::Value) {
        let state = Arc::new(AppState::from_config(Config::empty()));
        let request = GenerateRequest {
            prompt: prompt.map(|p| p.to_string()),
        };
        let response = generate_video(Extension(state), Json(request))
            .await
            .into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn empty_prompt_is_a_400() {
        let (status, body) = call(Some("")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Prompt is required");

        let (status, _) = call(None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_api_key_is_a_500_not_a_demo() {
        let (status, body) = call(Some("golden retriever puppy")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("GOOGLE_API_KEY"));
        assert!(body.get("isDemo").is_none());
    }
}
