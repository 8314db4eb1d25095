// src/veo_client.rs
// Google Veo video generation client.
//
// Veo runs as a long-running operation: the initial request usually returns
// an operation name instead of a finished video, which we poll until done or
// until the attempt budget runs out. Any upstream failure along the way
// resolves to a fixed demo payload rather than an error, so the service stays
// demonstrable without live credentials. That fallback is a deliberate
// contract, not suppressed error handling.

use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::error::ApiError;

/// Fixed interval between operation status polls.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Maximum number of polls before giving up (60 * 5s = 5 minutes).
pub const MAX_POLL_ATTEMPTS: u32 = 60;

const DEMO_VIDEO_URL: &str = "https://storage.googleapis.com/demo-videos/sample-dog-video.mp4";
const DEMO_THUMBNAIL_URL: &str =
    "https://images.unsplash.com/photo-1587300003388-59208cc962cb?w=400&h=711&fit=crop";

/// Directives appended to every prompt so output fits the Shorts format.
const PROMPT_SUFFIX: &str = ". Vertical video format 9:16 aspect ratio, duration 15-30 seconds, \
                             perfect for YouTube Shorts, high quality 4K, smooth motion";

#[derive(Debug, Clone)]
pub struct VeoClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub video_url: String,
    pub thumbnail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_demo: bool,
}

impl GenerationResult {
    pub fn demo(message: &str) -> Self {
        Self {
            video_url: DEMO_VIDEO_URL.to_string(),
            thumbnail: DEMO_THUMBNAIL_URL.to_string(),
            duration: None,
            message: Some(message.to_string()),
            is_demo: true,
        }
    }
}

/// Shorts-format the raw user prompt.
pub fn format_prompt(prompt: &str) -> String {
    format!("{}{}", prompt.trim(), PROMPT_SUFFIX)
}

/// The provider reports the video URL either at the top level or nested
/// under `video.uri` depending on the model version.
fn extract_video_url(data: &Value) -> Option<String> {
    data["videoUrl"]
        .as_str()
        .or_else(|| data["video"]["uri"].as_str())
        .map(|s| s.to_string())
}

impl VeoClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }

    /// Generate a vertical short from a text prompt.
    ///
    /// Returns `Err` only for an empty prompt; every upstream failure mode
    /// (non-OK response, network error, poll timeout) resolves to
    /// `Ok(demo payload)` with `is_demo: true`.
    pub async fn generate(&self, prompt: &str) -> Result<GenerationResult, ApiError> {
        if prompt.trim().is_empty() {
            return Err(ApiError::BadRequest("Prompt is required".to_string()));
        }

        match self.try_generate(prompt).await {
            Ok(result) => Ok(result),
            Err(e) => {
                error!("Video generation failed, falling back to demo: {}", e);
                let message = match e {
                    ApiError::Upstream(_) => {
                        "Demo mode: Using sample video. Configure GOOGLE_API_KEY for real generation."
                    }
                    _ => "Demo mode: Using sample video. Check your API configuration.",
                };
                Ok(GenerationResult::demo(message))
            }
        }
    }

    /// The live generation path. Errors here are never surfaced to callers;
    /// `generate` maps them all to the demo payload.
    async fn try_generate(&self, prompt: &str) -> Result<GenerationResult, ApiError> {
        let formatted_prompt = format_prompt(prompt);
        let url = format!(
            "{}/models/veo-3.1:generateVideo?key={}",
            self.base_url, self.api_key
        );

        let body = json!({
            "prompt": formatted_prompt,
            "config": {
                "aspectRatio": "9:16",
                "duration": 20,
                "quality": "high"
            }
        });

        info!("🎬 Requesting video generation for prompt: '{}'", prompt);

        let response = self.client.post(&url).json(&body).send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!("Veo API error: {}", error_text)));
        }

        let data: Value = response.json().await?;

        let mut video_url = extract_video_url(&data);

        // Asynchronous operation: no immediate URL, poll the returned handle.
        if video_url.is_none() {
            if let Some(operation_name) = data["name"].as_str() {
                video_url = Some(self.poll_operation(operation_name).await?);
            }
        }

        let video_url = video_url.ok_or(ApiError::Timeout)?;

        info!("✅ Video generated: {}", video_url);
        let thumbnail = data["thumbnail"]
            .as_str()
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("{}-thumbnail.jpg", video_url));

        Ok(GenerationResult {
            video_url,
            thumbnail,
            duration: Some(data["duration"].as_u64().unwrap_or(20)),
            message: None,
            is_demo: false,
        })
    }

    /// Poll a long-running operation until it reports done, at most
    /// `MAX_POLL_ATTEMPTS` times. A failed poll consumes an attempt; the
    /// budget bounds total wall-clock wait regardless of upstream behavior.
    async fn poll_operation(&self, operation_name: &str) -> Result<String, ApiError> {
        let url = format!("{}/{}?key={}", self.base_url, operation_name, self.api_key);

        for attempt in 1..=MAX_POLL_ATTEMPTS {
            tokio::time::sleep(POLL_INTERVAL).await;

            let response = match self.client.get(&url).send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!("Poll attempt {}/{} failed: {}", attempt, MAX_POLL_ATTEMPTS, e);
                    continue;
                }
            };

            if !response.status().is_success() {
                warn!(
                    "Poll attempt {}/{} returned status {}",
                    attempt,
                    MAX_POLL_ATTEMPTS,
                    response.status()
                );
                continue;
            }

            let status: Value = match response.json().await {
                Ok(status) => status,
                Err(e) => {
                    warn!("Poll attempt {}/{} unparseable: {}", attempt, MAX_POLL_ATTEMPTS, e);
                    continue;
                }
            };

            if status["done"].as_bool().unwrap_or(false) {
                return extract_video_url(&status["response"]).ok_or_else(|| {
                    ApiError::Parse(format!(
                        "Operation {} done without a video URL",
                        operation_name
                    ))
                });
            }
        }

        warn!(
            "Operation {} not done after {} attempts",
            operation_name, MAX_POLL_ATTEMPTS
        );
        Err(ApiError::Timeout)
    }
}
