// src/youtube_client.rs
// YouTube Data API v3 client: OAuth2 token plumbing and video upload.
// Docs: https://developers.google.com/youtube/v3

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::error::ApiError;
use crate::openai_client::VideoMetadata;

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const UPLOAD_URL: &str = "https://www.googleapis.com/upload/youtube/v3/videos";

/// Pets & Animals.
const CATEGORY_ID: &str = "15";

#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

// ============================================================================
// Wire structures
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CodeExchangeResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Debug, Serialize)]
struct VideoSnippet {
    title: String,
    description: String,
    #[serde(rename = "categoryId")]
    category_id: String,
    tags: Vec<String>,
}

#[derive(Debug, Serialize)]
struct VideoStatus {
    #[serde(rename = "privacyStatus")]
    privacy_status: String,
    #[serde(rename = "selfDeclaredMadeForKids")]
    self_declared_made_for_kids: bool,
}

#[derive(Debug, Serialize)]
struct VideoResource {
    snippet: VideoSnippet,
    status: VideoStatus,
}

#[derive(Debug, Deserialize)]
pub struct VideoUploadResponse {
    pub id: String,
}

/// Public watch URL for an uploaded video id.
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}

impl YouTubeClient {
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client: Client::new(),
            client_id,
            client_secret,
            redirect_uri,
        }
    }

    /// Google consent URL for obtaining an authorization code with upload
    /// scope. The resulting code is redeemed at `/api/auth/callback`.
    pub fn consent_url(&self) -> String {
        format!(
            "https://accounts.google.com/o/oauth2/v2/auth\
             ?client_id={}&redirect_uri={}&response_type=code\
             &scope={}&access_type=offline&prompt=consent",
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode("https://www.googleapis.com/auth/youtube.upload"),
        )
    }

    /// Exchange a long-lived refresh token for a short-lived access token.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<AccessTokenResponse, ApiError> {
        let params = json!({
            "client_id": self.client_id,
            "client_secret": self.client_secret,
            "refresh_token": refresh_token,
            "grant_type": "refresh_token"
        });

        let response = self.client.post(TOKEN_URL).json(&params).send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!(
                "Failed to refresh token: {}",
                error_text
            )));
        }

        Ok(response.json().await?)
    }

    /// Exchange an OAuth authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<CodeExchangeResponse, ApiError> {
        let params = json!({
            "code": code,
            "client_id": self.client_id,
            "client_secret": self.client_secret,
            "redirect_uri": self.redirect_uri,
            "grant_type": "authorization_code"
        });

        let response = self.client.post(TOKEN_URL).json(&params).send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ApiError::Upstream(format!(
                "Failed to exchange code: {}",
                error_text
            )));
        }

        Ok(response.json().await?)
    }

    /// Fetch raw video bytes from the generation provider's hosting URL.
    pub async fn download_video(&self, video_url: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.client.get(video_url).send().await?;

        if !response.status().is_success() {
            return Err(ApiError::Upstream("Failed to download video".to_string()));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Multipart insert to videos.insert: JSON snippet/status part plus the
    /// raw media part. Uploads as public, not made for kids.
    pub async fn upload_video(
        &self,
        access_token: &str,
        video_data: Vec<u8>,
        metadata: &VideoMetadata,
    ) -> Result<VideoUploadResponse, ApiError> {
        let resource = VideoResource {
            snippet: VideoSnippet {
                title: metadata.title.clone(),
                description: metadata.description.clone(),
                category_id: CATEGORY_ID.to_string(),
                tags: metadata.tags.clone(),
            },
            status: VideoStatus {
                privacy_status: "public".to_string(),
                self_declared_made_for_kids: false,
            },
        };

        let metadata_json = serde_json::to_string(&resource)?;

        let form = reqwest::multipart::Form::new()
            .part(
                "snippet",
                reqwest::multipart::Part::text(metadata_json)
                    .mime_str("application/json")
                    .map_err(|e| ApiError::Upstream(e.to_string()))?,
            )
            .part(
                "media",
                reqwest::multipart::Part::bytes(video_data)
                    .file_name("video.mp4")
                    .mime_str("video/*")
                    .map_err(|e| ApiError::Upstream(e.to_string()))?,
            );

        let response = self
            .client
            .post(UPLOAD_URL)
            .query(&[("part", "snippet,status"), ("uploadType", "multipart")])
            .header("Authorization", format!("Bearer {}", access_token))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("YouTube upload failed: {}", error_text);
            return Err(ApiError::Upstream(format!(
                "Failed to upload video: {}",
                error_text
            )));
        }

        let upload_response: VideoUploadResponse = response.json().await?;
        info!(
            "✅ Video uploaded to YouTube: {} (ID: {})",
            metadata.title, upload_response.id
        );

        Ok(upload_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_url_templates_video_id() {
        assert_eq!(watch_url("abc123"), "https://www.youtube.com/watch?v=abc123");
    }

    #[test]
    fn consent_url_carries_upload_scope_and_redirect() {
        let client = YouTubeClient::new(
            "my-client".to_string(),
            "topsecret".to_string(),
            "http://localhost:3000/api/auth/callback".to_string(),
        );
        let url = client.consent_url();
        assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
        assert!(url.contains("client_id=my-client"));
        assert!(url.contains("youtube.upload"));
        assert!(url.contains("access_type=offline"));
        assert!(!url.contains("topsecret"));
    }

    #[test]
    fn video_resource_serializes_youtube_field_names() {
        let resource = VideoResource {
            snippet: VideoSnippet {
                title: "T".to_string(),
                description: "D".to_string(),
                category_id: CATEGORY_ID.to_string(),
                tags: vec!["shorts".to_string()],
            },
            status: VideoStatus {
                privacy_status: "public".to_string(),
                self_declared_made_for_kids: false,
            },
        };
        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["snippet"]["categoryId"], "15");
        assert_eq!(json["status"]["privacyStatus"], "public");
        assert_eq!(json["status"]["selfDeclaredMadeForKids"], false);
    }
}
