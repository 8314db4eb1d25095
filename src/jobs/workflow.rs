// src/jobs/workflow.rs
//! Per-job workflow: generation, then (optionally) upload.
//!
//! Each job runs as one spawned task of sequential awaits. The generation
//! poll sleeps inside `veo_client` are suspension points, so a job waiting
//! on Veo never starves other jobs or the server.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::jobs::{JobId, JobStatus};
use crate::openai_client::VideoMetadata;
use crate::youtube_client::watch_url;
use crate::AppState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub youtube_url: String,
    pub video_id: String,
    pub title: String,
    pub success: bool,
}

/// Outcome of the upload procedure short of a hard failure.
#[derive(Debug)]
pub enum UploadOutcome {
    Uploaded(UploadResult),
    /// Credentials absent: the video stays un-uploaded but the job is not an
    /// error. Carries the wire-visible explanation.
    NotConfigured { error: String, message: String },
}

/// Full workflow for one job: generate, then upload when requested.
pub async fn run(state: Arc<AppState>, job_id: JobId, auto_upload: bool) {
    let Some(job) = state.job_manager.get(&job_id).await else {
        warn!("Workflow started for unknown job {}", job_id);
        return;
    };

    let Some(veo) = state.veo_client.as_ref() else {
        state
            .job_manager
            .record_error(
                &job_id,
                "Google API key not configured. Please add GOOGLE_API_KEY to your environment variables.".to_string(),
            )
            .await;
        return;
    };

    let result = match veo.generate(&job.prompt).await {
        Ok(result) => result,
        Err(e) => {
            state.job_manager.record_error(&job_id, e.to_string()).await;
            return;
        }
    };

    state
        .job_manager
        .record_generation(&job_id, result.video_url.clone(), result.thumbnail.clone())
        .await;

    if auto_upload {
        if let Err(e) = state.job_manager.advance(&job_id, JobStatus::Uploading).await {
            warn!("{}", e);
            return;
        }
        run_upload_stage(&state, &job_id, &result.video_url, &job.prompt).await;
    } else {
        let _ = state.job_manager.advance(&job_id, JobStatus::Completed).await;
    }
}

/// Upload stage shared by auto-upload and manual upload. The job must
/// already be in `uploading`.
pub async fn run_upload_stage(state: &AppState, job_id: &str, video_url: &str, prompt: &str) {
    match run_upload(state, video_url, prompt).await {
        Ok(UploadOutcome::Uploaded(result)) => {
            state
                .job_manager
                .record_upload(job_id, Some(result.youtube_url))
                .await;
            let _ = state.job_manager.advance(job_id, JobStatus::Completed).await;
        }
        Ok(UploadOutcome::NotConfigured { message, .. }) => {
            info!("Job {}: {}", job_id, message);
            state.job_manager.record_upload(job_id, None).await;
            let _ = state.job_manager.advance(job_id, JobStatus::Completed).await;
        }
        Err(e) => {
            state.job_manager.record_error(job_id, e.to_string()).await;
        }
    }
}

/// The upload procedure: credentials check, metadata, video download,
/// YouTube insert. Shared by the `/api/upload` handler and the job workflow.
pub async fn run_upload(
    state: &AppState,
    video_url: &str,
    prompt: &str,
) -> Result<UploadOutcome, ApiError> {
    let Some((_, _, refresh_token)) = state.config.youtube_upload_credentials() else {
        return Ok(UploadOutcome::NotConfigured {
            error: "YouTube credentials not configured. Please set YOUTUBE_CLIENT_ID, YOUTUBE_CLIENT_SECRET, and YOUTUBE_REFRESH_TOKEN.".to_string(),
            message: "Demo mode: Video generated but not uploaded. Configure YouTube API credentials to enable uploading.".to_string(),
        });
    };

    let youtube = state
        .youtube_client
        .as_ref()
        .ok_or_else(|| ApiError::Configuration("YouTube client not initialized".to_string()))?;

    let metadata = match state.openai_client.as_ref() {
        Some(client) => client.generate_metadata(prompt).await,
        None => VideoMetadata::defaults(prompt),
    };

    let token = youtube.refresh_access_token(refresh_token).await?;
    let video_data = youtube.download_video(video_url).await?;
    let response = youtube
        .upload_video(&token.access_token, video_data, &metadata)
        .await?;

    Ok(UploadOutcome::Uploaded(UploadResult {
        youtube_url: watch_url(&response.id),
        video_id: response.id,
        title: metadata.title,
        success: true,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn upload_without_credentials_is_demo_mode_not_an_error() {
        let state = AppState::from_config(Config::empty());
        let outcome = run_upload(&state, "https://cdn.example/v.mp4", "a corgi")
            .await
            .unwrap();

        match outcome {
            UploadOutcome::NotConfigured { error, message } => {
                assert!(error.contains("YouTube credentials not configured"));
                assert!(message.contains("Demo mode"));
            }
            other => panic!("expected NotConfigured, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn upload_stage_demo_mode_completes_the_job() {
        let state = AppState::from_config(Config::empty());
        let mut job = crate::jobs::Job::new("a corgi".to_string());
        job.video_url = Some("https://cdn.example/v.mp4".to_string());
        job.status = JobStatus::Uploading;
        let job_id = state.job_manager.insert(job).await;

        run_upload_stage(&state, &job_id, "https://cdn.example/v.mp4", "a corgi").await;

        let job = state.job_manager.get(&job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.youtube_url.is_none());
    }

    #[test]
    fn upload_result_serializes_camel_case() {
        let result = UploadResult {
            youtube_url: watch_url("abc123"),
            video_id: "abc123".to_string(),
            title: "T".to_string(),
            success: true,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["youtubeUrl"], "https://www.youtube.com/watch?v=abc123");
        assert_eq!(json["videoId"], "abc123");
        assert_eq!(json["success"], true);
    }
}
