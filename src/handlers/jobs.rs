// src/handlers/jobs.rs
//! Job orchestration endpoints: create a generate(+upload) job, inspect it,
//! trigger a manual upload of a completed-but-not-uploaded job.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::jobs::{workflow, Job, JobId, JobStatus};
use crate::AppState;

/// Fallback prompts when a job is created without one.
const SAMPLE_PROMPTS: &[&str] = &[
    "A golden retriever puppy playing with a ball in slow motion, cinematic lighting",
    "Adorable corgi running on a beach at sunset, waves crashing",
    "Playful husky jumping in the snow, 4k quality",
    "Cute french bulldog doing tricks, studio lighting",
    "Border collie catching a frisbee mid-air, slow motion",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default = "default_auto_upload")]
    pub auto_upload: bool,
}

fn default_auto_upload() -> bool {
    true
}

fn pick_prompt(requested: Option<String>) -> String {
    match requested {
        Some(prompt) if !prompt.trim().is_empty() => prompt,
        _ => SAMPLE_PROMPTS
            .choose(&mut rand::thread_rng())
            .expect("sample prompts are non-empty")
            .to_string(),
    }
}

/// POST /api/jobs - create a job and kick off its workflow.
pub async fn create_job(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<CreateJobRequest>,
) -> impl IntoResponse {
    let prompt = pick_prompt(request.prompt);
    let job = Job::new(prompt);
    let snapshot = job.clone();
    let job_id = state.job_manager.insert(job).await;

    let workflow_state = state.clone();
    let auto_upload = request.auto_upload;
    tokio::spawn(async move {
        workflow::run(workflow_state, job_id, auto_upload).await;
    });

    (StatusCode::ACCEPTED, Json(snapshot))
}

/// GET /api/jobs - all jobs, newest first.
pub async fn list_jobs(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    Json(state.job_manager.list().await)
}

/// GET /api/jobs/:job_id - one job's current state.
pub async fn get_job(
    Path(job_id): Path<JobId>,
    Extension(state): Extension<Arc<AppState>>,
) -> impl IntoResponse {
    match state.job_manager.get(&job_id).await {
        Some(job) => Json(job).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Job not found: {}", job_id) })),
        )
            .into_response(),
    }
}

/// POST /api/jobs/:job_id/upload - manual upload for a completed job that
/// has a video but no YouTube URL.
pub async fn manual_upload(
    Path(job_id): Path<JobId>,
    Extension(state): Extension<Arc<AppState>>,
) -> impl IntoResponse {
    let Some(job) = state.job_manager.get(&job_id).await else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Job not found: {}", job_id) })),
        )
            .into_response();
    };

    if !job.manual_upload_available() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Job is not eligible for manual upload" })),
        )
            .into_response();
    }

    let uploading = match state.job_manager.advance(&job_id, JobStatus::Uploading).await {
        Ok(job) => job,
        Err(e) => {
            return (StatusCode::CONFLICT, Json(json!({ "error": e }))).into_response();
        }
    };

    // Guaranteed by the eligibility check: the transition to `uploading`
    // is only allowed for jobs that have a video URL.
    let Some(video_url) = uploading.video_url.clone() else {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Job lost its video URL" })),
        )
            .into_response();
    };
    let prompt = uploading.prompt.clone();
    let workflow_state = state.clone();
    tokio::spawn(async move {
        workflow::run_upload_stage(&workflow_state, &uploading.id, &video_url, &prompt).await;
    });

    match state.job_manager.get(&job_id).await {
        Some(job) => (StatusCode::ACCEPTED, Json(job)).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub fn routes() -> Router {
    Router::new()
        .route("/api/jobs", post(create_job).get(list_jobs))
        .route("/api/jobs/:job_id", get(get_job))
        .route("/api/jobs/:job_id/upload", post(manual_upload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn pick_prompt_prefers_the_request() {
        assert_eq!(
            pick_prompt(Some("a corgi surfing".to_string())),
            "a corgi surfing"
        );
    }

    #[test]
    fn pick_prompt_falls_back_to_samples() {
        let prompt = pick_prompt(None);
        assert!(SAMPLE_PROMPTS.contains(&prompt.as_str()));

        let prompt = pick_prompt(Some("   ".to_string()));
        assert!(SAMPLE_PROMPTS.contains(&prompt.as_str()));
    }

    #[test]
    fn auto_upload_defaults_to_true() {
        let request: CreateJobRequest = serde_json::from_str("{}").unwrap();
        assert!(request.auto_upload);

        let request: CreateJobRequest =
            serde_json::from_str(r#"{"autoUpload": false}"#).unwrap();
        assert!(!request.auto_upload);
    }

    #[tokio::test]
    async fn manual_upload_rejects_jobs_still_generating() {
        let state = Arc::new(AppState::from_config(Config::empty()));
        let job_id = state
            .job_manager
            .insert(Job::new("a corgi".to_string()))
            .await;

        let response = manual_upload(Path(job_id), Extension(state))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn manual_upload_rejects_already_uploaded_jobs() {
        let state = Arc::new(AppState::from_config(Config::empty()));
        let mut job = Job::new("a corgi".to_string());
        job.status = JobStatus::Completed;
        job.video_url = Some("https://cdn.example/v.mp4".to_string());
        job.youtube_url = Some("https://www.youtube.com/watch?v=abc".to_string());
        let job_id = state.job_manager.insert(job).await;

        let response = manual_upload(Path(job_id), Extension(state))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn manual_upload_moves_eligible_job_to_uploading() {
        let state = Arc::new(AppState::from_config(Config::empty()));
        let mut job = Job::new("a corgi".to_string());
        job.status = JobStatus::Completed;
        job.video_url = Some("https://cdn.example/v.mp4".to_string());
        let job_id = state.job_manager.insert(job).await;

        let response = manual_upload(Path(job_id.clone()), Extension(state.clone()))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        // Demo-mode upload (no credentials) completes the job without a
        // YouTube URL once the spawned stage finishes.
        for _ in 0..50 {
            let job = state.job_manager.get(&job_id).await.unwrap();
            if job.status == JobStatus::Completed {
                assert!(job.youtube_url.is_none());
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("job never completed");
    }
}
