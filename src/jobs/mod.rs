// src/jobs/mod.rs
//! In-memory job tracking for generation/upload workflows.
//!
//! Jobs live for the process lifetime only. Status moves forward only:
//! `generating → uploading → completed`, with `error` reachable from
//! `generating` or `uploading`. The single sanctioned re-entry is
//! `completed → uploading` for a manual upload of a job that has a video
//! but was never uploaded.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

pub mod workflow;

pub type JobId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Generating,
    Uploading,
    Completed,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: JobId,
    pub prompt: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none", rename = "videoUrl")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "youtubeUrl")]
    pub youtube_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(prompt: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            prompt,
            status: JobStatus::Generating,
            video_url: None,
            thumbnail: None,
            youtube_url: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Forward-only transition table.
    pub fn transition_allowed(&self, next: JobStatus) -> bool {
        use JobStatus::*;
        match (self.status, next) {
            (Generating, Uploading)
            | (Generating, Completed)
            | (Generating, Error)
            | (Uploading, Completed)
            | (Uploading, Error) => true,
            // Manual upload: only for a completed job with a video that was
            // never uploaded.
            (Completed, Uploading) => self.video_url.is_some() && self.youtube_url.is_none(),
            _ => false,
        }
    }

    /// A completed job with a video but no YouTube URL can still be uploaded
    /// manually.
    pub fn manual_upload_available(&self) -> bool {
        self.status == JobStatus::Completed
            && self.video_url.is_some()
            && self.youtube_url.is_none()
    }
}

/// Tracks all in-flight and finished jobs behind a single RwLock. Updates
/// touch only the entry matching the job id, so concurrent workflows never
/// clobber each other's jobs.
pub struct JobManager {
    jobs: Arc<RwLock<HashMap<JobId, Job>>>,
}

pub type SharedJobManager = Arc<JobManager>;

impl JobManager {
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn insert(&self, job: Job) -> JobId {
        let job_id = job.id.clone();
        let mut jobs = self.jobs.write().await;
        jobs.insert(job_id.clone(), job);
        tracing::info!("🎬 Created job: {}", job_id);
        job_id
    }

    pub async fn get(&self, job_id: &str) -> Option<Job> {
        let jobs = self.jobs.read().await;
        jobs.get(job_id).cloned()
    }

    /// All jobs, newest first.
    pub async fn list(&self) -> Vec<Job> {
        let jobs = self.jobs.read().await;
        let mut list: Vec<Job> = jobs.values().cloned().collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        list
    }

    /// Advance a job's status, rejecting backward transitions.
    pub async fn advance(&self, job_id: &str, next: JobStatus) -> Result<Job, String> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| format!("Job not found: {}", job_id))?;

        if !job.transition_allowed(next) {
            return Err(format!(
                "Invalid transition {:?} -> {:?} for job {}",
                job.status, next, job_id
            ));
        }

        job.status = next;
        job.updated_at = Utc::now();
        Ok(job.clone())
    }

    /// Record a finished generation stage.
    pub async fn record_generation(&self, job_id: &str, video_url: String, thumbnail: String) {
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get_mut(job_id) {
            job.video_url = Some(video_url);
            job.thumbnail = Some(thumbnail);
            job.updated_at = Utc::now();
        }
    }

    /// Record a finished upload stage. `youtube_url` is `None` when the
    /// upload ran in demo mode (credentials absent).
    pub async fn record_upload(&self, job_id: &str, youtube_url: Option<String>) {
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get_mut(job_id) {
            if youtube_url.is_some() {
                job.youtube_url = youtube_url;
            }
            job.updated_at = Utc::now();
        }
    }

    /// Move a job to the terminal error state with a message.
    pub async fn record_error(&self, job_id: &str, message: String) {
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get_mut(job_id) {
            if job.transition_allowed(JobStatus::Error) {
                job.status = JobStatus::Error;
            }
            job.error = Some(message.clone());
            job.updated_at = Utc::now();
        }
        tracing::error!("Job {} failed: {}", job_id, message);
    }
}
