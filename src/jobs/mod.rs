// Job store — bounded, TTL-evicted registry of generation runs
//
// In-memory only. A job is exclusively written by its owning orchestrator;
// transport endpoints read snapshots. Completed and failed jobs expire 30
// minutes after creation; running jobs never auto-evict.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::plan::GeneratedPlan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Where the orchestrator currently is in the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProgress {
    pub phase: String,
    pub iteration: u32,
    pub max_iterations: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_agent: Option<String>,
}

impl JobProgress {
    fn initial(max_iterations: u32) -> Self {
        Self {
            phase: "pending".to_string(),
            iteration: 0,
            max_iterations,
            current_agent: None,
        }
    }
}

/// Final payload of a successful run, kept on the job for status polling and
/// terminal-event replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedRun {
    pub final_plan: GeneratedPlan,
    pub final_score: f64,
    pub converged: bool,
    pub iteration_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub job_id: String,
    pub user_id: String,
    pub status: JobStatus,
    pub progress: JobProgress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<CompletedRun>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Cooperative cancellation flag, checked between orchestrator steps
    #[serde(skip)]
    pub cancel_requested: bool,
}

/// Bounded, concurrency-safe job registry.
#[derive(Clone)]
pub struct JobStore {
    jobs: Arc<RwLock<HashMap<String, Job>>>,
    max_jobs: usize,
    ttl: Duration,
}

impl JobStore {
    pub fn new(max_jobs: usize, ttl_minutes: i64) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            max_jobs,
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    fn expired(&self, job: &Job, now: DateTime<Utc>) -> bool {
        job.status != JobStatus::Running && now - job.created_at >= self.ttl
    }

    /// Create a new pending job. If the store is full, the oldest
    /// non-running job is evicted first.
    pub async fn create(&self, user_id: &str, max_iterations: u32) -> Job {
        let now = Utc::now();
        let job = Job {
            job_id: format!("job-{}", Uuid::new_v4()),
            user_id: user_id.to_string(),
            status: JobStatus::Pending,
            progress: JobProgress::initial(max_iterations),
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
            cancel_requested: false,
        };

        let mut jobs = self.jobs.write().await;
        jobs.retain(|_, j| !self.expired(j, now));

        if jobs.len() >= self.max_jobs {
            let oldest = jobs
                .values()
                .filter(|j| j.status != JobStatus::Running)
                .min_by_key(|j| j.created_at)
                .map(|j| j.job_id.clone());
            match oldest {
                Some(id) => {
                    tracing::warn!(evicted = %id, "Job store full, evicting oldest non-running job");
                    jobs.remove(&id);
                }
                None => {
                    tracing::warn!("Job store full and every job is running; exceeding capacity");
                }
            }
        }

        jobs.insert(job.job_id.clone(), job.clone());
        job
    }

    /// Snapshot of a job. Expired jobs are removed and reported as absent;
    /// running jobs are retrievable regardless of age.
    pub async fn get(&self, job_id: &str) -> Option<Job> {
        let now = Utc::now();
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get(job_id) {
            if self.expired(job, now) {
                jobs.remove(job_id);
                return None;
            }
        }
        jobs.get(job_id).cloned()
    }

    /// Apply a mutation to a single job entry atomically.
    pub async fn update<F: FnOnce(&mut Job)>(&self, job_id: &str, mutate: F) {
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get_mut(job_id) {
            mutate(job);
            job.updated_at = Utc::now();
        }
    }

    pub async fn delete(&self, job_id: &str) -> bool {
        self.jobs.write().await.remove(job_id).is_some()
    }

    pub async fn list_by_user(&self, user_id: &str) -> Vec<Job> {
        let now = Utc::now();
        let jobs = self.jobs.read().await;
        let mut list: Vec<Job> = jobs
            .values()
            .filter(|j| j.user_id == user_id && !self.expired(j, now))
            .cloned()
            .collect();
        list.sort_by_key(|j| j.created_at);
        list
    }

    pub async fn set_running(&self, job_id: &str) {
        self.update(job_id, |job| {
            job.status = JobStatus::Running;
            job.progress.phase = "running".to_string();
        })
        .await;
    }

    pub async fn complete(&self, job_id: &str, run: CompletedRun) {
        self.update(job_id, |job| {
            job.status = JobStatus::Completed;
            job.progress.phase = "done".to_string();
            job.progress.current_agent = None;
            job.result = Some(run);
        })
        .await;
    }

    pub async fn fail(&self, job_id: &str, message: &str) {
        self.update(job_id, |job| {
            job.status = JobStatus::Failed;
            job.progress.phase = "failed".to_string();
            job.progress.current_agent = None;
            job.error = Some(message.to_string());
        })
        .await;
    }

    /// Request cooperative cancellation. Returns false for unknown or
    /// already-terminal jobs.
    pub async fn request_cancel(&self, job_id: &str) -> bool {
        let mut jobs = self.jobs.write().await;
        match jobs.get_mut(job_id) {
            Some(job) if !job.status.is_terminal() => {
                job.cancel_requested = true;
                job.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }

    pub async fn is_cancel_requested(&self, job_id: &str) -> bool {
        self.jobs
            .read()
            .await
            .get(job_id)
            .map_or(false, |j| j.cancel_requested)
    }

    /// Number of jobs currently running (transport concurrency cap).
    pub async fn running_count(&self) -> usize {
        self.jobs
            .read()
            .await
            .values()
            .filter(|j| j.status == JobStatus::Running)
            .count()
    }

    /// Number of jobs one user currently has running (per-user cap).
    pub async fn running_count_for_user(&self, user_id: &str) -> usize {
        self.jobs
            .read()
            .await
            .values()
            .filter(|j| j.status == JobStatus::Running && j.user_id == user_id)
            .count()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    #[cfg(test)]
    async fn backdate(&self, job_id: &str, minutes: i64) {
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get_mut(job_id) {
            job.created_at = Utc::now() - Duration::minutes(minutes);
        }
    }
}
