use super::{JobId, JobService, JobStatusReport, JobTicket};
use crate::errors::{ShellError, ShellResult};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Mutex;

struct SimulatedJob {
    urls: Vec<String>,
    progress: u8,
}

/// In-process job service that advances every job by a fixed step on each
/// status request. Used when no real service is configured.
///
/// Ids look like `sim-<run>-<n>`. The run tag is taken from the start time,
/// so a restored session never sees an id from an earlier run again.
pub struct SimulatedJobService {
    step: u8,
    run: String,
    next_id: Mutex<u64>,
    jobs: Mutex<HashMap<JobId, SimulatedJob>>,
}

impl SimulatedJobService {
    pub fn new(step: u8) -> Self {
        Self::with_run(step, Utc::now().format("%y%m%d%H%M%S%3f").to_string())
    }

    /// Service with a fixed run tag.
    pub fn with_run(step: u8, run: impl Into<String>) -> Self {
        Self {
            step: step.clamp(1, 100),
            run: run.into(),
            next_id: Mutex::new(1),
            jobs: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for SimulatedJobService {
    fn default() -> Self {
        Self::new(25)
    }
}

fn lock_poisoned() -> ShellError {
    ShellError::external("simulated job service state is poisoned")
}

#[async_trait]
impl JobService for SimulatedJobService {
    async fn submit(&self, urls: &[String]) -> ShellResult<JobTicket> {
        let id = {
            let mut next = self.next_id.lock().map_err(|_| lock_poisoned())?;
            let id = *next;
            *next += 1;
            JobId::new(format!("sim-{}-{}", self.run, id))
        };
        self.jobs.lock().map_err(|_| lock_poisoned())?.insert(
            id.clone(),
            SimulatedJob {
                urls: urls.to_vec(),
                progress: 0,
            },
        );
        Ok(JobTicket { job_id: id })
    }

    async fn status(&self, job_id: &JobId) -> ShellResult<JobStatusReport> {
        let mut jobs = self.jobs.lock().map_err(|_| lock_poisoned())?;
        let job = jobs
            .get_mut(job_id)
            .ok_or_else(|| ShellError::external(format!("unknown job {}", job_id)))?;

        job.progress = job.progress.saturating_add(self.step).min(100);
        if job.progress < 100 {
            return Ok(JobStatusReport::running(job.progress));
        }

        let results = job
            .urls
            .iter()
            .map(|url| json!({ "url": url, "status": 200, "title": format!("Snapshot of {}", url) }))
            .collect();
        Ok(JobStatusReport::completed(results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobStatus;

    #[tokio::test]
    async fn advances_until_completion() {
        let service = SimulatedJobService::new(50);
        let ticket = service
            .submit(&["https://example.com".to_string()])
            .await
            .unwrap();

        let first = service.status(&ticket.job_id).await.unwrap();
        assert_eq!(first.status, JobStatus::Running);
        assert_eq!(first.progress, Some(50));

        let second = service.status(&ticket.job_id).await.unwrap();
        assert_eq!(second.status, JobStatus::Completed);
        assert_eq!(second.results.unwrap()[0]["url"], "https://example.com");
    }

    #[tokio::test]
    async fn ids_carry_the_run_tag() {
        let earlier = SimulatedJobService::with_run(25, "a");
        let later = SimulatedJobService::with_run(25, "b");
        let urls = ["https://example.com".to_string()];

        let first = earlier.submit(&urls).await.unwrap().job_id;
        let second = earlier.submit(&urls).await.unwrap().job_id;
        assert_eq!(first.as_str(), "sim-a-1");
        assert_eq!(second.as_str(), "sim-a-2");
        assert_ne!(later.submit(&urls).await.unwrap().job_id, first);
    }

    #[tokio::test]
    async fn unknown_jobs_are_errors() {
        let service = SimulatedJobService::default();
        assert!(service.status(&JobId::new("nope")).await.is_err());
    }
}
