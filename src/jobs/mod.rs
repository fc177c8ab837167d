//! Externally executed jobs (scrapes) tracked by the shell.
//!
//! The shell never performs the work itself: it submits URLs to a
//! [`JobService`], polls it on a fixed interval and mirrors each status change
//! into the transcript line the job was bound to when it was created.

mod http;
mod simulated;
pub mod supervisor;

pub use http::HttpJobService;
pub use simulated::SimulatedJobService;

use crate::errors::ShellResult;
use crate::session::{EntryId, OutputLine};
use crate::vfs::VirtualPath;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id reduced to characters that are safe inside a file name.
    pub fn file_stem(&self) -> String {
        self.0
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
            .collect()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Submitted,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    fn rank(self) -> u8 {
        match self {
            JobStatus::Submitted => 0,
            JobStatus::Running => 1,
            JobStatus::Completed | JobStatus::Failed => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            JobStatus::Submitted => "submitted",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

/// Response to a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTicket {
    pub job_id: JobId,
}

/// One status answer from the job service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusReport {
    pub status: JobStatus,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub results: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl JobStatusReport {
    pub fn running(progress: u8) -> Self {
        Self {
            status: JobStatus::Running,
            progress: Some(progress),
            results: None,
            error: None,
        }
    }

    pub fn completed(results: Vec<serde_json::Value>) -> Self {
        Self {
            status: JobStatus::Completed,
            progress: Some(100),
            results: Some(results),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            progress: None,
            results: None,
            error: Some(error.into()),
        }
    }
}

/// Submission and status collaborator.
///
/// Any error is treated as a failure transition by the supervisor; retrying
/// is the service's concern.
#[async_trait]
pub trait JobService: Send + Sync {
    async fn submit(&self, urls: &[String]) -> ShellResult<JobTicket>;

    async fn status(&self, job_id: &JobId) -> ShellResult<JobStatusReport>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub urls: Vec<String>,
    pub status: JobStatus,
    pub progress: u8,
    pub entry_id: EntryId,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_path: Option<VirtualPath>,
    /// A status request is in flight. Not persisted.
    #[serde(skip)]
    pub polling: bool,
}

impl Job {
    pub fn new(id: JobId, urls: Vec<String>, entry_id: EntryId, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            urls,
            status: JobStatus::Submitted,
            progress: 0,
            entry_id,
            started_at,
            results: None,
            error: None,
            result_path: None,
            polling: false,
        }
    }

    pub fn submitted_line(id: &JobId, url_count: usize) -> OutputLine {
        OutputLine::info(format!(
            "[job {}] submitted: scraping {} url{}",
            id,
            url_count,
            if url_count == 1 { "" } else { "s" }
        ))
    }

    /// Fold a status report into the job. Status only moves forward; a report
    /// for an earlier status can still raise the progress figure.
    ///
    /// Returns `true` if anything visible changed.
    pub fn apply_report(&mut self, report: JobStatusReport) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        let before = (self.status, self.progress);

        match report.status {
            JobStatus::Failed => {
                self.fail(
                    report
                        .error
                        .unwrap_or_else(|| "job failed without an error message".to_string()),
                );
                return true;
            }
            JobStatus::Completed => {
                self.status = JobStatus::Completed;
                self.progress = 100;
                self.results = report.results;
                return true;
            }
            status => {
                if status.rank() > self.status.rank() {
                    self.status = status;
                }
                if let Some(progress) = report.progress {
                    self.progress = self.progress.max(progress.min(99));
                }
            }
        }

        before != (self.status, self.progress)
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
    }

    pub fn status_line(&self) -> OutputLine {
        match self.status {
            JobStatus::Submitted => Self::submitted_line(&self.id, self.urls.len()),
            JobStatus::Running => {
                OutputLine::info(format!("[job {}] running... {}%", self.id, self.progress))
            }
            JobStatus::Completed => match (&self.result_path, &self.results) {
                (Some(path), Some(results)) => OutputLine::success(format!(
                    "[job {}] completed: {} result{} saved to {}",
                    self.id,
                    results.len(),
                    if results.len() == 1 { "" } else { "s" },
                    path
                )),
                (None, Some(_)) => OutputLine::success(format!(
                    "[job {}] completed, but the results could not be saved",
                    self.id
                )),
                _ => OutputLine::success(format!("[job {}] completed (no results)", self.id)),
            },
            JobStatus::Failed => OutputLine::error(format!(
                "[job {}] failed: {}",
                self.id,
                self.error.as_deref().unwrap_or("unknown error")
            )),
        }
    }
}
