use super::{JobId, JobService, JobStatusReport, JobTicket};
use crate::errors::{ShellError, ShellResult};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Serialize)]
struct SubmitRequest<'a> {
    urls: &'a [String],
}

/// Job service reached over HTTP.
///
/// `POST {base}/scrape` with `{"urls": [...]}` answers `{"jobId": "..."}`;
/// `GET {base}/scrape/{id}` answers a [`JobStatusReport`].
pub struct HttpJobService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpJobService {
    pub fn new(base_url: impl Into<String>) -> ShellResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ShellError::external(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!("{}/{}", self.base_url, suffix)
    }
}

#[async_trait]
impl JobService for HttpJobService {
    async fn submit(&self, urls: &[String]) -> ShellResult<JobTicket> {
        let response = self
            .client
            .post(self.endpoint("scrape"))
            .json(&SubmitRequest { urls })
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ShellError::external(format!("submission failed: {}", e)))?;

        response
            .json::<JobTicket>()
            .await
            .map_err(|e| ShellError::external(format!("unexpected submission response: {}", e)))
    }

    async fn status(&self, job_id: &JobId) -> ShellResult<JobStatusReport> {
        let response = self
            .client
            .get(self.endpoint(&format!("scrape/{}", job_id)))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| ShellError::external(format!("status request failed: {}", e)))?;

        response
            .json::<JobStatusReport>()
            .await
            .map_err(|e| ShellError::external(format!("unexpected status response: {}", e)))
    }
}
