use crate::commands::{Command, CommandContext, CommandOutput, ParsedArgs};
use crate::errors::{ShellError, ShellResult};
use crate::session::Action;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};
use url::Url;

pub struct ScrapeCommand;

fn validate(raw: &str) -> ShellResult<String> {
    let url = Url::parse(raw)
        .map_err(|e| ShellError::usage(format!("scrape: invalid url '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url.to_string()),
        scheme => Err(ShellError::usage(format!(
            "scrape: unsupported scheme '{}' in '{}' (use http or https)",
            scheme, raw
        ))),
    }
}

#[async_trait]
impl Command for ScrapeCommand {
    fn name(&self) -> &'static str {
        "scrape"
    }

    fn description(&self) -> &'static str {
        "Submit a background scrape job"
    }

    fn usage(&self) -> &'static str {
        "scrape <url>..."
    }

    async fn execute(&self, args: &[String], ctx: &mut CommandContext<'_>) -> ShellResult<CommandOutput> {
        let parsed = ParsedArgs::parse(args, &[])?;
        if parsed.positionals.is_empty() {
            return Err(ShellError::usage(format!("usage: {}", self.usage())));
        }
        let urls = parsed
            .positionals
            .iter()
            .map(|raw| validate(raw))
            .collect::<ShellResult<Vec<_>>>()?;

        let ticket = ctx.job_service().submit(&urls).await.map_err(|error| {
            warn!(error = %error, "scrape submission failed");
            ShellError::external(format!("scrape: submission failed: {}", error))
        })?;
        debug!(job_id = %ticket.job_id, urls = urls.len(), "scrape submitted");

        // The submitted line is written by the reducer so the job can bind to
        // its entry id.
        ctx.emit(Action::TrackJob {
            job_id: ticket.job_id,
            urls,
            started_at: Utc::now(),
        });
        Ok(CommandOutput::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::builtins::testing::Fixture;
    use crate::commands::CommandServices;
    use crate::errors::ErrorKind;
    use crate::jobs::{JobId, JobService, JobStatusReport, JobTicket};
    use std::sync::Arc;

    struct Unreachable;

    #[async_trait]
    impl JobService for Unreachable {
        async fn submit(&self, _urls: &[String]) -> ShellResult<JobTicket> {
            Err(ShellError::external("connection refused"))
        }

        async fn status(&self, _job_id: &JobId) -> ShellResult<JobStatusReport> {
            Err(ShellError::external("connection refused"))
        }
    }

    #[tokio::test]
    async fn submission_emits_track_job() {
        let fixture = Fixture::new();
        let run = fixture
            .run_single(&ScrapeCommand, &["scrape", "https://example.com"])
            .await;
        assert!(run.result.unwrap().lines.is_empty());
        match run.actions.as_slice() {
            [Action::TrackJob { job_id, urls, .. }] => {
                assert!(job_id.as_str().starts_with("sim-"));
                assert!(job_id.as_str().ends_with("-1"));
                assert_eq!(urls, &vec!["https://example.com/".to_string()]);
            }
            other => panic!("unexpected actions {:?}", other),
        }
    }

    #[tokio::test]
    async fn rejects_non_http_urls() {
        let fixture = Fixture::new();
        for bad in ["ftp://example.com", "not a url"] {
            let run = fixture.run_single(&ScrapeCommand, &["scrape", bad]).await;
            assert_eq!(run.result.unwrap_err().kind(), ErrorKind::Usage);
            assert!(run.actions.is_empty());
        }
    }

    #[tokio::test]
    async fn requires_a_url() {
        let fixture = Fixture::new();
        let run = fixture.run_single(&ScrapeCommand, &["scrape"]).await;
        assert_eq!(run.result.unwrap_err().kind(), ErrorKind::Usage);
    }

    #[tokio::test]
    async fn service_failure_is_external() {
        let mut fixture = Fixture::new();
        fixture.services = CommandServices {
            jobs: Arc::new(Unreachable),
        };
        let run = fixture
            .run_single(&ScrapeCommand, &["scrape", "https://example.com"])
            .await;
        let err = run.result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::External);
        assert!(err.to_string().contains("connection refused"));
        assert!(run.actions.is_empty());
    }
}
