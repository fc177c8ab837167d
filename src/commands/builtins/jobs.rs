use crate::commands::{Command, CommandContext, CommandOutput, ParsedArgs};
use crate::errors::{ShellError, ShellResult};
use crate::jobs::{Job, JobId, JobStatus};
use crate::session::{Action, Overlay};
use crate::vfs::{FileTree, VirtualPath};
use async_trait::async_trait;

const SUBCOMMANDS: [&str; 4] = ["list", "status", "results", "monitor"];

pub struct JobsCommand;

fn summary(job: &Job) -> String {
    format!(
        "{:<12} {:<10} {:>3}%  {}",
        job.id,
        job.status.label(),
        job.progress,
        job.urls.join(" ")
    )
}

fn find<'a>(ctx: &'a CommandContext<'_>, id: &str) -> ShellResult<&'a Job> {
    ctx.jobs()
        .get(&JobId::new(id))
        .ok_or_else(|| ShellError::not_found(format!("jobs: {}: no such job", id)))
}

#[async_trait]
impl Command for JobsCommand {
    fn name(&self) -> &'static str {
        "jobs"
    }

    fn description(&self) -> &'static str {
        "Inspect background jobs"
    }

    fn usage(&self) -> &'static str {
        "jobs [list | status <id> | results <id> | monitor]"
    }

    async fn execute(&self, args: &[String], ctx: &mut CommandContext<'_>) -> ShellResult<CommandOutput> {
        let parsed = ParsedArgs::parse(args, &[])?;
        let positionals: Vec<&str> = parsed.positionals.iter().map(String::as_str).collect();

        match positionals.as_slice() {
            [] | ["list"] => {
                if ctx.jobs().is_empty() {
                    return Ok(CommandOutput::info("No active jobs."));
                }
                Ok(CommandOutput::text(ctx.jobs().values().map(summary).collect()))
            }
            ["status", id] => {
                let line = find(ctx, id)?.status_line();
                Ok(CommandOutput::lines(vec![line]))
            }
            ["results", id] => {
                let job = find(ctx, id)?;
                if job.status != JobStatus::Completed || job.results.is_none() {
                    return Err(ShellError::usage(format!(
                        "jobs: {}: no results (job is {})",
                        id,
                        job.status.label()
                    )));
                }
                let job_id = job.id.clone();
                ctx.emit(Action::OpenOverlay(Overlay::ScrapeResults(job_id)));
                Ok(CommandOutput::info(format!("Opening results of job {} ...", id)))
            }
            ["monitor"] => {
                ctx.emit(Action::OpenOverlay(Overlay::Monitor));
                Ok(CommandOutput::info("Opening the job monitor ..."))
            }
            _ => Err(ShellError::usage(format!("usage: {}", self.usage()))),
        }
    }

    fn suggest(&self, partial: &str, _tree: &FileTree, _cwd: &VirtualPath) -> Vec<String> {
        SUBCOMMANDS
            .iter()
            .filter(|sub| sub.starts_with(partial))
            .map(|sub| sub.to_string())
            .collect()
    }
}
