#![allow(dead_code)]

use async_trait::async_trait;
use portfolio_shell::commands::CommandRegistry;
use portfolio_shell::config::ShellConfig;
use portfolio_shell::errors::{ShellError, ShellResult};
use portfolio_shell::jobs::{JobId, JobService, JobStatusReport, JobTicket};
use portfolio_shell::navigation::{NavigationTarget, Navigator};
use portfolio_shell::session::SnapshotStore;
use portfolio_shell::vfs::{default_tree, FileTree};
use portfolio_shell::{Terminal, TerminalServices};
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Job service that answers status requests from a fixed script. The last
/// answer repeats once the script runs out.
pub struct ScriptedJobService {
    job_id: String,
    script: Mutex<Vec<Result<JobStatusReport, String>>>,
    status_calls: Mutex<usize>,
}

impl ScriptedJobService {
    pub fn new(job_id: &str, script: Vec<Result<JobStatusReport, String>>) -> Self {
        Self {
            job_id: job_id.to_string(),
            script: Mutex::new(script),
            status_calls: Mutex::new(0),
        }
    }

    pub fn status_calls(&self) -> usize {
        *self.status_calls.lock().unwrap()
    }
}

#[async_trait]
impl JobService for ScriptedJobService {
    async fn submit(&self, _urls: &[String]) -> ShellResult<JobTicket> {
        Ok(JobTicket {
            job_id: JobId::new(self.job_id.clone()),
        })
    }

    async fn status(&self, _job_id: &JobId) -> ShellResult<JobStatusReport> {
        *self.status_calls.lock().unwrap() += 1;
        let mut script = self.script.lock().unwrap();
        let next = if script.len() > 1 {
            script.remove(0)
        } else {
            script
                .first()
                .cloned()
                .unwrap_or_else(|| Err("script exhausted".to_string()))
        };
        next.map_err(ShellError::external)
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pub seen: Mutex<Vec<NavigationTarget>>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &NavigationTarget) {
        self.seen.lock().unwrap().push(target.clone());
    }
}

pub struct TerminalBuilder {
    pub registry: CommandRegistry,
    pub config: ShellConfig,
    pub tree: FileTree,
    pub jobs: Arc<dyn JobService>,
    pub navigator: Arc<RecordingNavigator>,
    pub snapshots: Option<Arc<dyn SnapshotStore>>,
}

impl TerminalBuilder {
    pub fn new() -> Self {
        Self {
            registry: CommandRegistry::with_builtins(),
            config: ShellConfig::default(),
            tree: default_tree(),
            jobs: Arc::new(ScriptedJobService::new("job-1", Vec::new())),
            navigator: Arc::default(),
            snapshots: None,
        }
    }

    pub fn tree(mut self, tree: FileTree) -> Self {
        self.tree = tree;
        self
    }

    pub fn jobs(mut self, jobs: Arc<dyn JobService>) -> Self {
        self.jobs = jobs;
        self
    }

    pub fn snapshots(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.snapshots = Some(store);
        self
    }

    pub fn open(self) -> Terminal {
        Terminal::open(
            Arc::new(self.registry),
            &self.config,
            self.tree,
            TerminalServices {
                jobs: self.jobs,
                navigator: self.navigator,
                snapshots: self.snapshots,
            },
        )
        .expect("terminal opens")
    }
}

/// Fails the test instead of hanging when a condition never holds.
pub async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(120), future)
        .await
        .expect("condition reached in time")
}
