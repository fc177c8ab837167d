use super::registry::CommandRegistry;
use crate::errors::{ShellError, ShellResult};
use crate::jobs::{Job, JobId, JobService};
use crate::navigation::NavigationTarget;
use crate::session::{Action, OutputLine, RevealMode, Transcript};
use crate::vfs::{FileNode, FileTree, VirtualPath};
use indexmap::IndexMap;
use std::sync::Arc;

/// Collaborators a command may call out to.
#[derive(Clone)]
pub struct CommandServices {
    pub jobs: Arc<dyn JobService>,
}

/// Read-only view of the session a command line runs against.
pub struct ExecutionEnv<'a> {
    pub registry: &'a CommandRegistry,
    pub transcript: &'a Transcript,
    pub tree: &'a FileTree,
    pub cwd: &'a VirtualPath,
    pub jobs: &'a IndexMap<JobId, Job>,
    pub services: &'a CommandServices,
}

/// Position of a stage inside a pipe chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagePosition {
    pub index: usize,
    pub count: usize,
}

impl StagePosition {
    pub fn single() -> Self {
        Self { index: 0, count: 1 }
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.count
    }
}

/// Everything one stage sees while it executes.
pub struct CommandContext<'a> {
    env: &'a ExecutionEnv<'a>,
    pub stdin: Option<Vec<String>>,
    pub stage: StagePosition,
    emitted: Vec<Action>,
    navigation: Option<NavigationTarget>,
}

impl<'a> CommandContext<'a> {
    pub fn new(env: &'a ExecutionEnv<'a>, stdin: Option<Vec<String>>, stage: StagePosition) -> Self {
        Self {
            env,
            stdin,
            stage,
            emitted: Vec::new(),
            navigation: None,
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        self.env.registry
    }

    pub fn transcript(&self) -> &Transcript {
        self.env.transcript
    }

    pub fn tree(&self) -> &FileTree {
        self.env.tree
    }

    pub fn cwd(&self) -> &VirtualPath {
        self.env.cwd
    }

    pub fn jobs(&self) -> &IndexMap<JobId, Job> {
        self.env.jobs
    }

    pub fn job_service(&self) -> Arc<dyn JobService> {
        Arc::clone(&self.env.services.jobs)
    }

    /// Queue a state change. Applied only if the stage succeeds.
    pub fn emit(&mut self, action: Action) {
        self.emitted.push(action);
    }

    /// Ask the host to navigate. Only the first request of a command line
    /// is honoured.
    pub fn navigate(&mut self, target: NavigationTarget) {
        if self.navigation.is_none() {
            self.navigation = Some(target);
        }
    }

    /// Actions and the navigation request the stage emitted.
    pub fn into_parts(self) -> (Vec<Action>, Option<NavigationTarget>) {
        (self.emitted, self.navigation)
    }

    /// Resolve a path argument, failing with `<command>: <arg>: No such file
    /// or directory` when it does not exist.
    pub fn resolve(&self, command: &str, arg: &str) -> ShellResult<(VirtualPath, &'a FileNode)> {
        self.env.tree.resolve(self.env.cwd, arg).ok_or_else(|| {
            ShellError::not_found(format!("{}: {}: No such file or directory", command, arg))
        })
    }

    /// Lines to work on: the named file if given, otherwise stdin.
    pub fn input_lines(&self, command: &str, file: Option<&str>) -> ShellResult<Vec<String>> {
        match file {
            Some(arg) => {
                let (_, node) = self.resolve(command, arg)?;
                if node.is_directory() {
                    return Err(ShellError::usage(format!("{}: {}: Is a directory", command, arg)));
                }
                Ok(node.content.clone())
            }
            None => self.stdin.clone().ok_or_else(|| {
                ShellError::usage(format!(
                    "{}: no input (pipe text into it or name a file)",
                    command
                ))
            }),
        }
    }
}

/// What a stage produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub lines: Vec<OutputLine>,
    /// Pipe-forwardable output. `None` means the stage declares nothing.
    pub stdout: Option<Vec<String>>,
    pub reveal: RevealMode,
}

impl CommandOutput {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn lines(lines: Vec<OutputLine>) -> Self {
        Self {
            lines,
            ..Self::default()
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::lines(vec![OutputLine::info(text)])
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::lines(vec![OutputLine::success(text)])
    }

    /// Plain text output that is also forwarded down a pipe.
    pub fn text(lines: Vec<String>) -> Self {
        Self {
            lines: lines.iter().cloned().map(OutputLine::info).collect(),
            stdout: Some(lines),
            reveal: RevealMode::Immediate,
        }
    }

    pub fn with_stdout(mut self, stdout: Vec<String>) -> Self {
        self.stdout = Some(stdout);
        self
    }

    pub fn staged(mut self) -> Self {
        self.reveal = RevealMode::Staged;
        self
    }
}
