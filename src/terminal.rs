//! One terminal instance: the single owner of a [`SessionState`].
//!
//! Input handlers, command lines and background tasks all end up as
//! [`Action`]s applied here one at a time. Timers and network calls never
//! touch the state; they send actions over the terminal's channel and the
//! host drains it with [`Terminal::process_pending`] or
//! [`Terminal::next_event`].

use crate::commands::{CommandRegistry, CommandServices, ExecutionEnv};
use crate::completion;
use crate::config::ShellConfig;
use crate::errors::{ShellError, ShellResult};
use crate::jobs::supervisor::{fetch_status, prune_after, ActionSender, GracePeriods, PollTimer};
use crate::jobs::JobService;
use crate::navigation::{NavigationTarget, Navigator};
use crate::pipeline::{self, PipelineOutcome};
use crate::session::{
    reduce, Action, Effect, OutputLine, Overlay, RevealMode, SessionSnapshot, SessionState,
    SnapshotStore, Step, Transcript,
};
use crate::typewriter::Typewriter;
use crate::vfs::FileTree;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// External collaborators of a terminal.
#[derive(Clone)]
pub struct TerminalServices {
    pub jobs: Arc<dyn JobService>,
    pub navigator: Arc<dyn Navigator>,
    pub snapshots: Option<Arc<dyn SnapshotStore>>,
}

/// Keys a host forwards to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Backspace,
    Enter,
    Tab,
    Up,
    Down,
    Escape,
    /// Ctrl-R
    ReverseSearch,
}

pub struct Terminal {
    state: SessionState,
    registry: Arc<CommandRegistry>,
    services: TerminalServices,
    command_services: CommandServices,
    grace: GracePeriods,
    navigation_delay: Duration,
    tx: ActionSender,
    rx: mpsc::UnboundedReceiver<Action>,
    typewriter: Typewriter,
    poller: Option<PollTimer>,
    tasks: JoinSet<()>,
}

impl Terminal {
    /// Open a terminal, restoring the last session if a usable snapshot
    /// exists, and start the job poll timer. Must run inside a tokio runtime.
    pub fn open(
        registry: Arc<CommandRegistry>,
        config: &ShellConfig,
        tree: FileTree,
        services: TerminalServices,
    ) -> ShellResult<Self> {
        config.validate()?;
        let results_dir = config.results_dir()?;
        if !tree.is_directory(&results_dir) {
            return Err(ShellError::Config(format!(
                "jobs.results_dir: {} is not a directory in the content tree",
                results_dir
            )));
        }
        let state = restore_or_new(services.snapshots.as_deref(), tree, results_dir);

        let (tx, rx) = mpsc::unbounded_channel();
        let mut terminal = Self {
            command_services: CommandServices {
                jobs: Arc::clone(&services.jobs),
            },
            typewriter: Typewriter::new(config.reveal_timing(), tx.clone()),
            poller: Some(PollTimer::start(config.poll_interval(), tx.clone())),
            grace: config.grace_periods(),
            navigation_delay: config.navigation_delay(),
            tasks: JoinSet::new(),
            state,
            registry,
            services,
            tx,
            rx,
        };

        // Finished jobs restored from a snapshot still need pruning.
        let finished: Vec<_> = terminal
            .state
            .jobs
            .values()
            .filter(|job| job.status.is_terminal())
            .map(|job| (job.id.clone(), job.status))
            .collect();
        for (job_id, status) in finished {
            terminal.run_effect(Effect::SchedulePrune { job_id, status });
        }

        info!(
            entries = terminal.state.transcript.len(),
            jobs = terminal.state.jobs.len(),
            "terminal opened"
        );
        Ok(terminal)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.state.transcript
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// Apply one action and start whatever it asks for.
    pub fn dispatch(&mut self, action: Action) {
        let effects = reduce(&mut self.state, action);
        for effect in effects {
            self.run_effect(effect);
        }
        self.persist();
    }

    /// Apply every action already queued. Returns how many were applied.
    pub fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(action) = self.rx.try_recv() {
            self.dispatch(action);
            applied += 1;
        }
        self.reap_tasks();
        applied
    }

    /// Wait for the next queued action and apply it.
    pub async fn next_event(&mut self) {
        if let Some(action) = self.rx.recv().await {
            self.dispatch(action);
        }
        self.reap_tasks();
    }

    /// Apply queued actions until `done` holds.
    pub async fn wait_until(&mut self, mut done: impl FnMut(&SessionState) -> bool) {
        while !done(&self.state) {
            self.next_event().await;
        }
    }

    /// Run a submitted line: record it, execute it, then apply what it
    /// produced.
    pub async fn run_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            self.dispatch(Action::SetInput(String::new()));
            return;
        }

        debug!(line, "running command line");
        self.dispatch(Action::RecordCommand(line.to_string()));

        let outcome = {
            let env = ExecutionEnv {
                registry: &self.registry,
                transcript: &self.state.transcript,
                tree: &self.state.tree,
                cwd: &self.state.working_directory,
                jobs: &self.state.jobs,
                services: &self.command_services,
            };
            pipeline::execute_line(line, &env).await
        };
        self.apply_outcome(outcome);
        self.dispatch(Action::CommandFinished);
    }

    fn apply_outcome(&mut self, outcome: PipelineOutcome) {
        let PipelineOutcome {
            actions,
            navigation,
            result,
        } = outcome;

        for action in actions {
            self.dispatch(action);
        }

        match result {
            Ok(output) if output.lines.is_empty() => {}
            Ok(output) => match output.reveal {
                RevealMode::Staged => self.dispatch(Action::BeginReveal(output.lines)),
                RevealMode::Immediate => self.dispatch(Action::AppendLines(output.lines)),
            },
            Err(error) => {
                debug!(error = %error, kind = ?error.kind(), "command failed");
                self.dispatch(Action::AppendLines(vec![OutputLine::error(error.to_string())]));
            }
        }

        if let Some(target) = navigation {
            self.schedule_navigation(target);
        }
    }

    pub async fn handle_key(&mut self, key: KeyInput) {
        if self.state.reverse_search.active {
            self.handle_search_key(key).await;
            return;
        }

        match key {
            KeyInput::Char(c) => {
                let mut input = self.state.input.clone();
                input.push(c);
                self.dispatch(Action::SetInput(input));
            }
            KeyInput::Backspace => {
                let mut input = self.state.input.clone();
                input.pop();
                self.dispatch(Action::SetInput(input));
            }
            KeyInput::Enter => {
                let line = self.state.input.clone();
                self.run_line(&line).await;
            }
            KeyInput::Tab => self.complete(),
            KeyInput::Up => self.dispatch(Action::History(Step::Older)),
            KeyInput::Down => self.dispatch(Action::History(Step::Newer)),
            KeyInput::Escape => {
                if self.state.overlay != Overlay::None {
                    self.dispatch(Action::CloseOverlay);
                } else {
                    self.dispatch(Action::SetInput(String::new()));
                }
            }
            KeyInput::ReverseSearch => self.dispatch(Action::StartReverseSearch),
        }
    }

    async fn handle_search_key(&mut self, key: KeyInput) {
        match key {
            KeyInput::Char(c) => {
                let mut query = self.state.reverse_search.query.clone();
                query.push(c);
                self.dispatch(Action::ReverseSearchQuery(query));
            }
            KeyInput::Backspace => {
                let mut query = self.state.reverse_search.query.clone();
                query.pop();
                self.dispatch(Action::ReverseSearchQuery(query));
            }
            KeyInput::Up | KeyInput::ReverseSearch => {
                self.dispatch(Action::ReverseSearchStep(Step::Older));
            }
            KeyInput::Down => self.dispatch(Action::ReverseSearchStep(Step::Newer)),
            KeyInput::Enter => {
                let selected = self.state.reverse_search.current_match().map(String::from);
                self.dispatch(Action::ExitReverseSearch);
                if let Some(line) = selected {
                    self.run_line(&line).await;
                }
            }
            KeyInput::Escape => self.dispatch(Action::ExitReverseSearch),
            KeyInput::Tab => {}
        }
    }

    /// Tab: cycle through the current candidates, or compute new ones.
    pub fn complete(&mut self) {
        if self.state.completion.is_cycling(&self.state.input) {
            self.dispatch(Action::CycleCompletion);
            return;
        }
        let candidates = completion::complete(
            &self.state.input,
            &self.registry,
            &self.state.tree,
            &self.state.working_directory,
        );
        self.dispatch(Action::CompletionCandidates(candidates));
    }

    /// Stop every timer and in-flight task. The session stays readable.
    pub fn close(&mut self) {
        if let Some(mut poller) = self.poller.take() {
            poller.stop();
        }
        self.typewriter.cancel();
        self.tasks.abort_all();
        self.persist();
        info!("terminal closed");
    }

    pub fn is_closed(&self) -> bool {
        self.poller.is_none()
    }

    /// Tasks still tracked (status fetches, prune and navigation timers).
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::StartReveal {
                sequence,
                line_lengths,
            } => self.typewriter.start(sequence, line_lengths),
            Effect::FetchJobStatus(job_id) => {
                self.tasks.spawn(fetch_status(
                    Arc::clone(&self.services.jobs),
                    job_id,
                    self.tx.clone(),
                ));
            }
            Effect::SchedulePrune { job_id, status } => {
                let delay = self.grace.for_status(status);
                debug!(job_id = %job_id, delay_ms = delay.as_millis() as u64, "scheduling prune");
                self.tasks.spawn(prune_after(delay, job_id, self.tx.clone()));
            }
            Effect::PresentResults(job_id) => {
                info!(job_id = %job_id, "job results ready");
            }
        }
    }

    fn schedule_navigation(&mut self, target: NavigationTarget) {
        let navigator = Arc::clone(&self.services.navigator);
        let delay = self.navigation_delay;
        self.tasks.spawn(async move {
            tokio::time::sleep(delay).await;
            navigator.navigate(&target);
        });
    }

    fn reap_tasks(&mut self) {
        while let Some(result) = self.tasks.try_join_next() {
            if let Err(error) = result {
                if error.is_panic() {
                    warn!(error = %error, "background task panicked");
                }
            }
        }
    }

    fn persist(&self) {
        let Some(store) = &self.services.snapshots else {
            return;
        };
        if let Err(error) = store.save(&SessionSnapshot::capture(&self.state)) {
            warn!(error = %error, "failed to save session snapshot");
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        self.tasks.abort_all();
    }
}

/// A snapshot that cannot be read or rebuilt is logged and discarded.
fn restore_or_new(
    store: Option<&dyn SnapshotStore>,
    tree: FileTree,
    results_dir: crate::vfs::VirtualPath,
) -> SessionState {
    let Some(store) = store else {
        return SessionState::new(tree, results_dir);
    };

    let restored = store.load().and_then(|snapshot| {
        snapshot
            .map(|snapshot| snapshot.restore(tree.clone(), results_dir.clone()))
            .transpose()
    });
    match restored {
        Ok(Some(state)) => {
            info!(entries = state.transcript.len(), "restored session snapshot");
            state
        }
        Ok(None) => SessionState::new(tree, results_dir),
        Err(error) => {
            warn!(error = %error, "discarding unusable session snapshot");
            if let Err(error) = store.clear() {
                warn!(error = %error, "failed to remove session snapshot");
            }
            SessionState::new(tree, results_dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::SimulatedJobService;
    use crate::session::MemorySnapshotStore;
    use crate::vfs::default_tree;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<NavigationTarget>>);

    impl Navigator for Recorder {
        fn navigate(&self, target: &NavigationTarget) {
            if let Ok(mut seen) = self.0.lock() {
                seen.push(target.clone());
            }
        }
    }

    fn open_with(navigator: Arc<Recorder>, store: Option<Arc<MemorySnapshotStore>>) -> Terminal {
        Terminal::open(
            Arc::new(CommandRegistry::with_builtins()),
            &ShellConfig::default(),
            default_tree(),
            TerminalServices {
                jobs: Arc::new(SimulatedJobService::default()),
                navigator,
                snapshots: store.map(|s| s as Arc<dyn SnapshotStore>),
            },
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn results_dir_must_exist_in_the_tree() {
        let services = || TerminalServices {
            jobs: Arc::new(SimulatedJobService::default()),
            navigator: Arc::new(Recorder::default()),
            snapshots: None,
        };
        let tree = FileTree::new(crate::vfs::FileNode::directory("", vec![])).unwrap();
        let error = Terminal::open(
            Arc::new(CommandRegistry::with_builtins()),
            &ShellConfig::default(),
            tree,
            services(),
        )
        .err()
        .unwrap();
        assert!(matches!(error, ShellError::Config(_)));
        assert!(error.to_string().contains("/results"));

        let mut config = ShellConfig::default();
        config.jobs.results_dir = "/about.txt".to_string();
        let error = Terminal::open(
            Arc::new(CommandRegistry::with_builtins()),
            &config,
            default_tree(),
            services(),
        )
        .err()
        .unwrap();
        assert!(matches!(error, ShellError::Config(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn run_line_records_and_outputs() {
        let mut terminal = open_with(Arc::default(), None);
        terminal.run_line("pwd").await;
        assert_eq!(terminal.transcript().texts(), vec!["pwd", "/"]);
        assert!(terminal.state().prompt_visible);
    }

    #[tokio::test(start_paused = true)]
    async fn errors_become_one_error_entry() {
        let mut terminal = open_with(Arc::default(), None);
        terminal.run_line("frobnicate now").await;
        let last = terminal.transcript().last().unwrap();
        assert_eq!(last.text, "frobnicate: command not found");
        assert_eq!(last.kind, crate::session::EntryKind::Error);
        assert_eq!(terminal.transcript().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn navigation_waits_for_the_delay() {
        let navigator = Arc::new(Recorder::default());
        let mut terminal = open_with(Arc::clone(&navigator), None);
        terminal.run_line("cd contact/github").await;
        assert!(terminal.state().working_directory.is_root());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(navigator.0.lock().unwrap().is_empty());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(
            navigator.0.lock().unwrap().as_slice(),
            &[NavigationTarget::External("https://github.com/".into())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn keys_edit_and_submit() {
        let mut terminal = open_with(Arc::default(), None);
        for c in "pwdx".chars() {
            terminal.handle_key(KeyInput::Char(c)).await;
        }
        terminal.handle_key(KeyInput::Backspace).await;
        assert_eq!(terminal.state().input, "pwd");
        terminal.handle_key(KeyInput::Enter).await;
        assert_eq!(terminal.transcript().texts(), vec!["pwd", "/"]);
        assert!(terminal.state().input.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn escape_closes_overlay_first() {
        let mut terminal = open_with(Arc::default(), None);
        terminal.run_line("jobs monitor").await;
        assert_eq!(terminal.state().overlay, Overlay::Monitor);
        terminal.handle_key(KeyInput::Escape).await;
        assert_eq!(terminal.state().overlay, Overlay::None);
    }

    #[tokio::test(start_paused = true)]
    async fn every_dispatch_is_persisted() {
        let store = Arc::new(MemorySnapshotStore::new());
        let mut terminal = open_with(Arc::default(), Some(Arc::clone(&store)));
        terminal.run_line("cd projects").await;
        let snapshot = store.load().unwrap().unwrap();
        assert_eq!(snapshot.working_directory.to_string(), "/projects");
    }

    #[tokio::test(start_paused = true)]
    async fn close_stops_timers() {
        let mut terminal = open_with(Arc::default(), None);
        terminal.run_line("scrape https://example.com").await;
        terminal.close();
        assert!(terminal.is_closed());
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(terminal.process_pending(), 0);
    }
}
