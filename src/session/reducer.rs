use super::action::{Action, Effect, Step};
use super::state::{CompletionState, MaterializedFile, Overlay, ReverseSearchState, SessionState};
use super::transcript::{OutputLine, RevealMode};
use crate::completion::CompletionCandidate;
use crate::errors::ShellResult;
use crate::history::{derive_history, search_history, step_cursor, step_match};
use crate::jobs::{Job, JobId, JobStatus, JobStatusReport};
use crate::vfs::{FileNode, FileTree, VirtualPath};
use tracing::{debug, warn};

/// The only function that mutates a [`SessionState`]. Anything asynchronous
/// it needs is returned as an [`Effect`] for the owner to start.
pub fn reduce(state: &mut SessionState, action: Action) -> Vec<Effect> {
    match action {
        Action::SetInput(text) => {
            state.input = text;
            state.history_cursor = None;
            state.completion = CompletionState::default();
            Vec::new()
        }
        Action::RecordCommand(line) => {
            // Whatever is still being revealed belongs above the new command.
            flush_reveal(state);
            state
                .transcript
                .push(OutputLine::command(line), RevealMode::Immediate);
            state.input.clear();
            state.history_cursor = None;
            state.completion = CompletionState::default();
            state.prompt_visible = false;
            Vec::new()
        }
        Action::CommandFinished => {
            state.prompt_visible = true;
            Vec::new()
        }
        Action::AppendLines(lines) => {
            for line in lines {
                state.transcript.push(line, RevealMode::Immediate);
            }
            Vec::new()
        }
        Action::ClearTranscript => {
            state.transcript.clear();
            state.reveal.pending.clear();
            state.revealing = false;
            state.history_cursor = None;
            Vec::new()
        }
        Action::SetWorkingDirectory(path) => {
            if state.tree.is_directory(&path) {
                state.working_directory = path;
            } else {
                warn!(path = %path, "ignoring working directory that is not a directory");
            }
            Vec::new()
        }
        Action::OpenOverlay(overlay) => {
            state.overlay = overlay;
            Vec::new()
        }
        Action::CloseOverlay => {
            state.overlay = Overlay::None;
            Vec::new()
        }
        Action::History(step) => {
            reduce_history(state, step);
            Vec::new()
        }
        Action::CompletionCandidates(candidates) => {
            apply_candidates(state, candidates);
            Vec::new()
        }
        Action::CycleCompletion => {
            cycle_completion(state);
            Vec::new()
        }
        Action::StartReverseSearch => {
            let history = derive_history(&state.transcript);
            state.reverse_search = ReverseSearchState {
                active: true,
                query: String::new(),
                matches: search_history(&history, ""),
                match_index: 0,
            };
            Vec::new()
        }
        Action::ReverseSearchQuery(query) => {
            if state.reverse_search.active {
                let history = derive_history(&state.transcript);
                state.reverse_search.matches = search_history(&history, &query);
                state.reverse_search.query = query;
                state.reverse_search.match_index = 0;
            }
            Vec::new()
        }
        Action::ReverseSearchStep(step) => {
            let search = &mut state.reverse_search;
            if search.active {
                search.match_index = step_match(search.match_index, search.matches.len(), step);
            }
            Vec::new()
        }
        Action::ExitReverseSearch => {
            state.reverse_search = ReverseSearchState::default();
            Vec::new()
        }
        Action::BeginReveal(lines) => begin_reveal(state, lines),
        Action::RevealNext { sequence } => {
            reveal_next(state, sequence);
            Vec::new()
        }
        Action::TrackJob {
            job_id,
            urls,
            started_at,
        } => {
            if state.jobs.contains_key(&job_id) {
                warn!(job_id = %job_id, "job is already tracked");
                state.transcript.push(
                    OutputLine::error(format!("[job {}] is already being tracked", job_id)),
                    RevealMode::Immediate,
                );
                return Vec::new();
            }
            let entry_id = state.transcript.push(
                Job::submitted_line(&job_id, urls.len()),
                RevealMode::Immediate,
            );
            debug!(job_id = %job_id, entry_id = %entry_id, "tracking job");
            state
                .jobs
                .insert(job_id.clone(), Job::new(job_id, urls, entry_id, started_at));
            Vec::new()
        }
        Action::PollJobs => state
            .jobs
            .values_mut()
            .filter(|job| !job.status.is_terminal() && !job.polling)
            .map(|job| {
                job.polling = true;
                Effect::FetchJobStatus(job.id.clone())
            })
            .collect(),
        Action::JobPolled { job_id, result } => job_polled(state, job_id, result),
        Action::PruneJob(job_id) => {
            let terminal = state
                .jobs
                .get(&job_id)
                .is_some_and(|job| job.status.is_terminal());
            if terminal {
                state.jobs.shift_remove(&job_id);
                debug!(job_id = %job_id, "pruned job");
            }
            Vec::new()
        }
    }
}

fn reduce_history(state: &mut SessionState, step: Step) {
    let history = derive_history(&state.transcript);
    let cursor = step_cursor(state.history_cursor, history.len(), step);
    if cursor.is_none() && state.history_cursor.is_none() {
        // Not navigating and nothing to navigate to: leave the input alone.
        return;
    }
    state.history_cursor = cursor;
    state.input = cursor
        .and_then(|index| history.get(index).cloned())
        .unwrap_or_default();
    state.completion = CompletionState::default();
}

fn apply_candidates(state: &mut SessionState, candidates: Vec<CompletionCandidate>) {
    state.history_cursor = None;
    if candidates.len() < 2 {
        if let Some(only) = candidates.into_iter().next() {
            state.input = only.replacement;
        }
        state.completion = CompletionState::default();
        return;
    }

    let listing = candidates
        .iter()
        .map(|candidate| candidate.display.as_str())
        .collect::<Vec<_>>()
        .join("  ");
    state
        .transcript
        .push(OutputLine::info(listing), RevealMode::Immediate);
    state.input = candidates[0].replacement.clone();
    state.completion = CompletionState {
        cursor: 1,
        last_applied: Some(state.input.clone()),
        candidates,
    };
}

fn cycle_completion(state: &mut SessionState) {
    if !state.completion.is_cycling(&state.input) {
        state.completion = CompletionState::default();
        return;
    }
    let completion = &mut state.completion;
    let next = completion.candidates[completion.cursor % completion.candidates.len()]
        .replacement
        .clone();
    completion.cursor += 1;
    completion.last_applied = Some(next.clone());
    state.input = next;
}

/// Unrevealed lines of the running sequence are flushed before the new one
/// starts, so nothing is lost or shown twice.
fn begin_reveal(state: &mut SessionState, lines: Vec<OutputLine>) -> Vec<Effect> {
    flush_reveal(state);
    state.reveal.sequence += 1;
    if lines.is_empty() {
        return Vec::new();
    }

    let line_lengths = lines.iter().map(|line| line.text.chars().count()).collect();
    state.reveal.pending = lines.into();
    state.revealing = true;
    vec![Effect::StartReveal {
        sequence: state.reveal.sequence,
        line_lengths,
    }]
}

fn flush_reveal(state: &mut SessionState) {
    while let Some(line) = state.reveal.pending.pop_front() {
        state.transcript.push(line, RevealMode::Staged);
    }
    state.revealing = false;
}

fn reveal_next(state: &mut SessionState, sequence: u64) {
    if sequence != state.reveal.sequence {
        debug!(sequence, current = state.reveal.sequence, "ignoring stale reveal tick");
        return;
    }
    if let Some(line) = state.reveal.pending.pop_front() {
        state.transcript.push(line, RevealMode::Staged);
    }
    state.revealing = !state.reveal.pending.is_empty();
}

fn job_polled(
    state: &mut SessionState,
    job_id: JobId,
    result: Result<JobStatusReport, String>,
) -> Vec<Effect> {
    let Some(job) = state.jobs.get_mut(&job_id) else {
        debug!(job_id = %job_id, "status for a job that is no longer tracked");
        return Vec::new();
    };
    job.polling = false;

    let changed = match result {
        Ok(report) => job.apply_report(report),
        Err(error) => {
            warn!(job_id = %job_id, error = %error, "job status request failed");
            let was_terminal = job.status.is_terminal();
            job.fail(error);
            !was_terminal
        }
    };
    if !changed {
        return Vec::new();
    }

    let mut effects = Vec::new();
    let has_results = job.results.as_ref().is_some_and(|results| !results.is_empty());
    if job.status == JobStatus::Completed && has_results {
        match materialize(&mut state.tree, &state.results_dir, job) {
            Ok(file) => {
                job.result_path = Some(file.dir.child(&file.node.name));
                state.materialized.push(file);
            }
            Err(error) => warn!(job_id = %job_id, error = %error, "could not save job results"),
        }
        state.overlay = Overlay::ScrapeResults(job_id.clone());
        effects.push(Effect::PresentResults(job_id.clone()));
    }

    let line = job.status_line();
    if !state.transcript.replace(job.entry_id, line.clone()) {
        // The bound entry was cleared away; bind to a fresh one.
        job.entry_id = state.transcript.push(line, RevealMode::Immediate);
    }

    if job.status.is_terminal() {
        effects.push(Effect::SchedulePrune {
            job_id,
            status: job.status,
        });
    }
    effects
}

/// Write a completed job's results as a pretty-printed JSON file under
/// `results_dir`.
fn materialize(tree: &mut FileTree, results_dir: &VirtualPath, job: &Job) -> ShellResult<MaterializedFile> {
    let results = job.results.as_deref().unwrap_or_default();
    let json = serde_json::to_string_pretty(results)?;
    let node = FileNode::file(
        free_file_name(tree, results_dir, &job.id.file_stem()),
        json.lines().map(String::from).collect::<Vec<_>>(),
    )
    .with_modified(job.started_at.date_naive());

    tree.append_file(results_dir, node.clone())?;
    Ok(MaterializedFile {
        dir: results_dir.clone(),
        node,
    })
}

/// `scrape-<stem>.json`, or the first of `scrape-<stem>-2.json`,
/// `scrape-<stem>-3.json`, ... that is not taken yet.
fn free_file_name(tree: &FileTree, dir: &VirtualPath, stem: &str) -> String {
    let mut name = format!("scrape-{}.json", stem);
    let mut suffix = 2;
    while tree.node(&dir.child(&name)).is_some() {
        name = format!("scrape-{}-{}.json", stem, suffix);
        suffix += 1;
    }
    name
}
