use super::transcript::{OutputLine, Transcript};
use crate::completion::CompletionCandidate;
use crate::jobs::{Job, JobId};
use crate::vfs::{FileNode, FileTree, VirtualPath};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Overlay the host should show above the terminal. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Overlay {
    #[default]
    None,
    /// Manual index, or a specific page.
    Manual(Option<String>),
    /// Live job monitor.
    Monitor,
    /// Results of a completed job.
    ScrapeResults(JobId),
}

/// Multi-match completion in progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionState {
    pub cursor: usize,
    pub candidates: Vec<CompletionCandidate>,
    /// Input text the last completion step produced. Cycling continues only
    /// while the input still equals it.
    pub last_applied: Option<String>,
}

impl CompletionState {
    pub fn is_cycling(&self, input: &str) -> bool {
        self.candidates.len() > 1 && self.last_applied.as_deref() == Some(input)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseSearchState {
    pub active: bool,
    pub query: String,
    /// Matching history entries, most recent first.
    pub matches: Vec<String>,
    pub match_index: usize,
}

impl ReverseSearchState {
    pub fn current_match(&self) -> Option<&str> {
        self.matches.get(self.match_index).map(String::as_str)
    }
}

/// Lines waiting to be revealed by the typewriter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevealQueue {
    pub sequence: u64,
    pub pending: VecDeque<OutputLine>,
}

/// A result file appended to the tree at runtime, kept so it can be replayed
/// onto a fresh tree when a session is restored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializedFile {
    pub dir: VirtualPath,
    pub node: FileNode,
}

/// The single authoritative state of one terminal instance.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub transcript: Transcript,
    pub input: String,
    pub working_directory: VirtualPath,
    pub prompt_visible: bool,
    pub completion: CompletionState,
    /// `None` while not navigating history.
    pub history_cursor: Option<usize>,
    pub reverse_search: ReverseSearchState,
    pub overlay: Overlay,
    pub revealing: bool,
    pub reveal: RevealQueue,
    pub jobs: IndexMap<JobId, Job>,
    pub tree: FileTree,
    pub results_dir: VirtualPath,
    pub materialized: Vec<MaterializedFile>,
}

impl SessionState {
    pub fn new(tree: FileTree, results_dir: VirtualPath) -> Self {
        Self {
            transcript: Transcript::new(),
            input: String::new(),
            working_directory: VirtualPath::root(),
            prompt_visible: true,
            completion: CompletionState::default(),
            history_cursor: None,
            reverse_search: ReverseSearchState::default(),
            overlay: Overlay::None,
            revealing: false,
            reveal: RevealQueue::default(),
            jobs: IndexMap::new(),
            tree,
            results_dir,
            materialized: Vec::new(),
        }
    }

    pub fn next_entry_id(&self) -> u64 {
        self.transcript.next_id().0
    }
}
