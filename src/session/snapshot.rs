//! Best-effort persistence of a session between runs.
//!
//! Only durable state is captured. Overlay and typewriter state are UI-only
//! and always start inactive after a restore.

use super::state::{MaterializedFile, SessionState};
use super::transcript::{Transcript, TranscriptEntry};
use crate::errors::{ShellError, ShellResult};
use crate::history::derive_history;
use crate::jobs::Job;
use crate::vfs::{FileTree, VirtualPath};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub version: u32,
    pub transcript: Vec<TranscriptEntry>,
    pub next_entry_id: u64,
    pub working_directory: VirtualPath,
    #[serde(default)]
    pub history_cursor: Option<usize>,
    #[serde(default)]
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub materialized: Vec<MaterializedFile>,
}

fn corrupt(message: impl Into<String>) -> ShellError {
    ShellError::StateCorruption(message.into())
}

impl SessionSnapshot {
    pub fn capture(state: &SessionState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            transcript: state.transcript.to_entries(),
            next_entry_id: state.next_entry_id(),
            working_directory: state.working_directory.clone(),
            history_cursor: state.history_cursor,
            jobs: state.jobs.values().cloned().collect(),
            materialized: state.materialized.clone(),
        }
    }

    /// Rebuild a session on top of a fresh content tree. Any inconsistency
    /// is reported as [`ShellError::StateCorruption`].
    pub fn restore(self, mut tree: FileTree, results_dir: VirtualPath) -> ShellResult<SessionState> {
        if self.version != SNAPSHOT_VERSION {
            return Err(corrupt(format!(
                "unsupported snapshot version {}",
                self.version
            )));
        }

        let transcript = Transcript::from_parts(self.transcript, self.next_entry_id).map_err(corrupt)?;

        for file in &self.materialized {
            tree.append_file(&file.dir, file.node.clone())
                .map_err(|e| corrupt(format!("cannot replay {}: {}", file.node.name, e)))?;
        }

        if !tree.is_directory(&self.working_directory) {
            return Err(corrupt(format!(
                "working directory {} does not exist",
                self.working_directory
            )));
        }

        let history_len = derive_history(&transcript).len();
        if self.history_cursor.is_some_and(|cursor| cursor >= history_len) {
            return Err(corrupt("history cursor is out of range"));
        }

        let mut seen = HashSet::new();
        for job in &self.jobs {
            if !seen.insert(job.id.clone()) {
                return Err(corrupt(format!("duplicate job {}", job.id)));
            }
            if job.entry_id.0 >= self.next_entry_id {
                return Err(corrupt(format!("job {} is bound to a future entry", job.id)));
            }
            if let Some(path) = &job.result_path {
                if tree.node(path).is_none() {
                    return Err(corrupt(format!("result file {} is missing", path)));
                }
            }
        }

        let mut state = SessionState::new(tree, results_dir);
        state.transcript = transcript;
        state.working_directory = self.working_directory;
        state.history_cursor = self.history_cursor;
        state.materialized = self.materialized;
        state.jobs = self
            .jobs
            .into_iter()
            .map(|job| (job.id.clone(), job))
            .collect();
        if let Some(cursor) = state.history_cursor {
            if let Some(entry) = derive_history(&state.transcript).get(cursor) {
                state.input = entry.clone();
            }
        }
        Ok(state)
    }
}

/// Where snapshots are kept.
pub trait SnapshotStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> ShellResult<Option<SessionSnapshot>>;

    fn save(&self, snapshot: &SessionSnapshot) -> ShellResult<()>;

    fn clear(&self) -> ShellResult<()>;
}

fn decode(raw: &str) -> ShellResult<SessionSnapshot> {
    serde_json::from_str(raw).map_err(|e| corrupt(e.to_string()))
}

/// JSON file on disk.
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self) -> ShellResult<Option<SessionSnapshot>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => decode(&raw).map(Some),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, snapshot: &SessionSnapshot) -> ShellResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // Write then rename so a crash never leaves half a snapshot behind.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(snapshot)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "snapshot saved");
        Ok(())
    }

    fn clear(&self) -> ShellResult<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != IoErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// In-memory store, kept as serialized JSON so it behaves like the file
/// store, including on corrupt input.
#[derive(Default)]
pub struct MemorySnapshotStore {
    raw: Mutex<Option<String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with arbitrary (possibly invalid) content.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            raw: Mutex::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.raw.lock().ok().and_then(|raw| raw.clone())
    }
}

fn poisoned() -> ShellError {
    ShellError::external("snapshot store lock poisoned")
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> ShellResult<Option<SessionSnapshot>> {
        let raw = self.raw.lock().map_err(|_| poisoned())?;
        raw.as_deref().map(decode).transpose()
    }

    fn save(&self, snapshot: &SessionSnapshot) -> ShellResult<()> {
        let encoded = serde_json::to_string(snapshot)?;
        *self.raw.lock().map_err(|_| poisoned())? = Some(encoded);
        Ok(())
    }

    fn clear(&self) -> ShellResult<()> {
        *self.raw.lock().map_err(|_| poisoned())? = None;
        Ok(())
    }
}
