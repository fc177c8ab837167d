use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a transcript entry. Allocated monotonically per
/// session and never reused, even after `clear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Command,
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealMode {
    #[default]
    Immediate,
    Staged,
}

/// A line a command wants shown, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputLine {
    pub kind: EntryKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighted: Option<String>,
}

impl OutputLine {
    pub fn new(kind: EntryKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            highlighted: None,
        }
    }

    pub fn command(text: impl Into<String>) -> Self {
        Self::new(EntryKind::Command, text)
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(EntryKind::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(EntryKind::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(EntryKind::Error, text)
    }

    pub fn with_highlight(mut self, highlighted: impl Into<String>) -> Self {
        self.highlighted = Some(highlighted.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub id: EntryId,
    pub text: String,
    pub kind: EntryKind,
    #[serde(default)]
    pub reveal: RevealMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlighted: Option<String>,
}

impl TranscriptEntry {
    fn from_line(id: EntryId, line: OutputLine, reveal: RevealMode) -> Self {
        Self {
            id,
            text: line.text,
            kind: line.kind,
            reveal,
            highlighted: line.highlighted,
        }
    }
}

/// Ordered scrollback keyed by entry id.
///
/// Iteration follows append order; `replace` swaps an entry's content while
/// keeping its id and position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: IndexMap<EntryId, TranscriptEntry>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: OutputLine, reveal: RevealMode) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries
            .insert(id, TranscriptEntry::from_line(id, line, reveal));
        id
    }

    /// Replace the content of an existing entry. Returns `false` when the id
    /// is no longer present (for example after `clear`).
    pub fn replace(&mut self, id: EntryId, line: OutputLine) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                *entry = TranscriptEntry::from_line(id, line, RevealMode::Immediate);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: EntryId) -> Option<&TranscriptEntry> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TranscriptEntry> {
        self.entries.values()
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last().map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn next_id(&self) -> EntryId {
        EntryId(self.next_id)
    }

    /// Texts of all entries in order, handy for rendering and tests.
    pub fn texts(&self) -> Vec<&str> {
        self.entries.values().map(|e| e.text.as_str()).collect()
    }

    /// Rebuild from persisted parts, refusing anything that would break id
    /// monotonicity.
    pub(crate) fn from_parts(
        entries: Vec<TranscriptEntry>,
        next_id: u64,
    ) -> Result<Self, String> {
        let mut map = IndexMap::with_capacity(entries.len());
        let mut previous: Option<EntryId> = None;
        for entry in entries {
            if entry.id.0 >= next_id {
                return Err(format!(
                    "entry id {} is not below next id {}",
                    entry.id, next_id
                ));
            }
            if previous.is_some_and(|prev| prev >= entry.id) {
                return Err(format!("entry id {} is out of order", entry.id));
            }
            previous = Some(entry.id);
            map.insert(entry.id, entry);
        }
        Ok(Self {
            entries: map,
            next_id,
        })
    }

    pub(crate) fn to_entries(&self) -> Vec<TranscriptEntry> {
        self.entries.values().cloned().collect()
    }
}
