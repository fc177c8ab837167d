//! Session state store.
//!
//! One [`SessionState`] per terminal. It changes only through [`reduce`],
//! which applies one [`Action`] at a time and returns the [`Effect`]s its
//! owner has to start (timers, network calls).

mod action;
mod reducer;
mod snapshot;
mod state;
mod transcript;

pub use action::{Action, Effect, Step};
pub use reducer::reduce;
pub use snapshot::{
    FileSnapshotStore, MemorySnapshotStore, SessionSnapshot, SnapshotStore, SNAPSHOT_VERSION,
};
pub use state::{
    CompletionState, MaterializedFile, Overlay, RevealQueue, ReverseSearchState, SessionState,
};
pub use transcript::{EntryId, EntryKind, OutputLine, RevealMode, Transcript, TranscriptEntry};
