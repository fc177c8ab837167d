use super::state::Overlay;
use super::transcript::OutputLine;
use crate::completion::CompletionCandidate;
use crate::jobs::{JobId, JobStatus, JobStatusReport};
use crate::vfs::VirtualPath;
use chrono::{DateTime, Utc};

/// Direction of a history or reverse-search step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Older,
    Newer,
}

/// Every state change of a session goes through one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Direct editing of the input line.
    SetInput(String),
    /// A line was submitted; appends the command entry.
    RecordCommand(String),
    CommandFinished,
    AppendLines(Vec<OutputLine>),
    ClearTranscript,
    SetWorkingDirectory(VirtualPath),
    OpenOverlay(Overlay),
    CloseOverlay,

    History(Step),

    CompletionCandidates(Vec<CompletionCandidate>),
    CycleCompletion,

    StartReverseSearch,
    ReverseSearchQuery(String),
    ReverseSearchStep(Step),
    ExitReverseSearch,

    BeginReveal(Vec<OutputLine>),
    RevealNext { sequence: u64 },

    TrackJob {
        job_id: JobId,
        urls: Vec<String>,
        started_at: DateTime<Utc>,
    },
    PollJobs,
    JobPolled {
        job_id: JobId,
        result: Result<JobStatusReport, String>,
    },
    PruneJob(JobId),
}

/// Work the owner of the state must start after a transition. The reducer
/// itself never spawns anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartReveal {
        sequence: u64,
        line_lengths: Vec<usize>,
    },
    FetchJobStatus(JobId),
    SchedulePrune {
        job_id: JobId,
        status: JobStatus,
    },
    PresentResults(JobId),
}
