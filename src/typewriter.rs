//! Staged output reveal.
//!
//! The lines themselves wait in the session's reveal queue. This timer only
//! says when the next one is due, at a roughly constant character rate.

use crate::jobs::supervisor::ActionSender;
use crate::session::Action;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTiming {
    pub char_delay: Duration,
    pub min_line_delay: Duration,
    pub max_line_delay: Duration,
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            char_delay: Duration::from_millis(4),
            min_line_delay: Duration::from_millis(15),
            max_line_delay: Duration::from_millis(250),
        }
    }
}

impl RevealTiming {
    /// `chars × char_delay`, clamped to the line delay bounds.
    pub fn line_delay(&self, chars: usize) -> Duration {
        let chars = u32::try_from(chars).unwrap_or(u32::MAX);
        self.char_delay
            .saturating_mul(chars)
            .max(self.min_line_delay)
            .min(self.max_line_delay)
    }
}

/// Drives at most one reveal sequence at a time.
pub struct Typewriter {
    timing: RevealTiming,
    actions: ActionSender,
    task: Option<JoinHandle<()>>,
}

impl Typewriter {
    pub fn new(timing: RevealTiming, actions: ActionSender) -> Self {
        Self {
            timing,
            actions,
            task: None,
        }
    }

    /// Start revealing `sequence`, cancelling any sequence still running.
    pub fn start(&mut self, sequence: u64, line_lengths: Vec<usize>) {
        self.cancel();
        let timing = self.timing;
        let actions = self.actions.clone();
        self.task = Some(tokio::spawn(async move {
            for chars in line_lengths {
                tokio::time::sleep(timing.line_delay(chars)).await;
                if actions.send(Action::RevealNext { sequence }).is_err() {
                    break;
                }
            }
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                debug!("cancelling reveal sequence");
            }
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Typewriter {
    fn drop(&mut self) {
        self.cancel();
    }
}
