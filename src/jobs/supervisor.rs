//! Timers and tasks that drive jobs forward.
//!
//! None of these touch session state. Every outcome is sent back to the
//! owning terminal as an [`Action`] and applied there in order.

use super::{JobId, JobService, JobStatus};
use crate::session::Action;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

pub type ActionSender = mpsc::UnboundedSender<Action>;

/// How long a finished job stays listed before it is pruned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GracePeriods {
    pub completed: Duration,
    pub failed: Duration,
}

impl GracePeriods {
    pub fn for_status(&self, status: JobStatus) -> Duration {
        match status {
            JobStatus::Failed => self.failed,
            _ => self.completed,
        }
    }
}

/// Fixed-interval timer that asks the terminal to poll its jobs. It runs for
/// the terminal's whole lifetime, whether or not any job exists.
pub struct PollTimer {
    stop_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PollTimer {
    /// First tick fires one `period` after start.
    pub fn start(period: Duration, actions: ActionSender) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = interval.tick() => {
                        if actions.send(Action::PollJobs).is_err() {
                            debug!("terminal gone, stopping job poll timer");
                            break;
                        }
                    }
                }
            }
        });
        Self {
            stop_tx: Some(stop_tx),
            task,
        }
    }

    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ask the service for one job's status and report back. Service errors
/// become an `Err` result, which the reducer turns into a failure.
pub async fn fetch_status(service: Arc<dyn JobService>, job_id: JobId, actions: ActionSender) {
    let result = service.status(&job_id).await.map_err(|error| {
        warn!(job_id = %job_id, error = %error, "job status request failed");
        error.to_string()
    });
    if actions.send(Action::JobPolled { job_id, result }).is_err() {
        debug!("terminal gone, dropping job status");
    }
}

/// Prune a finished job after its grace period.
pub async fn prune_after(delay: Duration, job_id: JobId, actions: ActionSender) {
    tokio::time::sleep(delay).await;
    let _ = actions.send(Action::PruneJob(job_id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::SimulatedJobService;

    #[tokio::test(start_paused = true)]
    async fn poll_timer_ticks_on_its_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = PollTimer::start(Duration::from_millis(1500), tx);

        tokio::time::sleep(Duration::from_millis(1400)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(rx.try_recv().unwrap(), Action::PollJobs);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(rx.try_recv().unwrap(), Action::PollJobs);

        timer.stop();
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn timer_stops_when_the_receiver_is_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        let timer = PollTimer::start(Duration::from_millis(10), tx);
        drop(rx);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(timer.is_finished());
    }

    #[tokio::test]
    async fn fetch_reports_errors_as_failures() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let service: Arc<dyn JobService> = Arc::new(SimulatedJobService::default());
        fetch_status(service, JobId::new("missing"), tx).await;
        match rx.recv().await {
            Some(Action::JobPolled { job_id, result }) => {
                assert_eq!(job_id.as_str(), "missing");
                assert!(result.unwrap_err().contains("unknown job"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn prune_waits_for_the_grace_period() {
        let grace = GracePeriods {
            completed: Duration::from_secs(10),
            failed: Duration::from_secs(5),
        };
        assert!(grace.for_status(JobStatus::Failed) < grace.for_status(JobStatus::Completed));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(prune_after(
            grace.for_status(JobStatus::Failed),
            JobId::new("j"),
            tx,
        ));
        tokio::time::sleep(Duration::from_millis(4900)).await;
        assert!(rx.try_recv().is_err());
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(rx.try_recv().unwrap(), Action::PruneJob(JobId::new("j")));
        task.await.unwrap();
    }
}
