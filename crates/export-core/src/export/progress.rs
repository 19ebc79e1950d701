//! Ordered progress channel between a running job and its sink

use super::job::{ExportJob, JobOutcome, JobStatus};
use tokio::sync::mpsc;

/// Capacity of the progress channel. A slow sink applies backpressure to
/// the job instead of growing an unbounded queue.
pub const PROGRESS_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A human-readable step or output line
    Message(String),
    /// The job entered a new state
    Status(JobStatus),
    /// Always the last event of a job
    Finished(JobOutcome),
}

pub fn channel() -> (mpsc::Sender<ProgressEvent>, mpsc::Receiver<ProgressEvent>) {
    mpsc::channel(PROGRESS_CAPACITY)
}

/// Single producer side of the channel. Every message is also recorded in
/// the job's progress log, so a closed or absent sink loses nothing.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    tx: Option<mpsc::Sender<ProgressEvent>>,
}

impl Reporter {
    pub fn new(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// Reporter that only writes to the job log
    pub fn silent() -> Self {
        Self::default()
    }

    async fn send(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).await.is_err() {
                tracing::trace!("progress receiver dropped");
            }
        }
    }

    pub async fn message(&self, job: &mut ExportJob, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(job = job.id, "{}", message);
        job.push_log(message.clone());
        self.send(ProgressEvent::Message(message)).await;
    }

    /// Transition the job and announce the new state. Returns false if the
    /// transition is not allowed.
    pub async fn status(&self, job: &mut ExportJob, next: JobStatus) -> bool {
        if !job.transition(next) {
            return false;
        }
        self.send(ProgressEvent::Status(next)).await;
        true
    }

    /// Enter a terminal state and emit the single `Finished` event
    pub async fn finish(&self, job: &mut ExportJob, outcome: JobOutcome) {
        if let Some(detail) = &outcome.detail {
            self.message(job, format!("Export failed: {}", detail)).await;
        }
        if job.transition(outcome.status) {
            self.send(ProgressEvent::Status(outcome.status)).await;
        }
        job.set_outcome(outcome.clone());
        self.send(ProgressEvent::Finished(outcome)).await;
    }
}
