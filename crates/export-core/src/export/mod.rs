//! Export orchestration
//!
//! A job moves `pending -> generating -> (installing) -> (running)` and ends
//! in exactly one of `succeeded`, `failed`, or `cancelled`. Progress flows
//! to the sink over an ordered channel; cancellation is a token checked
//! between steps and forwarded to child processes.

pub mod job;
pub mod materialize;
pub mod orchestrator;
pub mod process;
pub mod progress;

pub use job::{ExportJob, JobOutcome, JobStatus, JobSteps};
pub use orchestrator::{run, spawn_export, spawn_export_with_cancel, JobHandle};
pub use progress::{ProgressEvent, Reporter};
