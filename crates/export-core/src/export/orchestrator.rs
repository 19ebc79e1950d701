//! Runs an export job: generate, materialize, install, start

use super::job::{ExportJob, JobOutcome, JobStatus};
use super::materialize::{materialize, Materialized};
use super::process::{self, DevServer, StepOutcome};
use super::progress::{self, ProgressEvent, Reporter};
use crate::config::ToolchainConfig;
use crate::error::ExportError;
use crate::templates;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle to a job running on its own task
#[derive(Debug)]
pub struct JobHandle {
    pub id: u64,
    /// Ordered events; ends with exactly one `Finished`
    pub progress: mpsc::Receiver<ProgressEvent>,
    pub cancel: CancellationToken,
    /// Yields the finished job
    pub join: JoinHandle<ExportJob>,
}

impl JobHandle {
    /// Request cooperative cancellation
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// Start `job` on a dedicated tokio task
pub fn spawn_export(job: ExportJob, toolchain: ToolchainConfig) -> JobHandle {
    spawn_export_with_cancel(job, toolchain, CancellationToken::new())
}

/// Like [`spawn_export`], driven by a caller-owned token (e.g. a child of
/// a Ctrl+C token)
pub fn spawn_export_with_cancel(
    job: ExportJob,
    toolchain: ToolchainConfig,
    cancel: CancellationToken,
) -> JobHandle {
    let (tx, rx) = progress::channel();
    let id = job.id;

    let task_cancel = cancel.clone();
    let join = tokio::spawn(async move {
        let mut job = job;
        run(&mut job, &toolchain, &Reporter::new(tx), &task_cancel).await;
        job
    });

    JobHandle {
        id,
        progress: rx,
        cancel,
        join,
    }
}

/// Drive `job` to a terminal state and return it.
///
/// Never panics on job errors: every failure ends as `Failed` with a
/// detail, and the reporter always sees exactly one `Finished` event.
pub async fn run(
    job: &mut ExportJob,
    toolchain: &ToolchainConfig,
    reporter: &Reporter,
    cancel: &CancellationToken,
) -> JobStatus {
    let outcome = match run_steps(job, toolchain, reporter, cancel).await {
        Ok(Steps::Completed { url }) => JobOutcome {
            status: JobStatus::Succeeded,
            detail: None,
            url,
        },
        Ok(Steps::Cancelled) => JobOutcome {
            status: JobStatus::Cancelled,
            detail: None,
            url: None,
        },
        Err(e) => {
            tracing::warn!(job = job.id, status = %job.status(), "export failed: {}", e);
            JobOutcome {
                status: JobStatus::Failed,
                detail: Some(e.to_string()),
                url: None,
            }
        }
    };

    if outcome.status == JobStatus::Cancelled {
        reporter.message(job, "Export cancelled").await;
    }
    let status = outcome.status;
    reporter.finish(job, outcome).await;
    status
}

enum Steps {
    /// `url` is set when a dev server was left running
    Completed { url: Option<String> },
    Cancelled,
}

async fn run_steps(
    job: &mut ExportJob,
    toolchain: &ToolchainConfig,
    reporter: &Reporter,
    cancel: &CancellationToken,
) -> Result<Steps, ExportError> {
    if cancel.is_cancelled() {
        return Ok(Steps::Cancelled);
    }

    reporter.status(job, JobStatus::Generating).await;
    let summary = format!(
        "Exporting {} component(s) as a {}",
        job.components.len(),
        job.variant
    );
    reporter.message(job, summary).await;

    let project = templates::generate(&job.components, &job.options)?;
    let scanned = &project.manifest.scanned;
    let found = if scanned.is_empty() {
        "none".to_string()
    } else {
        scanned.iter().cloned().collect::<Vec<_>>().join(", ")
    };
    reporter
        .message(job, format!("Found dependencies: {}", found))
        .await;

    let target_dir = job.target_dir.clone();
    let materialized = materialize(&project, &target_dir, job, reporter, cancel).await;
    let run_script = project.run_script.clone();
    job.project = Some(project);
    if materialized? == Materialized::Cancelled {
        return Ok(Steps::Cancelled);
    }

    if job.steps.install {
        if cancel.is_cancelled() {
            return Ok(Steps::Cancelled);
        }
        reporter.status(job, JobStatus::Installing).await;
        let install = toolchain.install_command();
        reporter
            .message(job, format!("Installing dependencies: {}", install))
            .await;

        let outcome = process::run_streaming(
            &install,
            &target_dir,
            toolchain.install_timeout(),
            job,
            reporter,
            cancel,
        )
        .await?;
        if outcome == StepOutcome::Cancelled {
            return Ok(Steps::Cancelled);
        }
        reporter.message(job, "Dependencies installed").await;
    }

    let mut url = None;
    if job.steps.run {
        if cancel.is_cancelled() {
            return Ok(Steps::Cancelled);
        }
        // Library without Storybook is rejected when the job is created
        let Some(script) = run_script else {
            return Ok(Steps::Completed { url: None });
        };

        reporter.status(job, JobStatus::Running).await;
        let start = toolchain.run_command(&script);
        reporter
            .message(job, format!("Starting dev server: {}", start))
            .await;

        match process::start_detached(&start, &target_dir, toolchain.grace_period(), cancel).await? {
            DevServer::Cancelled => return Ok(Steps::Cancelled),
            DevServer::Detached { pid } => {
                let pid = pid.map(|p| format!(" (pid {})", p)).unwrap_or_default();
                reporter
                    .message(job, format!("Dev server running at {}{}", script.url, pid))
                    .await;
                url = Some(script.url.to_string());
            }
        }
    }

    reporter
        .message(job, format!("Export complete: {}", target_dir.display()))
        .await;
    Ok(Steps::Completed { url })
}
