//! Child processes for the install and dev-server steps

use super::job::ExportJob;
use super::progress::Reporter;
use crate::config::CommandSpec;
use crate::error::ExportError;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Child;
use tokio_util::sync::CancellationToken;

#[cfg(unix)]
use nix::sys::signal::{killpg, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// How a child-process step ended when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    Cancelled,
}

/// How the dev-server step ended when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DevServer {
    /// Still up after the grace period and no longer owned by the job
    Detached { pid: Option<u32> },
    Cancelled,
}

fn spawn_error(spec: &CommandSpec, source: std::io::Error) -> ExportError {
    ExportError::Spawn {
        command: spec.to_string(),
        source,
    }
}

/// How long a process group gets between SIGTERM and SIGKILL
const TERM_GRACE: Duration = Duration::from_secs(2);

/// Stop the child and everything it started, then reap it.
///
/// On unix the child leads its own process group: the group gets SIGTERM,
/// then SIGKILL once the leader has exited or `TERM_GRACE` runs out, so
/// grandchildren (`npm` -> `sh` -> `node`) do not outlive the job.
async fn terminate(child: &mut Child, spec: &CommandSpec) {
    tracing::warn!(command = %spec, pid = ?child.id(), "terminating child process");

    #[cfg(unix)]
    if let Some(pid) = child.id() {
        signal_group(pid, Signal::SIGTERM, spec);
        if tokio::time::timeout(TERM_GRACE, child.wait()).await.is_err() {
            tracing::debug!(command = %spec, "process group still running after SIGTERM");
        }
        signal_group(pid, Signal::SIGKILL, spec);
    }

    if let Err(e) = child.start_kill() {
        tracing::trace!(command = %spec, "kill failed: {}", e);
    }
    let _ = child.wait().await;
}

#[cfg(unix)]
fn signal_group(pid: u32, signal: Signal, spec: &CommandSpec) {
    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    // ESRCH once every member is gone
    if let Err(e) = killpg(Pid::from_raw(raw), signal) {
        tracing::trace!(command = %spec, ?signal, "killpg: {}", e);
    }
}

fn timeout_error(spec: &CommandSpec, timeout: Duration) -> ExportError {
    ExportError::Timeout {
        command: spec.to_string(),
        secs: timeout.as_secs(),
    }
}

/// Run `spec` in `cwd`, forwarding each stdout line to the progress
/// channel as it arrives and keeping stderr for the failure detail.
///
/// The child's process group is stopped if the job is cancelled or the
/// timeout expires; the child itself is killed if this future is dropped.
/// Cancellation and the deadline stay live while a line waits for room in
/// the progress channel.
pub async fn run_streaming(
    spec: &CommandSpec,
    cwd: &Path,
    timeout: Duration,
    job: &mut ExportJob,
    reporter: &Reporter,
    cancel: &CancellationToken,
) -> Result<StepOutcome, ExportError> {
    let mut cmd = spec.command(cwd);
    cmd.stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd.spawn().map_err(|e| spawn_error(spec, e))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| spawn_error(spec, std::io::Error::other("stdout was not captured")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| spawn_error(spec, std::io::Error::other("stderr was not captured")))?;

    let mut stdout_reader = BufReader::new(stdout).lines();
    let mut stderr_reader = BufReader::new(stderr).lines();
    let mut stdout_done = false;
    let mut stderr_done = false;
    let mut captured_stderr: Vec<String> = Vec::new();

    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);

    let status = loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                terminate(&mut child, spec).await;
                return Ok(StepOutcome::Cancelled);
            }
            _ = &mut deadline => {
                terminate(&mut child, spec).await;
                return Err(timeout_error(spec, timeout));
            }
            line = stdout_reader.next_line(), if !stdout_done => {
                match line {
                    Ok(Some(line)) => {
                        tokio::select! {
                            biased;

                            _ = cancel.cancelled() => {
                                terminate(&mut child, spec).await;
                                return Ok(StepOutcome::Cancelled);
                            }
                            _ = &mut deadline => {
                                terminate(&mut child, spec).await;
                                return Err(timeout_error(spec, timeout));
                            }
                            _ = reporter.message(job, line) => {}
                        }
                    }
                    Ok(None) => stdout_done = true,
                    Err(e) => {
                        tracing::debug!(command = %spec, "error reading stdout: {}", e);
                        stdout_done = true;
                    }
                }
            }
            line = stderr_reader.next_line(), if !stderr_done => {
                match line {
                    Ok(Some(line)) => {
                        tracing::debug!(command = %spec, "stderr: {}", line);
                        captured_stderr.push(line);
                    }
                    Ok(None) => stderr_done = true,
                    Err(e) => {
                        tracing::debug!(command = %spec, "error reading stderr: {}", e);
                        stderr_done = true;
                    }
                }
            }
            status = child.wait(), if stdout_done && stderr_done => {
                break status.map_err(|e| spawn_error(spec, e))?;
            }
        }
    };

    if status.success() {
        Ok(StepOutcome::Completed)
    } else {
        let code = status.code().unwrap_or(-1);
        tracing::warn!(command = %spec, code, "process failed");
        Err(ExportError::ExitStatus {
            command: spec.to_string(),
            code,
            stderr: captured_stderr.join("\n"),
        })
    }
}

/// Start a dev server and wait out the grace period.
///
/// A server that exits during the grace period fails the step; one still
/// alive afterwards is left running on its own. Cancellation during the
/// grace period stops it.
pub async fn start_detached(
    spec: &CommandSpec,
    cwd: &Path,
    grace: Duration,
    cancel: &CancellationToken,
) -> Result<DevServer, ExportError> {
    let mut cmd = spec.command(cwd);
    cmd.stdout(Stdio::null()).stderr(Stdio::null());
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd.spawn().map_err(|e| spawn_error(spec, e))?;
    let pid = child.id();
    tracing::debug!(command = %spec, ?pid, "dev server started");

    tokio::select! {
        _ = cancel.cancelled() => {
            terminate(&mut child, spec).await;
            Ok(DevServer::Cancelled)
        }
        status = child.wait() => {
            let status = status.map_err(|e| spawn_error(spec, e))?;
            let code = status.code().unwrap_or(-1);
            tracing::warn!(command = %spec, code, "dev server exited during startup");
            Err(ExportError::EarlyExit {
                command: spec.to_string(),
                code,
            })
        }
        _ = tokio::time::sleep(grace) => {
            // Dropping the handle leaves the process running
            drop(child);
            Ok(DevServer::Detached { pid })
        }
    }
}
