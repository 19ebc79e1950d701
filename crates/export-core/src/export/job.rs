//! Export job run-state

use crate::component::Component;
use crate::error::OptionsError;
use crate::options::{ExportOptions, Variant};
use crate::templates::GeneratedProject;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Pending,
    Generating,
    Installing,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    fn rank(self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Generating => 1,
            JobStatus::Installing => 2,
            JobStatus::Running => 3,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Cancelled => 4,
        }
    }

    /// Forward-only transitions. `Failed` needs a step in progress;
    /// `Cancelled` is reachable from every non-terminal state.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            JobStatus::Cancelled => true,
            JobStatus::Failed | JobStatus::Succeeded => self != JobStatus::Pending,
            _ => next.rank() > self.rank(),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Generating => "generating",
            JobStatus::Installing => "installing",
            JobStatus::Running => "running",
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Which toolchain steps follow generation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobSteps {
    pub install: bool,
    pub run: bool,
}

impl JobSteps {
    /// Running needs installed dependencies, so `run` implies `install`
    pub fn new(install: bool, run: bool) -> Self {
        Self {
            install: install || run,
            run,
        }
    }

    pub fn generate_only() -> Self {
        Self::default()
    }
}

/// Terminal status plus what the sink should show for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutcome {
    pub status: JobStatus,
    /// Failure cause; `None` for success and cancellation
    pub detail: Option<String>,
    /// Local URL of the dev server left running
    pub url: Option<String>,
}

/// One export run: a components snapshot, validated options, and a target
/// directory, plus everything that happened to them.
#[derive(Debug, Clone)]
pub struct ExportJob {
    pub id: u64,
    pub variant: Variant,
    pub target_dir: PathBuf,
    pub components: Vec<Component>,
    pub options: ExportOptions,
    pub steps: JobSteps,
    /// Set once generation succeeds
    pub project: Option<GeneratedProject>,
    status: JobStatus,
    progress_log: Vec<String>,
    outcome: Option<JobOutcome>,
}

impl ExportJob {
    /// Create a pending job. Options asking for "run" add the run step;
    /// a library without Storybook has nothing to run.
    pub fn new(
        components: Vec<Component>,
        options: ExportOptions,
        target_dir: impl Into<PathBuf>,
        steps: JobSteps,
    ) -> Result<Self, OptionsError> {
        let steps = JobSteps::new(steps.install, steps.run || options.requests_run());

        if let ExportOptions::Library(lib) = &options {
            if steps.run && !lib.include_storybook {
                return Err(OptionsError::NotRunnable {
                    variant: "library",
                    reason: "only the Storybook server can be started; enable include_storybook",
                });
            }
        }

        Ok(Self {
            id: NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed),
            variant: options.variant(),
            target_dir: target_dir.into(),
            components,
            options,
            steps,
            project: None,
            status: JobStatus::Pending,
            progress_log: Vec::new(),
            outcome: None,
        })
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn progress_log(&self) -> &[String] {
        &self.progress_log
    }

    pub fn outcome(&self) -> Option<&JobOutcome> {
        self.outcome.as_ref()
    }

    /// Move to `next` if the transition is allowed
    pub(crate) fn transition(&mut self, next: JobStatus) -> bool {
        if !self.status.can_transition_to(next) {
            tracing::warn!(job = self.id, from = %self.status, to = %next, "rejected status transition");
            return false;
        }
        tracing::debug!(job = self.id, from = %self.status, to = %next, "job status");
        self.status = next;
        true
    }

    pub(crate) fn push_log(&mut self, message: String) {
        self.progress_log.push(message);
    }

    pub(crate) fn set_outcome(&mut self, outcome: JobOutcome) {
        self.outcome = Some(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{RawLibraryOptions, RawReactAppOptions};

    fn react(run: bool) -> ExportOptions {
        ExportOptions::ReactApp(
            RawReactAppOptions {
                run_after_export: Some(run),
                ..Default::default()
            }
            .validate()
            .unwrap(),
        )
    }

    #[test]
    fn test_transitions_are_forward_only() {
        use JobStatus::*;
        assert!(Pending.can_transition_to(Generating));
        assert!(Generating.can_transition_to(Installing));
        assert!(Generating.can_transition_to(Running));
        assert!(Installing.can_transition_to(Succeeded));
        assert!(Running.can_transition_to(Failed));
        assert!(!Installing.can_transition_to(Generating));
        assert!(!Pending.can_transition_to(Failed));
        assert!(!Succeeded.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Generating));
        for s in [Pending, Generating, Installing, Running] {
            assert!(s.can_transition_to(Cancelled));
        }
    }

    #[test]
    fn test_run_implies_install() {
        assert_eq!(JobSteps::new(false, true), JobSteps { install: true, run: true });
        let job = ExportJob::new(vec![], react(true), "/tmp/out", JobSteps::generate_only()).unwrap();
        assert!(job.steps.install && job.steps.run);
        assert_eq!(job.status(), JobStatus::Pending);
    }

    #[test]
    fn test_job_ids_increase() {
        let a = ExportJob::new(vec![], react(false), "/tmp/a", JobSteps::default()).unwrap();
        let b = ExportJob::new(vec![], react(false), "/tmp/b", JobSteps::default()).unwrap();
        assert!(b.id > a.id);
    }

    #[test]
    fn test_library_without_storybook_cannot_run() {
        let options = ExportOptions::Library(
            RawLibraryOptions {
                package_name: Some("ui".into()),
                include_storybook: Some(false),
                ..Default::default()
            }
            .validate()
            .unwrap(),
        );
        let err = ExportJob::new(vec![], options, "/tmp/lib", JobSteps::new(true, true)).unwrap_err();
        assert!(matches!(err, OptionsError::NotRunnable { .. }));
    }
}
