use export_core::export::{run, Reporter};
use export_core::options::{RawLibraryOptions, RawReactAppOptions};
use export_core::{
    spawn_export, Component, ExportJob, ExportOptions, JobHandle, JobStatus, JobSteps,
    ProgressEvent, ToolchainConfig,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

fn components() -> Vec<Component> {
    vec![
        Component::new(
            "Card",
            "/home/dev/ui/Card.jsx",
            "import X from 'left-pad';\nexport default function Card() { return null; }",
        ),
        Component::new(
            "user-profile",
            "/home/dev/ui/user-profile.tsx",
            "import { motion } from 'framer-motion';\nexport default () => null;",
        ),
    ]
}

fn react_options() -> ExportOptions {
    ExportOptions::ReactApp(RawReactAppOptions::default().validate().unwrap())
}

/// Write a shell script standing in for the package manager
fn fake_package_manager(dir: &Path, body: &str) -> ToolchainConfig {
    let script = dir.join("fake-pm.sh");
    std::fs::write(&script, body).unwrap();
    ToolchainConfig {
        package_manager: format!("sh {}", script.display()),
        install_timeout_secs: 20,
        grace_period_secs: 1,
        ..Default::default()
    }
}

async fn drain(mut handle: JobHandle) -> (Vec<ProgressEvent>, ExportJob) {
    let collect = async {
        let mut events = Vec::new();
        while let Some(event) = handle.progress.recv().await {
            events.push(event);
        }
        events
    };
    let events = tokio::time::timeout(Duration::from_secs(30), collect)
        .await
        .expect("job did not finish");
    let job = handle.join.await.unwrap();
    (events, job)
}

fn statuses(events: &[ProgressEvent]) -> Vec<JobStatus> {
    events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Status(s) => Some(*s),
            _ => None,
        })
        .collect()
}

fn assert_single_finish_last(events: &[ProgressEvent], status: JobStatus) {
    let finished: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, ProgressEvent::Finished(_)))
        .collect();
    assert_eq!(finished.len(), 1);
    match events.last() {
        Some(ProgressEvent::Finished(outcome)) => assert_eq!(outcome.status, status),
        other => panic!("last event was {:?}", other),
    }
}

fn read_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
            (rel, std::fs::read(e.path()).unwrap())
        })
        .collect()
}

#[tokio::test]
async fn test_generate_only_materializes_tree() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("gallery");
    let job = ExportJob::new(components(), react_options(), &target, JobSteps::generate_only()).unwrap();

    let (events, job) = drain(spawn_export(job, ToolchainConfig::default())).await;

    assert_eq!(job.status(), JobStatus::Succeeded);
    assert_eq!(statuses(&events), vec![JobStatus::Generating, JobStatus::Succeeded]);
    assert_single_finish_last(&events, JobStatus::Succeeded);

    let log = job.progress_log();
    assert!(log.iter().any(|l| l == "Wrote package.json"));
    assert!(log
        .iter()
        .any(|l| l == "Added component: Card (src/components/card.jsx)"));
    assert!(log
        .iter()
        .any(|l| l == "Added component: user-profile (src/components/userProfile.tsx)"));
    assert!(log.iter().any(|l| l == "Found dependencies: framer-motion, left-pad"));

    let project = job.project.as_ref().unwrap();
    let on_disk = read_tree(&target);
    assert_eq!(on_disk.len(), project.tree.len());
    for (path, content) in project.tree.iter() {
        assert_eq!(on_disk[&PathBuf::from(path)], content.as_bytes(), "{path}");
    }
}

#[tokio::test]
async fn test_rerun_into_cleared_directory_is_identical() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("out");

    let mut trees = Vec::new();
    for _ in 0..2 {
        if target.exists() {
            std::fs::remove_dir_all(&target).unwrap();
        }
        let mut job = ExportJob::new(components(), react_options(), &target, JobSteps::default()).unwrap();
        let status = run(
            &mut job,
            &ToolchainConfig::default(),
            &Reporter::silent(),
            &CancellationToken::new(),
        )
        .await;
        assert_eq!(status, JobStatus::Succeeded);
        trees.push(read_tree(&target));
    }
    assert_eq!(trees[0], trees[1]);
}

#[tokio::test]
async fn test_duplicate_names_fail_before_writing() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("never");
    let dupes = vec![
        Component::new("Card", "a/Card.jsx", "import {useState} from 'react';"),
        Component::new("Card", "b/Card.jsx", "export default () => null;"),
    ];
    let job = ExportJob::new(dupes, react_options(), &target, JobSteps::new(true, false)).unwrap();

    let (events, job) = drain(spawn_export(job, ToolchainConfig::default())).await;

    assert_eq!(job.status(), JobStatus::Failed);
    assert_single_finish_last(&events, JobStatus::Failed);
    assert!(!target.exists());
    assert!(!statuses(&events).contains(&JobStatus::Installing));
    let detail = job.outcome().unwrap().detail.clone().unwrap();
    assert!(detail.contains("identifier 'card'"), "{detail}");
}

#[tokio::test]
async fn test_write_failure_reports_partial_output() {
    let tmp = tempfile::tempdir().unwrap();
    let blocker = tmp.path().join("file.txt");
    std::fs::write(&blocker, "not a directory").unwrap();
    let target = blocker.join("out");

    let job = ExportJob::new(components(), react_options(), &target, JobSteps::default()).unwrap();
    let (events, job) = drain(spawn_export(job, ToolchainConfig::default())).await;

    assert_eq!(job.status(), JobStatus::Failed);
    assert_single_finish_last(&events, JobStatus::Failed);
    let last = job.progress_log().last().unwrap();
    assert!(last.contains("not fully materialized"), "{last}");
}

#[cfg(unix)]
#[tokio::test]
async fn test_install_failure_captures_stderr_and_skips_run() {
    let tmp = tempfile::tempdir().unwrap();
    let toolchain = fake_package_manager(
        tmp.path(),
        "echo \"resolving $1\"\necho 'npm ERR! 404 left-pad not found' >&2\nexit 1\n",
    );
    let target = tmp.path().join("app");
    let job = ExportJob::new(components(), react_options(), &target, JobSteps::new(true, true)).unwrap();

    let (events, job) = drain(spawn_export(job, toolchain)).await;

    assert_eq!(job.status(), JobStatus::Failed);
    assert_eq!(
        statuses(&events),
        vec![JobStatus::Generating, JobStatus::Installing, JobStatus::Failed]
    );
    assert_single_finish_last(&events, JobStatus::Failed);

    let log = job.progress_log();
    assert!(log.iter().any(|l| l == "resolving install"));
    let last = log.last().unwrap();
    assert!(last.contains("npm ERR! 404 left-pad not found"), "{last}");
    assert!(last.contains("exited with code 1"), "{last}");
}

#[cfg(unix)]
#[tokio::test]
async fn test_cancel_during_install_terminates_child() {
    let tmp = tempfile::tempdir().unwrap();
    let pid_file = tmp.path().join("install.pid");
    let toolchain = fake_package_manager(
        tmp.path(),
        &format!("echo $$ > {}\necho started\nsleep 30\n", pid_file.display()),
    );
    let target = tmp.path().join("app");
    let job = ExportJob::new(components(), react_options(), &target, JobSteps::new(true, true)).unwrap();

    let mut handle = spawn_export(job, toolchain);
    let mut events = Vec::new();
    let wait_for_start = async {
        while let Some(event) = handle.progress.recv().await {
            let started = event == ProgressEvent::Message("started".to_string());
            events.push(event);
            if started {
                break;
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(20), wait_for_start)
        .await
        .expect("install never started");
    handle.cancel();

    let (rest, job) = drain(handle).await;
    events.extend(rest);

    assert_eq!(job.status(), JobStatus::Cancelled);
    assert_single_finish_last(&events, JobStatus::Cancelled);
    assert!(!statuses(&events).contains(&JobStatus::Running));
    assert_eq!(job.outcome().unwrap().detail, None);

    let pid = std::fs::read_to_string(&pid_file).unwrap();
    let alive = std::process::Command::new("kill")
        .args(["-0", pid.trim()])
        .status()
        .unwrap()
        .success();
    assert!(!alive, "install process {} still running", pid.trim());
}

#[cfg(unix)]
#[tokio::test]
async fn test_install_timeout_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let mut toolchain = fake_package_manager(tmp.path(), "sleep 30\n");
    toolchain.install_timeout_secs = 1;
    let job = ExportJob::new(
        components(),
        react_options(),
        tmp.path().join("app"),
        JobSteps::new(true, false),
    )
    .unwrap();

    let (_, job) = drain(spawn_export(job, toolchain)).await;

    assert_eq!(job.status(), JobStatus::Failed);
    let detail = job.outcome().unwrap().detail.clone().unwrap();
    assert!(detail.contains("did not finish within 1 seconds"), "{detail}");
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_detaches_dev_server_and_reports_url() {
    let tmp = tempfile::tempdir().unwrap();
    let pid_file = tmp.path().join("server.pid");
    let toolchain = fake_package_manager(
        tmp.path(),
        &format!(
            "case \"$1\" in\n  install) echo 'added 3 packages' ;;\n  start) echo $$ > {} ; exec sleep 30 ;;\nesac\n",
            pid_file.display()
        ),
    );
    let job = ExportJob::new(
        components(),
        react_options(),
        tmp.path().join("app"),
        JobSteps::new(false, true),
    )
    .unwrap();

    let (events, job) = drain(spawn_export(job, toolchain)).await;

    assert_eq!(job.status(), JobStatus::Succeeded);
    assert_eq!(
        statuses(&events),
        vec![
            JobStatus::Generating,
            JobStatus::Installing,
            JobStatus::Running,
            JobStatus::Succeeded
        ]
    );
    let outcome = job.outcome().unwrap();
    assert_eq!(outcome.url.as_deref(), Some("http://localhost:3000"));
    assert!(job.progress_log().iter().any(|l| l == "added 3 packages"));

    // The server outlives the job
    let pid = std::fs::read_to_string(&pid_file).unwrap();
    let alive = std::process::Command::new("kill")
        .args(["-0", pid.trim()])
        .status()
        .unwrap()
        .success();
    assert!(alive);
    let _ = std::process::Command::new("kill").arg(pid.trim()).status();
}

#[cfg(unix)]
#[tokio::test]
async fn test_dev_server_exiting_during_grace_period_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let toolchain = fake_package_manager(
        tmp.path(),
        "case \"$1\" in\n  install) exit 0 ;;\n  run) exit 3 ;;\nesac\n",
    );
    let options = ExportOptions::Library(
        RawLibraryOptions {
            package_name: Some("ui-kit".into()),
            ..Default::default()
        }
        .validate()
        .unwrap(),
    );
    let job = ExportJob::new(
        components(),
        options,
        tmp.path().join("lib"),
        JobSteps::new(true, true),
    )
    .unwrap();

    let (events, job) = drain(spawn_export(job, toolchain)).await;

    assert_eq!(job.status(), JobStatus::Failed);
    assert!(statuses(&events).contains(&JobStatus::Running));
    let detail = job.outcome().unwrap().detail.clone().unwrap();
    assert!(detail.contains("run storybook"), "{detail}");
    assert!(detail.contains("exited with code 3"), "{detail}");
}

/// Running and not a zombie waiting to be reaped
#[cfg(unix)]
fn is_running(pid: &str) -> bool {
    let pid = pid.trim();
    if let Ok(stat) = std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        return stat
            .rsplit(')')
            .next()
            .and_then(|rest| rest.trim_start().chars().next())
            != Some('Z');
    }
    std::process::Command::new("kill")
        .args(["-0", pid])
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(unix)]
async fn exits_soon(pid: &str) -> bool {
    for _ in 0..60 {
        if !is_running(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

#[cfg(unix)]
#[tokio::test]
async fn test_cancel_while_dev_server_starts() {
    let tmp = tempfile::tempdir().unwrap();
    let pid_file = tmp.path().join("server-child.pid");
    let mut toolchain = fake_package_manager(
        tmp.path(),
        &format!(
            "case \"$1\" in\n  install) exit 0 ;;\n  start) sleep 60 & echo $! > {} ; wait ;;\nesac\n",
            pid_file.display()
        ),
    );
    toolchain.grace_period_secs = 20;
    let job = ExportJob::new(
        components(),
        react_options(),
        tmp.path().join("app"),
        JobSteps::new(true, true),
    )
    .unwrap();

    let mut handle = spawn_export(job, toolchain);
    let mut events = Vec::new();
    let wait_for_server = async {
        while let Some(event) = handle.progress.recv().await {
            let running = event == ProgressEvent::Status(JobStatus::Running);
            events.push(event);
            if running {
                break;
            }
        }
        loop {
            match std::fs::read_to_string(&pid_file) {
                Ok(pid) if !pid.trim().is_empty() => break pid,
                _ => tokio::time::sleep(Duration::from_millis(20)).await,
            }
        }
    };
    let pid = tokio::time::timeout(Duration::from_secs(20), wait_for_server)
        .await
        .expect("dev server never started");
    handle.cancel();

    let (rest, job) = drain(handle).await;
    events.extend(rest);

    assert_eq!(job.status(), JobStatus::Cancelled);
    assert_single_finish_last(&events, JobStatus::Cancelled);
    let outcome = job.outcome().unwrap();
    assert_eq!(outcome.detail, None);
    assert_eq!(outcome.url, None);
    assert!(!job
        .progress_log()
        .iter()
        .any(|l| l.starts_with("Dev server running at")));
    assert!(exits_soon(&pid).await, "dev server child {} outlived cancellation", pid.trim());
}

#[tokio::test]
async fn test_cancel_before_start() {
    let tmp = tempfile::tempdir().unwrap();
    let target = tmp.path().join("app");
    let mut job = ExportJob::new(components(), react_options(), &target, JobSteps::default()).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let status = run(&mut job, &ToolchainConfig::default(), &Reporter::silent(), &cancel).await;

    assert_eq!(status, JobStatus::Cancelled);
    assert!(!target.exists());
    assert_eq!(job.progress_log().last().map(String::as_str), Some("Export cancelled"));
}
