//! Availability checks for Node.js and the configured package manager

use crate::config::{CommandSpec, ToolchainConfig};
use std::process::Stdio;
use tokio::process::Command;

/// Runtime detection result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInfo {
    pub name: String,
    pub version: Option<String>,
    pub available: bool,
}

impl RuntimeInfo {
    fn missing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            available: false,
        }
    }
}

/// Run `spec` and report the first line of its stdout as the version
pub async fn check_program(name: impl Into<String>, spec: &CommandSpec) -> RuntimeInfo {
    let name = name.into();
    let output = Command::new(&spec.program)
        .args(&spec.args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await;

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout)
                .lines()
                .next()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty());
            RuntimeInfo {
                name,
                version,
                available: true,
            }
        }
        _ => RuntimeInfo::missing(name),
    }
}

/// Check if Node.js is available
pub async fn check_node() -> RuntimeInfo {
    check_program(
        "Node.js",
        &CommandSpec::new("node", vec!["--version".to_string()]),
    )
    .await
}

/// Check Node.js and the package manager. Missing tools are reported, not
/// raised: a missing package manager surfaces later as a spawn error.
pub async fn check_toolchain(toolchain: &ToolchainConfig) -> Vec<RuntimeInfo> {
    let node = check_node().await;
    let pm = check_program(
        toolchain.package_manager.clone(),
        &toolchain.version_command(),
    )
    .await;
    vec![node, pm]
}

/// One line per tool that could not be found
pub fn missing_summary(infos: &[RuntimeInfo]) -> Option<String> {
    let missing: Vec<String> = infos
        .iter()
        .filter(|i| !i.available)
        .map(|i| format!("  - {}", i.name))
        .collect();
    if missing.is_empty() {
        None
    } else {
        Some(format!("Not found on PATH:\n{}", missing.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_check_program_reads_version() {
        let spec = CommandSpec::new("sh", vec!["-c".into(), "echo 9.8.7".into()]);
        let info = check_program("fake", &spec).await;
        assert!(info.available);
        assert_eq!(info.version.as_deref(), Some("9.8.7"));
    }

    #[tokio::test]
    async fn test_check_program_missing() {
        let spec = CommandSpec::new("definitely-not-a-real-tool-xyz", vec![]);
        let info = check_program("ghost", &spec).await;
        assert!(!info.available);
        assert_eq!(
            missing_summary(&[info]).as_deref(),
            Some("Not found on PATH:\n  - ghost")
        );
    }
}
