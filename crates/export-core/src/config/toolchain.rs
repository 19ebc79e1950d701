//! External package-manager invocation settings

use crate::templates::RunScript;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Overrides `package_manager` from the config file
pub const PACKAGE_MANAGER_ENV: &str = "TSX_EXPORT_PACKAGE_MANAGER";

pub const DEFAULT_PACKAGE_MANAGER: &str = "npm";
pub const DEFAULT_INSTALL_TIMEOUT_SECS: u64 = 600;
pub const DEFAULT_GRACE_PERIOD_SECS: u64 = 5;

/// How the install and dev-server steps reach the package manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
    /// Command line of the package manager, e.g. `npm` or `npx pnpm@8`
    pub package_manager: String,
    pub install_args: Vec<String>,
    pub install_timeout_secs: u64,
    /// How long a freshly started dev server must stay up before it is
    /// considered running
    pub grace_period_secs: u64,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            package_manager: DEFAULT_PACKAGE_MANAGER.to_string(),
            install_args: vec!["install".to_string()],
            install_timeout_secs: DEFAULT_INSTALL_TIMEOUT_SECS,
            grace_period_secs: DEFAULT_GRACE_PERIOD_SECS,
        }
    }
}

impl ToolchainConfig {
    /// Apply `TSX_EXPORT_PACKAGE_MANAGER` if it is set and non-empty
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(pm) = std::env::var(PACKAGE_MANAGER_ENV) {
            if !pm.trim().is_empty() {
                self.package_manager = pm.trim().to_string();
            }
        }
        self
    }

    pub fn install_command(&self) -> CommandSpec {
        self.package_manager_command(self.install_args.iter().map(String::as_str))
    }

    pub fn run_command(&self, script: &RunScript) -> CommandSpec {
        self.package_manager_command(script.args.iter().copied())
    }

    /// `<package manager> --version`, used for availability checks
    pub fn version_command(&self) -> CommandSpec {
        self.package_manager_command(["--version"])
    }

    pub fn install_timeout(&self) -> Duration {
        Duration::from_secs(self.install_timeout_secs)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }

    fn package_manager_command<'a>(&self, args: impl IntoIterator<Item = &'a str>) -> CommandSpec {
        let mut words = self.package_manager.split_whitespace();
        let program = words.next().unwrap_or(DEFAULT_PACKAGE_MANAGER).to_string();
        let args = words
            .map(str::to_string)
            .chain(args.into_iter().map(str::to_string))
            .collect();
        CommandSpec::shell_wrapped(program, args)
    }
}

/// A program plus its arguments, ready to spawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// npm and friends are batch scripts on Windows and must go through `cmd /C`
    fn shell_wrapped(program: String, args: Vec<String>) -> Self {
        if cfg!(windows) {
            let mut wrapped = vec!["/C".to_string(), program];
            wrapped.extend(args);
            Self::new("cmd", wrapped)
        } else {
            Self::new(program, args)
        }
    }

    /// Build a tokio command rooted at `cwd` with stdin closed
    pub fn command(&self, cwd: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).current_dir(cwd).stdin(Stdio::null());
        cmd
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
