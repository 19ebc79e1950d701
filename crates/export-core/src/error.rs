//! Error types for generation, option validation, and export jobs

use std::path::PathBuf;
use thiserror::Error;

/// Structural problems found before anything is generated
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("No components to export")]
    NoComponents,

    #[error("Components '{first}' and '{second}' both normalize to identifier '{identifier}'")]
    IdentifierCollision {
        identifier: String,
        first: String,
        second: String,
    },

    #[error("Components '{first}' and '{second}' both map to route '/{slug}'")]
    RouteCollision {
        slug: String,
        first: String,
        second: String,
    },

    #[error("Component name '{name}' does not produce a usable file name")]
    InvalidName { name: String },

    #[error("Generated path '{path}' is not a safe relative path")]
    UnsafePath { path: String },

    #[error("Generated path '{path}' was produced twice")]
    DuplicatePath { path: String },
}

/// Options that cannot be turned into a complete, valid record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("Missing required option '{field}' for {variant} export")]
    MissingField {
        variant: &'static str,
        field: &'static str,
    },

    #[error("Invalid package name '{name}': {reason}")]
    InvalidPackageName { name: String, reason: &'static str },

    #[error("Invalid version '{version}' for option '{field}': {reason}")]
    InvalidVersion {
        field: &'static str,
        version: String,
        reason: String,
    },

    #[error("Unknown value '{value}' for option '{field}'")]
    UnknownValue { field: &'static str, value: String },

    #[error("Cannot run a {variant} export: {reason}")]
    NotRunnable {
        variant: &'static str,
        reason: &'static str,
    },
}

/// Everything that can end an export job in `failed`
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Options(#[from] OptionsError),

    #[error("Failed to write {}: {source}. The project is not fully materialized", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with code {code}\n{stderr}")]
    ExitStatus {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("`{command}` did not finish within {secs} seconds")]
    Timeout { command: String, secs: u64 },

    #[error("`{command}` exited with code {code} before the dev server came up")]
    EarlyExit { command: String, code: i32 },

    #[error("Invalid config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl ExportError {
    /// Precondition errors are raised before any side effect and can be
    /// fixed by correcting the input.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Generate(_) | Self::Options(_) | Self::Config { .. })
    }
}
