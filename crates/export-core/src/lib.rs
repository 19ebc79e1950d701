//! Export Core - turns a set of TSX/JSX components into a runnable React
//! app, a Next.js app, or a publishable component library.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Pure transforms** - dependency scanning (`deps`), name
//!   normalization (`naming`), option validation (`options`), and project
//!   generation (`templates`). None of these touch the file system.
//! - **Layer 2: Orchestration** - `export` writes a generated tree to disk,
//!   runs the package manager, and starts the dev server, reporting over an
//!   ordered progress channel with cooperative cancellation.
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use export_core::{spawn_export, ExportJob, JobSteps, ProgressEvent, ToolchainConfig};
//!
//! let job = ExportJob::new(components, options, "out/gallery", JobSteps::new(true, false))?;
//! let mut handle = spawn_export(job, ToolchainConfig::default());
//! while let Some(event) = handle.progress.recv().await {
//!     if let ProgressEvent::Message(line) = event {
//!         println!("{line}");
//!     }
//! }
//! let job = handle.join.await?;
//! ```

pub mod component;
pub mod config;
pub mod deps;
pub mod error;
pub mod export;
pub mod naming;
pub mod options;
pub mod runtime;
pub mod templates;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use component::{load_components, Component};
pub use config::{ExportConfig, ToolchainConfig};
pub use error::{ExportError, GenerateError, OptionsError};
pub use export::{
    spawn_export, spawn_export_with_cancel, ExportJob, JobHandle, JobOutcome, JobStatus, JobSteps,
    ProgressEvent,
};
pub use options::{ExportOptions, RawOptions, Variant};
pub use templates::{generate, GeneratedProject, GeneratedTree};

#[cfg(feature = "tui")]
pub use tui::run;
