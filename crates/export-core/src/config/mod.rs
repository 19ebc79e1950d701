//! Export configuration file
//!
//! ```yaml
//! toolchain:
//!   package_manager: pnpm
//!   install_timeout_secs: 300
//! framework_app:
//!   router_mode: pages
//!   include_linter: false
//! library:
//!   package_name: "@acme/ui"
//! ```

pub mod toolchain;

use crate::error::ExportError;
use crate::options::{RawFrameworkAppOptions, RawLibraryOptions, RawReactAppOptions};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use toolchain::{CommandSpec, ToolchainConfig, PACKAGE_MANAGER_ENV};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub toolchain: ToolchainConfig,
    pub react_app: RawReactAppOptions,
    pub framework_app: RawFrameworkAppOptions,
    pub library: RawLibraryOptions,
}

impl ExportConfig {
    pub fn parse(path: &Path, text: &str) -> Result<Self, ExportError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|source| ExportError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(path, &text)?;
        tracing::debug!(path = %path.display(), "loaded export config");
        Ok(config)
    }

    /// Load `path` if given, otherwise start from defaults
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path).await,
            None => Ok(Self::default()),
        }
    }
}
