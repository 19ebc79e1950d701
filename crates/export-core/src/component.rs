//! Component snapshots taken from the registry at export start

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

/// File extensions recognised as component sources
const COMPONENT_EXTENSIONS: &[&str] = &["tsx", "jsx"];

/// A UI component as handed over by the registry
///
/// `content` is opaque text: the exporter only scans it for import
/// specifiers and otherwise copies it verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    pub filepath: PathBuf,
    pub content: String,
}

impl Component {
    pub fn new(
        name: impl Into<String>,
        filepath: impl Into<PathBuf>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            filepath: filepath.into(),
            content: content.into(),
        }
    }

    /// Read a component from disk; the display name is the file stem
    pub async fn from_file(path: &Path) -> Result<Self> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("Invalid component file name: {}", path.display()))?
            .to_string();
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read component {}", path.display()))?;

        Ok(Self::new(name, path, content))
    }

    /// Whether the source file is TypeScript (`.tsx`)
    pub fn is_typescript(&self) -> bool {
        self.filepath
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tsx"))
    }
}

/// Collect component files from explicit paths and directories.
///
/// Directories are walked recursively and their matches sorted so the
/// snapshot order does not depend on the host file system. The same file
/// listed twice is only loaded once.
pub async fn load_components(files: &[PathBuf], dirs: &[PathBuf]) -> Result<Vec<Component>> {
    let mut paths: Vec<PathBuf> = files.to_vec();

    for dir in dirs {
        let mut found: Vec<PathBuf> = WalkDir::new(dir)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| is_component_file(path))
            .collect();
        found.sort();
        paths.extend(found);
    }

    let mut seen = HashSet::new();
    let mut components = Vec::new();
    for path in paths {
        let key = std::fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if !seen.insert(key) {
            continue;
        }
        components.push(Component::from_file(&path).await?);
    }

    Ok(components)
}

fn is_component_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            COMPONENT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}
