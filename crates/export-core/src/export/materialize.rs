//! Writing a generated project to disk

use super::job::ExportJob;
use super::progress::Reporter;
use crate::error::ExportError;
use crate::templates::GeneratedProject;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio_util::sync::CancellationToken;

/// Result of a materialization that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialized {
    Complete,
    /// Stopped between two files; what was written stays
    Cancelled,
}

/// Write every tree entry under `target_dir`, creating parent directories.
///
/// Emits one message per created directory, one for the package manifest,
/// and one per component file. Existing files are overwritten; nothing is
/// ever deleted.
pub async fn materialize(
    project: &GeneratedProject,
    target_dir: &Path,
    job: &mut ExportJob,
    reporter: &Reporter,
    cancel: &CancellationToken,
) -> Result<Materialized, ExportError> {
    create_dir(target_dir).await?;
    reporter
        .message(job, format!("Created directory {}", target_dir.display()))
        .await;

    let mut created: HashSet<PathBuf> = HashSet::new();

    for (rel_path, content) in project.tree.iter() {
        if cancel.is_cancelled() {
            return Ok(Materialized::Cancelled);
        }

        let path = target_dir.join(rel_path);
        if let Some(parent) = path.parent() {
            if parent != target_dir && !created.contains(parent) {
                let existed = fs::try_exists(parent).await.unwrap_or(false);
                create_dir(parent).await?;
                if !existed {
                    if let Ok(rel_parent) = parent.strip_prefix(target_dir) {
                        reporter
                            .message(job, format!("Created directory {}/", to_slash(rel_parent)))
                            .await;
                    }
                }
                created.insert(parent.to_path_buf());
            }
        }

        fs::write(&path, content.as_bytes())
            .await
            .map_err(|source| ExportError::Io {
                path: path.clone(),
                source,
            })?;

        if rel_path == "package.json" {
            reporter.message(job, "Wrote package.json").await;
        } else if let Some(entry) = project.component_at(rel_path) {
            reporter
                .message(job, format!("Added component: {} ({})", entry.name, rel_path))
                .await;
        } else {
            tracing::trace!(job = job.id, path = rel_path, "wrote file");
        }
    }

    reporter
        .message(
            job,
            format!("Wrote {} files to {}", project.tree.len(), target_dir.display()),
        )
        .await;
    Ok(Materialized::Complete)
}

async fn create_dir(dir: &Path) -> Result<(), ExportError> {
    fs::create_dir_all(dir)
        .await
        .map_err(|source| ExportError::Io {
            path: dir.to_path_buf(),
            source,
        })
}

fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
