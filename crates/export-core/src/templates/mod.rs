//! Project generation for the three export variants
//!
//! Generation is pure: it never touches the file system, and identical
//! inputs give byte-identical trees. Each variant is one strategy module;
//! [`generate`] dispatches on the options tag.
//!
//! - `react_app`: single-page app with a component gallery
//! - `framework_app`: Next.js app with one route per component
//! - `library`: publishable package with a barrel export

mod common;
pub mod framework_app;
pub mod library;
pub mod react_app;
pub mod tree;

use crate::component::Component;
use crate::deps::{self, DependencySet};
use crate::error::GenerateError;
use crate::naming;
use crate::options::ExportOptions;
use std::collections::{BTreeMap, HashMap};

pub use tree::{is_safe_relative_path, FileContent, GeneratedTree};

/// Dependency declarations embedded in the generated package.json
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// Packages the variant always declares, with pinned versions
    pub base: BTreeMap<String, String>,
    /// Packages found in component sources, excluding the base set
    pub scanned: DependencySet,
    /// `dependencies` as written (base + scanned)
    pub dependencies: BTreeMap<String, String>,
    pub dev_dependencies: BTreeMap<String, String>,
}

impl Manifest {
    fn new(base: &[(&str, &str)], named: &[Named<'_>]) -> Self {
        let base: BTreeMap<String, String> = base
            .iter()
            .map(|(name, version)| (name.to_string(), version.to_string()))
            .collect();
        let base_names: Vec<&str> = base.keys().map(String::as_str).collect();
        let scanned = deps::aggregate(named.iter().map(|n| n.component), &base_names);

        let mut dependencies = base.clone();
        for dep in &scanned {
            dependencies
                .entry(dep.clone())
                .or_insert_with(|| "latest".to_string());
        }

        Self {
            base,
            scanned,
            dependencies,
            dev_dependencies: BTreeMap::new(),
        }
    }

    fn dev(&mut self, entries: &[(&str, &str)]) {
        for (name, version) in entries {
            self.dev_dependencies
                .insert(name.to_string(), version.to_string());
        }
    }
}

/// Where one input component ended up in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentEntry {
    pub name: String,
    pub identifier: String,
    pub path: String,
}

/// Package-manager script that starts a local server for the project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunScript {
    pub args: Vec<&'static str>,
    pub url: &'static str,
}

/// Output of a generator: the tree plus what the orchestrator needs to
/// report on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedProject {
    pub tree: GeneratedTree,
    pub manifest: Manifest,
    pub components: Vec<ComponentEntry>,
    pub run_script: Option<RunScript>,
}

impl GeneratedProject {
    /// Whether `path` is the generated source file of an input component
    pub fn component_at(&self, path: &str) -> Option<&ComponentEntry> {
        self.components.iter().find(|c| c.path == path)
    }
}

/// Generate a complete project for the variant selected by `options`
pub fn generate(
    components: &[Component],
    options: &ExportOptions,
) -> Result<GeneratedProject, GenerateError> {
    let named = name_components(components)?;
    match options {
        ExportOptions::ReactApp(opts) => react_app::generate(&named, opts),
        ExportOptions::FrameworkApp(opts) => framework_app::generate(&named, opts),
        ExportOptions::Library(opts) => library::generate(&named, opts),
    }
}

/// A component paired with its normalized identifier
#[derive(Debug, Clone)]
pub struct Named<'a> {
    pub component: &'a Component,
    pub identifier: String,
}

/// Normalize every name and reject empty input, unusable names, and
/// identifier collisions (compared without case).
fn name_components(components: &[Component]) -> Result<Vec<Named<'_>>, GenerateError> {
    if components.is_empty() {
        return Err(GenerateError::NoComponents);
    }

    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut named = Vec::with_capacity(components.len());

    for component in components {
        let identifier = naming::to_identifier(&component.name);
        if identifier.contains('/') || !is_safe_relative_path(&identifier) {
            return Err(GenerateError::InvalidName {
                name: component.name.clone(),
            });
        }
        // File stems must also differ on case-insensitive file systems
        let key = identifier.to_lowercase();
        if let Some(first) = seen.get(&key) {
            return Err(GenerateError::IdentifierCollision {
                identifier,
                first: first.to_string(),
                second: component.name.clone(),
            });
        }
        seen.insert(key, &component.name);
        named.push(Named {
            component,
            identifier,
        });
    }

    Ok(named)
}
