//! Shallow static scan for external package references
//!
//! This is not a module resolver: any specifier that is not a relative or
//! absolute path counts as an external package, whether or not such a
//! package exists.

use crate::component::Component;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Package names referenced by one or more components
pub type DependencySet = BTreeSet<String>;

/// `import x from 'a'`, `import { x } from 'a'`, `export * from 'a'`, ...
static FROM_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:import|export)\s+[\w$*{}\s,]+?\s*from\s*['"]([^'"\r\n]+)['"]"#)
        .expect("static regex")
});

/// `import 'a'` (side-effect only)
static BARE_IMPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bimport\s*['"]([^'"\r\n]+)['"]"#).expect("static regex"));

/// `import('a')` and `require('a')`
static CALL_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(?:import|require)\s*\(\s*['"]([^'"\r\n]+)['"]\s*\)"#).expect("static regex")
});

/// Extract the external package names referenced by `content`.
///
/// Never fails; occurrences that do not parse are skipped.
pub fn scan(content: &str) -> DependencySet {
    [&*FROM_CLAUSE, &*BARE_IMPORT, &*CALL_IMPORT]
        .iter()
        .flat_map(|re| re.captures_iter(content))
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| package_name(m.as_str()))
        .collect()
}

/// Map a module specifier to the package that provides it.
///
/// Returns `None` for local specifiers (leading `.` or `/`).
pub fn package_name(specifier: &str) -> Option<String> {
    let specifier = specifier.trim();
    if specifier.is_empty() || specifier.starts_with('.') || specifier.starts_with('/') {
        return None;
    }

    let mut segments = specifier.split('/');
    let first = segments.next()?;
    if first.starts_with('@') {
        return match segments.next() {
            Some(name) if !name.is_empty() => Some(format!("{}/{}", first, name)),
            _ => Some(first.to_string()),
        };
    }

    Some(first.to_string())
}

/// Union of every component's scan, minus packages the variant always declares
pub fn aggregate<'a>(
    components: impl IntoIterator<Item = &'a Component>,
    base: &[&str],
) -> DependencySet {
    components
        .into_iter()
        .flat_map(|c| scan(&c.content))
        .filter(|dep| !base.contains(&dep.as_str()))
        .collect()
}
