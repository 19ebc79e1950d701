//! Pieces shared by the variant generators

use super::{GeneratedTree, Manifest, Named};
use crate::error::GenerateError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const REACT_VERSION: &str = "^18.2.0";

pub const GITIGNORE: &str = "# dependencies
/node_modules
/.pnp
.pnp.js

# testing
/coverage

# production
/build
/dist
/.next
/out
/storybook-static

# misc
.DS_Store
.env.local
.env.development.local
.env.test.local
.env.production.local

npm-debug.log*
yarn-debug.log*
yarn-error.log*
";

/// Quote a string as a JavaScript string literal
pub fn js_string(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

/// Render a JSON document the way npm writes it (2-space indent, trailing newline)
pub fn pretty_json(value: &Value) -> String {
    format!("{:#}\n", value)
}

pub fn json_map(entries: &BTreeMap<String, String>) -> Value {
    Value::Object(
        entries
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect::<Map<String, Value>>(),
    )
}

/// Insert `dependencies` and, if non-empty, `devDependencies`
pub fn insert_dependencies(package: &mut Map<String, Value>, manifest: &Manifest) {
    package.insert("dependencies".to_string(), json_map(&manifest.dependencies));
    if !manifest.dev_dependencies.is_empty() {
        package.insert(
            "devDependencies".to_string(),
            json_map(&manifest.dev_dependencies),
        );
    }
}

/// Markdown bullet list of display names
pub fn component_list(named: &[Named<'_>]) -> String {
    named
        .iter()
        .map(|n| format!("- {}", n.component.name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prepend a `'use client'` directive unless the source already has one
pub fn with_client_directive(content: &str) -> String {
    let first_statement = content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with("//"));
    let has_directive = matches!(
        first_statement,
        Some(l) if l.starts_with("'use client'") || l.starts_with("\"use client\"")
    );

    if has_directive {
        content.to_string()
    } else {
        format!("'use client';\n\n{}", content)
    }
}

pub fn insert_gitignore(tree: &mut GeneratedTree) -> Result<(), GenerateError> {
    tree.insert_text(".gitignore", GITIGNORE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string_escapes() {
        assert_eq!(js_string("Card"), "\"Card\"");
        assert_eq!(js_string("it's \"fancy\""), "\"it's \\\"fancy\\\"\"");
    }

    #[test]
    fn test_pretty_json_indents() {
        let value = serde_json::json!({ "name": "x", "private": true });
        assert_eq!(pretty_json(&value), "{\n  \"name\": \"x\",\n  \"private\": true\n}\n");
    }

    #[test]
    fn test_with_client_directive() {
        assert_eq!(
            with_client_directive("export default () => null;"),
            "'use client';\n\nexport default () => null;"
        );
        let already = "// header\n\"use client\";\nexport default () => null;";
        assert_eq!(with_client_directive(already), already);
    }
}
