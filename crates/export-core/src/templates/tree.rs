//! In-memory project tree produced by the generators

use crate::error::GenerateError;
use indexmap::IndexMap;

/// Contents of one generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Binary(Vec<u8>),
}

impl FileContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FileContent::Text(s) => s.as_bytes(),
            FileContent::Binary(b) => b,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FileContent::Text(s) => Some(s),
            FileContent::Binary(_) => None,
        }
    }
}

/// Relative path -> contents, in insertion order.
///
/// Paths are always forward-slash separated, relative, and free of `..`
/// segments; `insert` rejects anything else and refuses duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedTree {
    files: IndexMap<String, FileContent>,
}

impl GeneratedTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, content: FileContent) -> Result<(), GenerateError> {
        let path = path.into();
        if !is_safe_relative_path(&path) {
            return Err(GenerateError::UnsafePath { path });
        }
        if self.files.contains_key(&path) {
            return Err(GenerateError::DuplicatePath { path });
        }
        self.files.insert(path, content);
        Ok(())
    }

    pub fn insert_text(&mut self, path: impl Into<String>, text: impl Into<String>) -> Result<(), GenerateError> {
        self.insert(path, FileContent::Text(text.into()))
    }

    pub fn get(&self, path: &str) -> Option<&FileContent> {
        self.files.get(path)
    }

    /// Text of a file, if present and textual
    pub fn text(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(FileContent::as_text)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileContent)> {
        self.files.iter().map(|(p, c)| (p.as_str(), c))
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Relative, forward-slash, no empty / `.` / `..` segments
pub fn is_safe_relative_path(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.contains('\\')
        && !path.contains(':')
        && path
            .split('/')
            .all(|seg| !seg.is_empty() && seg != "." && seg != "..")
}
