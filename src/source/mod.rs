//! Source loading: the character cursor, the loader seam used by includes,
//! and the standard library bundled into the binary.

pub mod cursor;

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

pub use cursor::{Cursor, Origin};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file '{0}' does not exist")]
    NotFound(String),
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Reads the text of an included file.
pub trait SourceLoader {
    fn load(&self, path: &str) -> Result<String, LoadError>;
}

/// Reads includes from the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn load(&self, path: &str) -> Result<String, LoadError> {
        if !Path::new(path).exists() {
            return Err(LoadError::NotFound(path.to_string()));
        }
        std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_string(),
            source,
        })
    }
}

/// Serves includes from memory. Used by the WASM entry points and tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    files: HashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, path: &str) -> Result<String, LoadError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(path.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Embedded standard library
// ---------------------------------------------------------------------------

const STDLIB: &str = include_str!("stdlib/stdlib.cherri");

const ACTION_CATEGORIES: &[(&str, &str)] = &[
    ("location", include_str!("stdlib/actions/location.cherri")),
    ("sharing", include_str!("stdlib/actions/sharing.cherri")),
];

/// Look up an include path in the embedded bundle: `stdlib` or
/// `actions/<category>`.
pub fn embedded(path: &str) -> Option<&'static str> {
    if path == "stdlib" {
        return Some(STDLIB);
    }
    let category = path.strip_prefix("actions/")?;
    ACTION_CATEGORIES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, contents)| *contents)
}

pub fn action_categories() -> impl Iterator<Item = &'static str> {
    ACTION_CATEGORIES.iter().map(|(name, _)| *name)
}

/// Directory prefix of `file_path` (with trailing separator), used to resolve
/// relative includes.
pub fn relative_dir(file_path: &str) -> String {
    match file_path.rfind('/') {
        Some(i) => file_path[..=i].to_string(),
        None => String::new(),
    }
}
