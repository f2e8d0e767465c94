//! Source providers for the assembler.
//!
//! `.include` resolution goes through an abstract provider so hosts can
//! serve live editor buffers instead of on-disk files; the core depends
//! only on the trait. The plain file-system provider resolves relative
//! paths against the including file's directory first.

use std::fs;
use std::path::{Path, PathBuf};

/// Error returned when a source cannot be resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceNotFound(pub String);

impl std::fmt::Display for SourceNotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot open source '{}'", self.0)
    }
}

impl std::error::Error for SourceNotFound {}

/// Abstract source resolution.
pub trait SourceProvider {
    /// Resolves `path` to source text.
    ///
    /// # Arguments
    ///
    /// * `path` - The requested path, as written in the source.
    /// * `from` - The path of the including file, when resolving an include.
    ///
    /// # Returns
    ///
    /// The source text, or `SourceNotFound`.
    fn resolve(&self, path: &str, from: Option<&str>) -> Result<String, SourceNotFound>;
}

/// Provider reading sources from the file system.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileProvider;

impl FileProvider {
    /// Creates a file-system provider.
    pub fn new() -> Self {
        Self
    }
}

impl SourceProvider for FileProvider {
    fn resolve(&self, path: &str, from: Option<&str>) -> Result<String, SourceNotFound> {
        let direct = Path::new(path);
        if let Ok(text) = fs::read_to_string(direct) {
            return Ok(text);
        }
        if direct.is_relative() {
            if let Some(from) = from {
                let mut sibling = PathBuf::from(from);
                sibling.pop();
                sibling.push(path);
                if let Ok(text) = fs::read_to_string(&sibling) {
                    return Ok(text);
                }
            }
        }
        Err(SourceNotFound(path.to_string()))
    }
}
