use std::fs;
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::xxh3_64;

/// The artifact being patched: a path and its full UTF-8 text.
///
/// Content is only ever replaced wholesale by the change gate, never written
/// piecemeal while rules run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    path: PathBuf,
    content: String,
}

impl SourceDocument {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Read `path` as UTF-8. Invalid UTF-8 surfaces as `InvalidData`.
    pub fn read(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Ok(Self::new(path, content))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// xxh3 of the content, for log lines.
    pub fn fingerprint(&self) -> u64 {
        xxh3_64(self.content.as_bytes())
    }
}
