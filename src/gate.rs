//! Change gate: decides whether a patched buffer differs from what was read,
//! and when it does, writes a backup of the original before overwriting the
//! target.

use crate::document::SourceDocument;
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use xxhash_rust::xxh3::xxh3_64;

#[derive(Error, Debug)]
pub enum CommitError {
    #[error("failed to write backup {}: {source}", .path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What the gate did with a patched buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Buffer identical to the original; nothing touched on disk
    NoChanges { target: PathBuf },
    /// Backup written, then target overwritten
    Committed { target: PathBuf, backup: PathBuf },
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed { .. })
    }
}

#[derive(Debug, Clone)]
pub struct ChangeGate {
    backup_suffix: String,
}

impl ChangeGate {
    pub fn new(backup_suffix: impl Into<String>) -> Self {
        Self {
            backup_suffix: backup_suffix.into(),
        }
    }

    pub fn backup_suffix(&self) -> &str {
        &self.backup_suffix
    }

    /// `ClientMonthlyReport.jsx` -> `ClientMonthlyReport.jsx.bak`, same directory.
    pub fn backup_path(&self, target: &Path) -> PathBuf {
        let mut name = target
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(&self.backup_suffix);
        target.with_file_name(name)
    }

    /// Whether `patched` differs from the document's original content.
    pub fn has_changes(document: &SourceDocument, patched: &str) -> bool {
        document.content() != patched
    }

    /// Persist `patched` over the document's path.
    ///
    /// The original bytes go to the backup path first. If that write fails the
    /// target is never opened. An existing backup is overwritten.
    pub fn commit(
        &self,
        document: &SourceDocument,
        patched: &str,
    ) -> Result<CommitOutcome, CommitError> {
        let target = document.path().to_path_buf();

        if !Self::has_changes(document, patched) {
            debug!(target = %target.display(), "buffer unchanged, skipping write");
            return Ok(CommitOutcome::NoChanges { target });
        }

        let backup = self.backup_path(&target);
        let permissions = fs::metadata(&target).ok().map(|meta| meta.permissions());

        atomic_write(&backup, document.content().as_bytes(), permissions.clone()).map_err(
            |source| CommitError::Backup {
                path: backup.clone(),
                source,
            },
        )?;
        debug!(
            backup = %backup.display(),
            hash = document.fingerprint(),
            "backup written"
        );

        atomic_write(&target, patched.as_bytes(), permissions).map_err(|source| {
            CommitError::Write {
                path: target.clone(),
                source,
            }
        })?;
        info!(
            target = %target.display(),
            before = document.fingerprint(),
            after = xxh3_64(patched.as_bytes()),
            "target updated"
        );

        Ok(CommitOutcome::Committed { target, backup })
    }
}

/// Tempfile in the destination directory, fsync, then rename over `path`.
///
/// Readers see either the old file or the new one, never a partial write.
fn atomic_write(
    path: &Path,
    content: &[u8],
    permissions: Option<fs::Permissions>,
) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    if let Some(permissions) = permissions {
        temp.as_file().set_permissions(permissions)?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    Ok(())
}
