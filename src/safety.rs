use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Directories that hold generated or vendored files, never patch targets.
const FORBIDDEN_DIRS: &[&str] = &["node_modules", ".git", "dist", "build"];

/// Keeps writes inside the project the patcher was launched from.
#[derive(Debug, Clone)]
pub struct WorkspaceGuard {
    /// Canonical project root
    workspace_root: PathBuf,
    /// Directory names rejected at any depth below the root
    forbidden_dirs: Vec<String>,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("path is outside workspace: {path} (workspace: {workspace})")]
    OutsideWorkspace { path: PathBuf, workspace: PathBuf },

    #[error("path is inside forbidden directory '{dir}': {path}")]
    ForbiddenPath { path: PathBuf, dir: String },

    #[error("failed to canonicalize path: {0}")]
    Canonicalize(#[from] std::io::Error),
}

impl WorkspaceGuard {
    /// Create a guard rooted at `workspace_root` (canonicalized, so symlinks
    /// are resolved once up front).
    pub fn new(workspace_root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        Self::with_forbidden(
            workspace_root,
            FORBIDDEN_DIRS.iter().map(|d| d.to_string()).collect(),
        )
    }

    /// Create a guard with a custom forbidden directory list.
    pub fn with_forbidden(
        workspace_root: impl AsRef<Path>,
        forbidden_dirs: Vec<String>,
    ) -> Result<Self, SafetyError> {
        let workspace_root = workspace_root.as_ref().canonicalize()?;
        Ok(Self {
            workspace_root,
            forbidden_dirs,
        })
    }

    /// Check if a path is safe to patch.
    ///
    /// Relative paths resolve against the workspace root. Returns the
    /// canonical path on success.
    pub fn validate_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        };

        let canonical = absolute.canonicalize()?;
        self.check_canonical(&canonical)?;
        Ok(canonical)
    }

    /// Re-check a path immediately before writing, in case a symlink was
    /// swapped in since it was first validated.
    pub fn revalidate(&self, path: &Path) -> Result<PathBuf, SafetyError> {
        self.validate_path(path)
    }

    fn check_canonical(&self, canonical: &Path) -> Result<(), SafetyError> {
        let Ok(relative) = canonical.strip_prefix(&self.workspace_root) else {
            return Err(SafetyError::OutsideWorkspace {
                path: canonical.to_path_buf(),
                workspace: self.workspace_root.clone(),
            });
        };

        for component in relative.components() {
            if let Component::Normal(name) = component {
                if let Some(dir) = self
                    .forbidden_dirs
                    .iter()
                    .find(|dir| name.to_str() == Some(dir.as_str()))
                {
                    return Err(SafetyError::ForbiddenPath {
                        path: canonical.to_path_buf(),
                        dir: dir.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
