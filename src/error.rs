use crate::config::ConfigError;
use crate::gate::CommitError;
use crate::rules::RuleError;
use crate::safety::SafetyError;
use std::path::PathBuf;
use thiserror::Error;

/// Anything that aborts a patch run.
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Safety(#[from] SafetyError),

    #[error(transparent)]
    Commit(#[from] CommitError),
}
