pub mod loader;
pub mod schema;

pub use loader::{load_builtin, load_from_path, load_from_str, ConfigError, BUILTIN_RULES};
pub use schema::{
    AnchorDefinition, AnchorKind, Metadata, RuleDefinition, RuleSetConfig, ValidationError,
    ValidationIssue, DEFAULT_BACKUP_SUFFIX, DEFAULT_TARGET,
};
