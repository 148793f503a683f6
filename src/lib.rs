//! Preview Patcher: retrofits the blob-backed report preview into
//! `ClientMonthlyReport.jsx`.
//!
//! An ordered rule set is threaded over one in-memory copy of the target.
//! Each rule finds an anchor (a regex or literal, with an optional fallback),
//! inserts after it or replaces it, and reports what happened. A change gate
//! then compares the final buffer with the original and, only when they
//! differ, writes a backup followed by the patched file.
//!
//! # Architecture
//!
//! Every rule compiles down to a single [`Edit`]: a verified byte-span
//! replacement. Rules differ only in how they find the span.
//!
//! # Safety
//!
//! - Edits verify their expected before-text before applying
//! - Backup and target are written atomically (tempfile + fsync + rename)
//! - The backup is on disk before the target is touched
//! - Writes are confined to the working directory
//! - Rerunning on a patched file changes nothing
//!
//! # Example
//!
//! ```no_run
//! use preview_patcher::Patcher;
//!
//! let patcher = Patcher::builtin(".")?;
//! let report = patcher.run()?;
//! println!("{}", report.status_line());
//! # Ok::<(), preview_patcher::PatchError>(())
//! ```

pub mod anchor;
pub mod cache;
pub mod config;
pub mod diagnostic;
pub mod document;
pub mod edit;
pub mod error;
pub mod gate;
pub mod logging;
pub mod pipeline;
pub mod rules;
pub mod safety;

// Re-exports
pub use anchor::{Anchor, AnchorError, AnchorMatch, AnchorMatcher, MatchSource, Pattern, Placement};
pub use config::{load_builtin, load_from_path, load_from_str, ConfigError, RuleSetConfig};
pub use diagnostic::NearMiss;
pub use document::SourceDocument;
pub use edit::{Edit, EditError, EditResult, EditVerification};
pub use error::PatchError;
pub use gate::{ChangeGate, CommitError, CommitOutcome};
pub use pipeline::{Patcher, Plan, RunReport, NO_CHANGES_MESSAGE};
pub use rules::{ApplicationOutcome, RuleError, RuleOutcome, RuleSet, RuleSetRun, TransformationRule};
pub use safety::{SafetyError, WorkspaceGuard};
