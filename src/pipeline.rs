//! Read the target, run every rule over one buffer, then hand the result to
//! the change gate.

use crate::config::{load_builtin, RuleSetConfig};
use crate::document::SourceDocument;
use crate::error::PatchError;
use crate::gate::{ChangeGate, CommitOutcome};
use crate::rules::{ApplicationOutcome, RuleOutcome, RuleSet, RuleSetRun};
use crate::safety::WorkspaceGuard;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Status line printed when the gate found nothing to write.
pub const NO_CHANGES_MESSAGE: &str =
    "No changes applied (file already patched or patterns not found).";

#[derive(Debug, Clone)]
pub struct Patcher {
    target: PathBuf,
    rules: RuleSet,
    gate: ChangeGate,
    guard: Option<WorkspaceGuard>,
}

impl Patcher {
    /// A patcher with no workspace guard.
    pub fn new(target: impl Into<PathBuf>, rules: RuleSet, gate: ChangeGate) -> Self {
        Self {
            target: target.into(),
            rules,
            gate,
            guard: None,
        }
    }

    pub fn with_guard(mut self, guard: WorkspaceGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Build from a validated rule set. The target is `meta.target` under
    /// `root`, and writes are confined to `root`. Passing `.` keeps the target
    /// path relative, as the binary does.
    pub fn from_config(config: &RuleSetConfig, root: impl AsRef<Path>) -> Result<Self, PatchError> {
        let root = root.as_ref();
        let target = if root == Path::new(".") {
            PathBuf::from(&config.meta.target)
        } else {
            root.join(&config.meta.target)
        };

        let rules = RuleSet::from_config(config)?;
        let gate = ChangeGate::new(config.meta.backup_suffix.as_str());
        let guard = WorkspaceGuard::new(root)?;

        Ok(Self::new(target, rules, gate).with_guard(guard))
    }

    /// The embedded client report preview rule set, rooted at `root`.
    pub fn builtin(root: impl AsRef<Path>) -> Result<Self, PatchError> {
        let config = load_builtin()?;
        Self::from_config(&config, root)
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn gate(&self) -> &ChangeGate {
        &self.gate
    }

    /// Read the target and run the rules in memory. Nothing is written.
    pub fn plan(&self) -> Result<Plan, PatchError> {
        let document = SourceDocument::read(&self.target).map_err(|source| PatchError::Io {
            path: self.target.clone(),
            source,
        })?;

        if let Some(guard) = &self.guard {
            guard.validate_path(&self.target)?;
        }

        info!(
            target = %self.target.display(),
            rules = self.rules.len(),
            hash = document.fingerprint(),
            "running rule set"
        );

        let run = self.rules.apply(document.content().to_string())?;
        Ok(Plan { document, run })
    }

    /// Pass a plan through the change gate.
    pub fn commit(&self, plan: Plan) -> Result<RunReport, PatchError> {
        if plan.is_changed() {
            if let Some(guard) = &self.guard {
                guard.revalidate(plan.document.path())?;
            }

            let missing = plan.run.not_found();
            if !missing.is_empty() {
                warn!(
                    target = %self.target.display(),
                    missing = ?missing,
                    "writing a partially patched document"
                );
            }
        }

        let commit = self.gate.commit(&plan.document, &plan.run.buffer)?;
        Ok(RunReport {
            outcomes: plan.run.outcomes,
            commit,
        })
    }

    /// Plan, then commit.
    pub fn run(&self) -> Result<RunReport, PatchError> {
        let plan = self.plan()?;
        self.commit(plan)
    }

    /// One stderr line per rule for `-v`, with the rule's description.
    /// Missing anchors are left out; they are already logged at WARN.
    pub fn outcome_lines(&self, plan: &Plan) -> Vec<String> {
        plan.outcomes()
            .iter()
            .filter_map(|o| {
                let marker = match o.outcome {
                    ApplicationOutcome::Applied { .. } => "✓",
                    ApplicationOutcome::SkippedAlreadyPresent => "⊙",
                    ApplicationOutcome::SkippedNotFound { .. } => return None,
                };
                let description = self
                    .rules
                    .iter()
                    .find(|rule| rule.id() == o.rule_id)
                    .and_then(|rule| rule.description());
                Some(match description {
                    Some(description) => {
                        format!("{marker} {}: {} ({description})", o.rule_id, o.outcome)
                    }
                    None => format!("{marker} {}: {}", o.rule_id, o.outcome),
                })
            })
            .collect()
    }

    /// Status line for a plan that will not be committed.
    pub fn dry_run_status(&self, plan: &Plan) -> String {
        if plan.is_changed() {
            format!(
                "Would update {} (backup at {})",
                plan.document.path().display(),
                self.gate.backup_path(plan.document.path()).display()
            )
        } else {
            NO_CHANGES_MESSAGE.to_string()
        }
    }
}

/// A document and what the rules made of it, before anything is written.
#[derive(Debug, Clone)]
pub struct Plan {
    document: SourceDocument,
    run: RuleSetRun,
}

impl Plan {
    pub fn original(&self) -> &str {
        self.document.content()
    }

    pub fn patched(&self) -> &str {
        &self.run.buffer
    }

    pub fn outcomes(&self) -> &[RuleOutcome] {
        &self.run.outcomes
    }

    pub fn is_changed(&self) -> bool {
        ChangeGate::has_changes(&self.document, &self.run.buffer)
    }
}

/// Per-rule outcomes plus what the gate did.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcomes: Vec<RuleOutcome>,
    pub commit: CommitOutcome,
}

impl RunReport {
    pub fn is_changed(&self) -> bool {
        self.commit.is_committed()
    }

    /// Ids of rules whose anchors were missing on this run.
    pub fn not_found(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.outcome, ApplicationOutcome::SkippedNotFound { .. }))
            .map(|o| o.rule_id.as_str())
            .collect()
    }

    pub fn status_line(&self) -> String {
        match &self.commit {
            CommitOutcome::Committed { target, backup } => format!(
                "Updated {} (backup at {})",
                target.display(),
                backup.display()
            ),
            CommitOutcome::NoChanges { .. } => NO_CHANGES_MESSAGE.to_string(),
        }
    }
}
