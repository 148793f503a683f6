use crate::anchor::{Pattern, Placement};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

/// Target patched when the rule file does not name one.
pub const DEFAULT_TARGET: &str = "frontend/src/components/reports/ClientMonthlyReport.jsx";

/// Appended to the target's file name to derive the backup path.
pub const DEFAULT_BACKUP_SUFFIX: &str = ".bak";

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RuleSetConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

impl RuleSetConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.meta.target.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                rule_id: None,
                field: "meta.target",
            });
        }
        if self.meta.backup_suffix.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                rule_id: None,
                field: "meta.backup_suffix",
            });
        }

        if self.rules.is_empty() {
            issues.push(ValidationIssue::EmptyRuleList);
        }

        let mut seen = HashSet::new();

        for rule in &self.rules {
            if rule.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule_id: None,
                    field: "id",
                });
            } else if !seen.insert(rule.id.as_str()) {
                issues.push(ValidationIssue::DuplicateId {
                    rule_id: rule.id.clone(),
                });
            }

            if rule.text.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    rule_id: Some(rule.id.clone()),
                    field: "text",
                });
            }

            if let Some(marker) = &rule.unless_present {
                if marker.trim().is_empty() {
                    issues.push(ValidationIssue::MissingField {
                        rule_id: Some(rule.id.clone()),
                        field: "unless_present",
                    });
                }
            }

            check_anchor(&rule.id, "primary", &rule.primary, &mut issues);
            if let Some(fallback) = &rule.fallback {
                check_anchor(&rule.id, "fallback", fallback, &mut issues);
            }

            let has_regex = std::iter::once(&rule.primary)
                .chain(rule.fallback.as_ref())
                .any(|anchor| anchor.kind == AnchorKind::Regex);
            if rule.expand && !has_regex {
                issues.push(ValidationIssue::InvalidCombo {
                    rule_id: Some(rule.id.clone()),
                    message: "expand requires a regex anchor to capture from".to_string(),
                });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

fn check_anchor(
    rule_id: &str,
    slot: &'static str,
    anchor: &AnchorDefinition,
    issues: &mut Vec<ValidationIssue>,
) {
    if anchor.pattern.is_empty() {
        issues.push(ValidationIssue::MissingField {
            rule_id: Some(rule_id.to_string()),
            field: if slot == "primary" {
                "primary.pattern"
            } else {
                "fallback.pattern"
            },
        });
        return;
    }

    if anchor.kind == AnchorKind::Regex {
        if let Err(e) = Pattern::regex(&anchor.pattern) {
            issues.push(ValidationIssue::InvalidPattern {
                rule_id: rule_id.to_string(),
                slot,
                message: e.to_string(),
            });
        }
    }

    if anchor.separator.is_some() && anchor.placement == Placement::Replace {
        issues.push(ValidationIssue::InvalidCombo {
            rule_id: Some(rule_id.to_string()),
            message: format!("{slot} anchor: separator only applies to placement \"after\""),
        });
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Document to patch, relative to the working directory
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(default = "default_backup_suffix")]
    pub backup_suffix: String,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            target: default_target(),
            backup_suffix: default_backup_suffix(),
        }
    }
}

fn default_target() -> String {
    DEFAULT_TARGET.to_string()
}

fn default_backup_suffix() -> String {
    DEFAULT_BACKUP_SUFFIX.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct RuleDefinition {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub primary: AnchorDefinition,
    #[serde(default)]
    pub fallback: Option<AnchorDefinition>,
    /// Inserted or substituted text
    pub text: String,
    /// Expand `$1` / `${name}` capture references in `text`
    #[serde(default)]
    pub expand: bool,
    /// Skip the rule when this text already occurs in the document
    #[serde(default)]
    pub unless_present: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnchorDefinition {
    #[serde(rename = "type")]
    pub kind: AnchorKind,
    pub pattern: String,
    #[serde(default)]
    pub placement: Placement,
    #[serde(default)]
    pub separator: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorKind {
    /// Regular expression (`regex` crate syntax)
    Regex,
    /// Exact substring
    Text,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyRuleList,
    MissingField {
        rule_id: Option<String>,
        field: &'static str,
    },
    DuplicateId {
        rule_id: String,
    },
    InvalidPattern {
        rule_id: String,
        slot: &'static str,
        message: String,
    },
    InvalidCombo {
        rule_id: Option<String>,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyRuleList => write!(f, "rule set contains no rules"),
            ValidationIssue::MissingField { rule_id, field } => match rule_id {
                Some(id) => write!(f, "rule '{id}' missing required field '{field}'"),
                None => write!(f, "missing required field '{field}'"),
            },
            ValidationIssue::DuplicateId { rule_id } => {
                write!(f, "rule id '{rule_id}' is declared more than once")
            }
            ValidationIssue::InvalidPattern {
                rule_id,
                slot,
                message,
            } => write!(f, "rule '{rule_id}' has an invalid {slot} pattern: {message}"),
            ValidationIssue::InvalidCombo { rule_id, message } => match rule_id {
                Some(id) => write!(f, "rule '{id}' has invalid configuration: {message}"),
                None => write!(f, "invalid rule configuration: {message}"),
            },
        }
    }
}
