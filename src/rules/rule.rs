use crate::anchor::{Anchor, AnchorMatcher, MatchSource, Pattern};
use crate::config::schema::{AnchorDefinition, AnchorKind, RuleDefinition};
use crate::diagnostic::{self, NearMiss};
use crate::edit::{Edit, EditResult};
use crate::rules::errors::RuleError;
use std::fmt;
use tracing::{debug, info, warn};

/// Per-rule result of one pass over the buffer.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "ApplicationOutcome reports whether the rule changed the buffer"]
pub enum ApplicationOutcome {
    /// The rule's edit was spliced into the buffer
    Applied {
        via: MatchSource,
        byte_start: usize,
        bytes_written: usize,
    },
    /// The rule's effect is already in the buffer
    SkippedAlreadyPresent,
    /// Neither the primary nor the fallback anchor matched
    SkippedNotFound { near_miss: Option<NearMiss> },
}

impl ApplicationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplicationOutcome::Applied { .. })
    }
}

impl fmt::Display for ApplicationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationOutcome::Applied {
                via, byte_start, ..
            } => write!(f, "applied via {via} anchor at byte {byte_start}"),
            ApplicationOutcome::SkippedAlreadyPresent => write!(f, "skipped, already present"),
            ApplicationOutcome::SkippedNotFound { near_miss: None } => {
                write!(f, "skipped, anchor not found")
            }
            ApplicationOutcome::SkippedNotFound {
                near_miss: Some(hit),
            } => write!(f, "skipped, anchor not found (closest: {hit})"),
        }
    }
}

/// One unit of change, applied at most once per run.
///
/// The rule locates its anchor, turns the span into an [`Edit`], and applies
/// it to the buffer it was handed. Idempotence is the author's job: either
/// the primary anchor only matches the pre-patch shape, or `unless_present`
/// names text whose presence means the rule already ran.
#[derive(Debug, Clone)]
pub struct TransformationRule {
    id: String,
    description: Option<String>,
    matcher: AnchorMatcher,
    text: String,
    expand: bool,
    unless_present: Option<String>,
}

impl TransformationRule {
    pub fn new(id: impl Into<String>, matcher: AnchorMatcher, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: None,
            matcher,
            text: text.into(),
            expand: false,
            unless_present: None,
        }
    }

    /// Skip the rule whenever `marker` already occurs in the buffer.
    pub fn unless_present(mut self, marker: impl Into<String>) -> Self {
        self.unless_present = Some(marker.into());
        self
    }

    /// Treat the text as a template with `$1` / `${name}` capture references.
    pub fn with_expansion(mut self) -> Self {
        self.expand = true;
        self
    }

    /// Compile a rule from its config definition.
    pub fn from_definition(definition: &RuleDefinition) -> Result<Self, RuleError> {
        let compile = |anchor: &AnchorDefinition| {
            compile_anchor(anchor).map_err(|source| RuleError::Anchor {
                rule_id: definition.id.clone(),
                source,
            })
        };

        let mut matcher = AnchorMatcher::new(compile(&definition.primary)?);
        if let Some(fallback) = &definition.fallback {
            matcher = matcher.with_fallback(compile(fallback)?);
        }

        Ok(Self {
            id: definition.id.clone(),
            description: definition.description.clone(),
            matcher,
            text: definition.text.clone(),
            expand: definition.expand,
            unless_present: definition.unless_present.clone(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Run the rule over `buffer`, handing back the (possibly) updated
    /// buffer and what happened.
    pub fn apply(&self, buffer: String) -> Result<(String, ApplicationOutcome), RuleError> {
        if let Some(marker) = &self.unless_present {
            if buffer.contains(marker.as_str()) {
                debug!(rule = %self.id, "guard text present, skipping");
                return Ok((buffer, ApplicationOutcome::SkippedAlreadyPresent));
            }
        }

        let Some(found) = self.matcher.locate(&buffer) else {
            let near_miss = self.near_miss(&buffer);
            match &near_miss {
                Some(hit) => warn!(rule = %self.id, closest = %hit, "anchor not found, skipping"),
                None => warn!(rule = %self.id, "anchor not found, skipping"),
            }
            return Ok((buffer, ApplicationOutcome::SkippedNotFound { near_miss }));
        };

        let current = &buffer[found.byte_start..found.byte_end];
        let text = if self.expand {
            found.anchor.expand(&buffer, found.byte_start, &self.text)
        } else {
            self.text.clone()
        };
        let edit = Edit::new(
            found.byte_start,
            found.byte_end,
            found.anchor.splice(current, &text),
            current,
        );
        let via = found.source;

        let (buffer, result) = edit.apply(buffer).map_err(|source| RuleError::Edit {
            rule_id: self.id.clone(),
            source,
        })?;

        let outcome = match result {
            EditResult::Applied { bytes_changed } => {
                info!(rule = %self.id, %via, byte_start = edit.byte_start, "rule applied");
                ApplicationOutcome::Applied {
                    via,
                    byte_start: edit.byte_start,
                    bytes_written: bytes_changed,
                }
            }
            EditResult::AlreadyApplied => {
                debug!(rule = %self.id, "span already holds replacement");
                ApplicationOutcome::SkippedAlreadyPresent
            }
        };

        Ok((buffer, outcome))
    }

    fn near_miss(&self, buffer: &str) -> Option<NearMiss> {
        let primary = self.matcher.primary().pattern.probe();
        let probe = if primary.is_empty() {
            self.matcher
                .fallback()
                .map(|anchor| anchor.pattern.probe())
                .unwrap_or_default()
        } else {
            primary
        };
        diagnostic::nearest_line(buffer, &probe)
    }
}

fn compile_anchor(definition: &AnchorDefinition) -> Result<Anchor, crate::anchor::AnchorError> {
    let pattern = match definition.kind {
        AnchorKind::Regex => Pattern::regex(&definition.pattern)?,
        AnchorKind::Text => Pattern::literal(definition.pattern.clone()),
    };
    let mut anchor = Anchor::new(pattern, definition.placement);
    if let Some(separator) = &definition.separator {
        anchor = anchor.with_separator(separator.clone());
    }
    Ok(anchor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::Placement;

    fn state_rule() -> TransformationRule {
        TransformationRule::new(
            "state",
            AnchorMatcher::new(Anchor::new(
                Pattern::regex(r"const \[open, setOpen\] = useState\(false\);[ \t]*(?:\r?\n)?")
                    .unwrap(),
                Placement::After,
            )),
            "  const [url, setUrl] = useState(null);\n",
        )
        .unless_present("const [url, setUrl]")
    }

    #[test]
    fn test_insertion_lands_after_anchor() {
        let buffer = "  const [open, setOpen] = useState(false);\n  return null;\n".to_string();
        let (buffer, outcome) = state_rule().apply(buffer).unwrap();
        assert_eq!(
            buffer,
            "  const [open, setOpen] = useState(false);\n  const [url, setUrl] = useState(null);\n  return null;\n"
        );
        assert!(matches!(
            outcome,
            ApplicationOutcome::Applied {
                via: MatchSource::Primary,
                byte_start: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_guard_makes_insertion_idempotent() {
        let rule = state_rule();
        let (once, _) = rule
            .apply("const [open, setOpen] = useState(false);\n".to_string())
            .unwrap();
        let (twice, outcome) = rule.apply(once.clone()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(outcome, ApplicationOutcome::SkippedAlreadyPresent);
    }

    #[test]
    fn test_missing_anchor_is_skipped_with_hint() {
        let buffer = "  const [open, setOpen] = useState(true);\n".to_string();
        let (after, outcome) = state_rule().apply(buffer.clone()).unwrap();
        assert_eq!(after, buffer);
        match outcome {
            ApplicationOutcome::SkippedNotFound {
                near_miss: Some(hit),
            } => assert_eq!(hit.line, 1),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_replacement_rule_only_touches_first_match() {
        let rule = TransformationRule::new(
            "swap",
            AnchorMatcher::new(Anchor::new(Pattern::literal("old();"), Placement::Replace)),
            "new();",
        );
        let (buffer, outcome) = rule.apply("old();\nold();\n".to_string()).unwrap();
        assert_eq!(buffer, "new();\nold();\n");
        assert!(outcome.is_applied());
    }

    #[test]
    fn test_identical_replacement_reports_already_present() {
        let rule = TransformationRule::new(
            "noop",
            AnchorMatcher::new(Anchor::new(Pattern::literal("same();"), Placement::Replace)),
            "same();",
        );
        let (buffer, outcome) = rule.apply("same();".to_string()).unwrap();
        assert_eq!(buffer, "same();");
        assert_eq!(outcome, ApplicationOutcome::SkippedAlreadyPresent);
    }

    #[test]
    fn test_expansion_uses_captures() {
        let rule = TransformationRule::new(
            "rename",
            AnchorMatcher::new(Anchor::new(
                Pattern::regex(r"const (\w+) = legacy\((\w+)\);").unwrap(),
                Placement::Replace,
            )),
            "const $1 = modern($2, { strict: true });",
        )
        .with_expansion();
        let (buffer, _) = rule
            .apply("const report = legacy(unit);".to_string())
            .unwrap();
        assert_eq!(buffer, "const report = modern(unit, { strict: true });");
    }

    #[test]
    fn test_outcome_display() {
        let applied = ApplicationOutcome::Applied {
            via: MatchSource::Fallback,
            byte_start: 12,
            bytes_written: 40,
        };
        assert_eq!(applied.to_string(), "applied via fallback anchor at byte 12");
        assert!(ApplicationOutcome::SkippedNotFound { near_miss: None }
            .to_string()
            .contains("not found"));
    }
}
