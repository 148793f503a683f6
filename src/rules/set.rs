use crate::config::schema::RuleSetConfig;
use crate::rules::errors::RuleError;
use crate::rules::rule::{ApplicationOutcome, TransformationRule};

/// Outcome of one rule, tagged with its id.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    pub rule_id: String,
    pub outcome: ApplicationOutcome,
}

/// Final buffer plus per-rule outcomes, in rule order.
#[derive(Debug, Clone)]
pub struct RuleSetRun {
    pub buffer: String,
    pub outcomes: Vec<RuleOutcome>,
}

impl RuleSetRun {
    /// Ids of rules that changed the buffer.
    pub fn applied(&self) -> Vec<&str> {
        self.ids_where(ApplicationOutcome::is_applied)
    }

    /// Ids of rules whose anchors were missing. A non-empty list means the
    /// document may be only partially patched.
    pub fn not_found(&self) -> Vec<&str> {
        self.ids_where(|o| matches!(o, ApplicationOutcome::SkippedNotFound { .. }))
    }

    /// Ids of rules whose effect was already in place.
    pub fn already_present(&self) -> Vec<&str> {
        self.ids_where(|o| matches!(o, ApplicationOutcome::SkippedAlreadyPresent))
    }

    fn ids_where(&self, pred: impl Fn(&ApplicationOutcome) -> bool) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| pred(&o.outcome))
            .map(|o| o.rule_id.as_str())
            .collect()
    }
}

/// Rules in their declared order. Order matters: later rules may anchor on
/// text inserted by earlier ones.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<TransformationRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<TransformationRule>) -> Self {
        Self { rules }
    }

    /// Compile every rule of a validated config, keeping declaration order.
    pub fn from_config(config: &RuleSetConfig) -> Result<Self, RuleError> {
        let rules = config
            .rules
            .iter()
            .map(TransformationRule::from_definition)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransformationRule> {
        self.rules.iter()
    }

    /// Thread `buffer` through every rule in order.
    ///
    /// A rule whose anchors are missing is recorded and skipped; the run
    /// continues with the next rule. Only an invalid edit aborts.
    pub fn apply(&self, buffer: String) -> Result<RuleSetRun, RuleError> {
        let mut buffer = buffer;
        let mut outcomes = Vec::with_capacity(self.rules.len());

        for rule in &self.rules {
            let (next, outcome) = rule.apply(buffer)?;
            buffer = next;
            outcomes.push(RuleOutcome {
                rule_id: rule.id().to_string(),
                outcome,
            });
        }

        Ok(RuleSetRun { buffer, outcomes })
    }
}
