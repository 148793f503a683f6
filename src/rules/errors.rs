use crate::anchor::AnchorError;
use crate::edit::EditError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("rule '{rule_id}' has an unusable anchor: {source}")]
    Anchor {
        rule_id: String,
        #[source]
        source: AnchorError,
    },

    #[error("rule '{rule_id}' produced an invalid edit: {source}")]
    Edit {
        rule_id: String,
        #[source]
        source: EditError,
    },
}
