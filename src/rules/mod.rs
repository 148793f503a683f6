//! Transformation rules and the ordered rule set that threads one buffer
//! through them.

pub mod errors;
pub mod rule;
pub mod set;

pub use errors::RuleError;
pub use rule::{ApplicationOutcome, TransformationRule};
pub use set::{RuleOutcome, RuleSet, RuleSetRun};
