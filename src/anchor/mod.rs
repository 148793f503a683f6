//! Anchor location over raw text.
//!
//! An anchor is a regex or literal that marks where a rule splices or
//! replaces text. Matchers try a primary anchor and, when it is absent, an
//! optional looser fallback, and report which one hit.

pub mod errors;
pub mod matcher;
pub mod pattern;

pub use errors::AnchorError;
pub use matcher::{Anchor, AnchorMatch, AnchorMatcher, MatchSource, Placement};
pub use pattern::Pattern;
