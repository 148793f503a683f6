use crate::anchor::pattern::Pattern;
use serde::Deserialize;

/// What a rule does with the span its anchor matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Keep the span, splice new text right after it
    #[default]
    After,
    /// Substitute the span wholesale
    Replace,
}

/// A pattern plus what to do where it matches.
#[derive(Debug, Clone)]
pub struct Anchor {
    pub pattern: Pattern,
    pub placement: Placement,
    /// Text placed between the anchor and an insertion. When unset, a single
    /// newline is used unless one is already present at the seam.
    pub separator: Option<String>,
}

impl Anchor {
    pub fn new(pattern: Pattern, placement: Placement) -> Self {
        Self {
            pattern,
            placement,
            separator: None,
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    /// Build the text that replaces the matched span `current`.
    pub fn splice(&self, current: &str, text: &str) -> String {
        match self.placement {
            Placement::Replace => text.to_string(),
            Placement::After => {
                let separator = match &self.separator {
                    Some(separator) => separator.as_str(),
                    None if current.ends_with('\n') || text.starts_with('\n') => "",
                    None => "\n",
                };
                let mut joined = String::with_capacity(current.len() + separator.len() + text.len());
                joined.push_str(current);
                joined.push_str(separator);
                joined.push_str(text);
                joined
            }
        }
    }

    /// Expand `$1` / `${name}` references in `template` against the match
    /// starting at `byte_start`. Literal anchors have no captures and return
    /// the template unchanged.
    pub fn expand(&self, haystack: &str, byte_start: usize, template: &str) -> String {
        match &self.pattern {
            Pattern::Regex(re) => match re.captures_at(haystack, byte_start) {
                Some(caps) => {
                    let mut expanded = String::new();
                    caps.expand(template, &mut expanded);
                    expanded
                }
                None => template.to_string(),
            },
            Pattern::Literal(_) => template.to_string(),
        }
    }
}

/// Which of a matcher's anchors produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    Primary,
    Fallback,
}

impl std::fmt::Display for MatchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchSource::Primary => write!(f, "primary"),
            MatchSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// A located span and the anchor that found it.
#[derive(Debug, Clone)]
pub struct AnchorMatch<'a> {
    pub source: MatchSource,
    pub anchor: &'a Anchor,
    pub byte_start: usize,
    pub byte_end: usize,
}

/// Primary anchor with an optional fallback, tried in that order.
#[derive(Debug, Clone)]
pub struct AnchorMatcher {
    primary: Anchor,
    fallback: Option<Anchor>,
}

impl AnchorMatcher {
    pub fn new(primary: Anchor) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Anchor) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn primary(&self) -> &Anchor {
        &self.primary
    }

    pub fn fallback(&self) -> Option<&Anchor> {
        self.fallback.as_ref()
    }

    /// Locate the first match of the primary anchor, else of the fallback.
    ///
    /// Returns `None` when neither matches; the caller decides the policy.
    pub fn locate(&self, buffer: &str) -> Option<AnchorMatch<'_>> {
        let candidates = std::iter::once((MatchSource::Primary, &self.primary))
            .chain(self.fallback.iter().map(|a| (MatchSource::Fallback, a)));

        for (source, anchor) in candidates {
            if let Some((byte_start, byte_end)) = anchor.pattern.find(buffer) {
                return Some(AnchorMatch {
                    source,
                    anchor,
                    byte_start,
                    byte_end,
                });
            }
        }

        None
    }
}
