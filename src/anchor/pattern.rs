use crate::anchor::errors::AnchorError;
use crate::cache;
use regex::Regex;

/// A compiled anchor pattern.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Regex, compiled through the thread-local cache. Use `(?s)` for
    /// multi-line spans and `.*?` to stop at the first closing delimiter.
    Regex(Regex),
    /// Exact substring
    Literal(String),
}

impl Pattern {
    pub fn regex(source: &str) -> Result<Self, AnchorError> {
        cache::get_or_compile(source)
            .map(Pattern::Regex)
            .map_err(|e| AnchorError::InvalidPattern {
                pattern: source.to_string(),
                message: e.to_string(),
            })
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Pattern::Literal(text.into())
    }

    /// Leftmost match as a byte span.
    pub fn find(&self, haystack: &str) -> Option<(usize, usize)> {
        match self {
            Pattern::Regex(re) => re.find(haystack).map(|m| (m.start(), m.end())),
            Pattern::Literal(text) => haystack
                .find(text.as_str())
                .map(|start| (start, start + text.len())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Pattern::Regex(re) => re.as_str(),
            Pattern::Literal(text) => text,
        }
    }

    /// Plain text that a matching line would start with, used to hunt for
    /// near misses when the pattern fails.
    ///
    /// Literals yield their first non-blank line. Regexes yield their
    /// leading literal run: escapes are unescaped, `\s` classes collapse to a
    /// single space, and the scan stops at the first class, wildcard,
    /// quantifier or alternation.
    pub fn probe(&self) -> String {
        match self {
            Pattern::Literal(text) => text
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .unwrap_or("")
                .to_string(),
            Pattern::Regex(re) => literal_prefix(re.as_str()),
        }
    }
}

fn literal_prefix(pattern: &str) -> String {
    let mut out = String::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('s') => {
                    if !out.ends_with(' ') {
                        out.push(' ');
                    }
                    while matches!(chars.peek(), Some('*' | '+' | '?')) {
                        chars.next();
                    }
                }
                Some(escaped) if escaped.is_ascii_alphanumeric() => break,
                Some(escaped) => out.push(escaped),
                None => break,
            },
            '(' => {
                // Inline flags `(?s)` or the `(?:` of a non-capturing group
                if chars.peek() == Some(&'?') {
                    for next in chars.by_ref() {
                        if next == ':' || next == ')' {
                            break;
                        }
                    }
                }
            }
            ')' | '^' => {}
            '.' | '[' | '*' | '+' | '?' | '|' | '{' | '$' => break,
            _ => out.push(c),
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
