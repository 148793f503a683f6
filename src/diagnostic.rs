//! Near-miss hints for anchors that failed to match.
//!
//! Regex anchors break on small formatting drift (a renamed parameter, an
//! extra space). When a rule is skipped, the line of the buffer most similar
//! to the anchor's leading literal text is reported so the drift is visible
//! without opening the file.

use std::fmt;

/// Similarity floor below which no hint is reported.
const MIN_SIMILARITY: f64 = 0.6;

/// The buffer line that most resembles an anchor that did not match.
#[derive(Debug, Clone, PartialEq)]
pub struct NearMiss {
    /// 1-based line number
    pub line: usize,
    /// The trimmed line text
    pub text: String,
    /// Normalized Levenshtein similarity in [0, 1]; 1.0 when the line
    /// contains the probe verbatim
    pub similarity: f64,
}

impl fmt::Display for NearMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {} ({:.0}% similar): {}",
            self.line,
            self.similarity * 100.0,
            self.text
        )
    }
}

/// Find the line of `buffer` closest to `probe`.
///
/// Earlier lines win ties.
pub fn nearest_line(buffer: &str, probe: &str) -> Option<NearMiss> {
    let probe = probe.trim();
    if probe.is_empty() {
        return None;
    }

    let mut best: Option<NearMiss> = None;

    for (idx, line) in buffer.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let similarity = if trimmed.contains(probe) {
            1.0
        } else {
            strsim::normalized_levenshtein(trimmed, probe)
        };

        if similarity < MIN_SIMILARITY {
            continue;
        }

        if best.as_ref().map_or(true, |b| similarity > b.similarity) {
            best = Some(NearMiss {
                line: idx + 1,
                text: trimmed.to_string(),
                similarity,
            });
        }
    }

    best
}
