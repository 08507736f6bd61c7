//! Canonical size extraction from free text.
//!
//! Numeric sizes are found anywhere in the text (`"Tamanho 38"` → `"38"`).
//! Letter sizes only match whole tokens, so the `"L"` in `"Blusa"` is not a
//! size, and the longest matching synonym wins (`"EXTRA LARGE"` beats
//! `"LARGE"`). Text with no recognizable size comes back trimmed and
//! upper-cased but is not canonical, and callers must not key on it.

use regex::Regex;
use stocksync_core::MatchingRules;

use crate::MatchingError;

#[derive(Debug)]
struct SynonymPattern {
    code: String,
    /// Length in characters, used to prefer the most specific synonym.
    len: usize,
    pattern: Regex,
}

/// Size lookup tables compiled from [`MatchingRules`].
#[derive(Debug)]
pub struct SizeExtractor {
    numeric: Vec<String>,
    /// In declaration order: code order first, then synonym order.
    synonyms: Vec<SynonymPattern>,
    codes: Vec<String>,
}

impl SizeExtractor {
    /// Compiles one whole-token pattern per letter-size synonym.
    ///
    /// # Errors
    ///
    /// Returns [`MatchingError::InvalidSizePattern`] if a synonym cannot be
    /// compiled into a regex.
    pub fn new(rules: &MatchingRules) -> Result<Self, MatchingError> {
        let numeric = rules
            .numeric_sizes
            .iter()
            .map(|s| s.trim().to_uppercase())
            .collect();

        let mut synonyms = Vec::new();
        let mut codes = Vec::new();
        for size in &rules.letter_sizes {
            let code = size.code.trim().to_uppercase();
            for synonym in &size.synonyms {
                let synonym = synonym.trim().to_uppercase();
                let source = format!(
                    r"(?:^|[^\p{{L}}\p{{N}}]){}(?:$|[^\p{{L}}\p{{N}}])",
                    regex::escape(&synonym)
                );
                let pattern =
                    Regex::new(&source).map_err(|e| MatchingError::InvalidSizePattern {
                        synonym: synonym.clone(),
                        source: e,
                    })?;
                synonyms.push(SynonymPattern {
                    code: code.clone(),
                    len: synonym.chars().count(),
                    pattern,
                });
            }
            codes.push(code);
        }

        Ok(Self {
            numeric,
            synonyms,
            codes,
        })
    }

    /// Maps free text to a size code.
    ///
    /// Returns `None` for blank input. Unrecognized text is returned trimmed
    /// and upper-cased; check it with [`SizeExtractor::is_canonical`] before
    /// using it as a key.
    #[must_use]
    pub fn extract(&self, raw: &str) -> Option<String> {
        let text = raw.trim().to_uppercase();
        if text.is_empty() {
            return None;
        }

        if let Some(numeric) = self.numeric.iter().find(|n| text.contains(n.as_str())) {
            return Some(numeric.clone());
        }

        let mut best: Option<&SynonymPattern> = None;
        for candidate in &self.synonyms {
            if best.is_some_and(|b| b.len >= candidate.len) {
                continue;
            }
            if candidate.pattern.is_match(&text) {
                best = Some(candidate);
            }
        }

        Some(best.map_or(text, |b| b.code.clone()))
    }

    /// Like [`SizeExtractor::extract`], but only yields canonical codes.
    #[must_use]
    pub fn canonical(&self, raw: &str) -> Option<String> {
        self.extract(raw).filter(|size| self.is_canonical(size))
    }

    /// Returns `true` when `size` is one of the configured numeric sizes or
    /// letter codes.
    #[must_use]
    pub fn is_canonical(&self, size: &str) -> bool {
        self.numeric.iter().any(|n| n == size) || self.codes.iter().any(|c| c == size)
    }
}
