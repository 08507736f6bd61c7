//! Free-text product name canonicalization.
//!
//! Names from the two platforms differ by accents, casing, mis-encoded
//! characters (`"Cal?a"`), and marketing suffixes (`" - Kit"`). The
//! normalized form is only ever used as a lookup key.

use stocksync_core::MatchingRules;
use unicode_normalization::UnicodeNormalization;

/// Upper bound on normalization passes; see [`normalize_name`].
const MAX_PASSES: usize = 4;

/// Canonicalizes a product name into a comparison key.
///
/// One pass applies, in order: the literal name corrections, the trailing
/// suffix list (each suffix checked once, in order), NFKD decomposition with
/// every non-ASCII character dropped, lower-casing, removal of anything that
/// is not alphanumeric or whitespace, and whitespace collapsing.
///
/// Passes repeat until the output is stable so that
/// `normalize_name(normalize_name(x)) == normalize_name(x)` holds even when a
/// correction only becomes applicable after lower-casing (e.g. `"JACQUARD"`).
/// Rules files with corrections that feed back into each other are rejected
/// at load time; the pass cap only bounds corrections that combine with the
/// surrounding text.
///
/// Blank input yields `""`.
#[must_use]
pub fn normalize_name(raw: &str, rules: &MatchingRules) -> String {
    let mut current = single_pass(raw, rules);
    for _ in 1..MAX_PASSES {
        let next = single_pass(&current, rules);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// The part of a product title before its first `" - "` separator, which
/// storefront titles use for size or kit suffixes.
#[must_use]
pub fn base_name(title: &str) -> &str {
    title.split(" - ").next().unwrap_or(title)
}

fn single_pass(raw: &str, rules: &MatchingRules) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let mut name = raw.to_owned();
    for correction in &rules.name_corrections {
        if !correction.from.is_empty() && name.contains(correction.from.as_str()) {
            name = name.replace(correction.from.as_str(), &correction.to);
        }
    }

    for suffix in &rules.name_suffixes {
        if let Some(stripped) = name.strip_suffix(suffix.as_str()) {
            name = stripped.to_owned();
        }
    }

    let folded: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace())
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
