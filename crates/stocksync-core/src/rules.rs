//! Catalog-specific matching data: name repairs, suffixes, size tables,
//! brand filters, and SKU conventions.
//!
//! These tables describe the catalogs being reconciled rather than general
//! rules, so they live in a YAML file (`config/matching.yaml`). Any section
//! omitted from the file falls back to [`MatchingRules::default`].

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A literal substring replacement applied before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameCorrection {
    pub from: String,
    pub to: String,
}

/// A canonical letter size and the free-text tokens that mean it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterSize {
    pub code: String,
    pub synonyms: Vec<String>,
}

/// Which codes count as real product SKUs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkuPolicy {
    /// Prefix carried by catalog SKUs (e.g. `"C"` for `C0700136`).
    pub internal_prefix: String,
    /// Minimum total length of a prefixed SKU.
    pub prefix_min_len: usize,
    /// Number of characters after the prefix that must be digits.
    pub prefix_digits: usize,
    /// EAN-13 codes starting with this prefix are accepted as SKUs too.
    pub ean13_prefix: String,
}

impl Default for SkuPolicy {
    fn default() -> Self {
        Self {
            internal_prefix: "C".to_string(),
            prefix_min_len: 5,
            prefix_digits: 5,
            ean13_prefix: "999".to_string(),
        }
    }
}

impl SkuPolicy {
    /// Returns `true` when `sku` follows the catalog SKU convention or is an
    /// in-house EAN-13.
    #[must_use]
    pub fn is_valid(&self, sku: &str) -> bool {
        let sku = sku.trim();
        if sku.is_empty() {
            return false;
        }

        let prefixed = sku.starts_with(self.internal_prefix.as_str())
            && sku.chars().count() >= self.prefix_min_len;
        if !prefixed {
            return sku.len() == 13
                && sku.chars().all(|c| c.is_ascii_digit())
                && sku.starts_with(self.ean13_prefix.as_str());
        }

        let digits: Vec<char> = sku[self.internal_prefix.len()..]
            .chars()
            .take(self.prefix_digits)
            .collect();
        !digits.is_empty() && digits.iter().all(char::is_ascii_digit)
    }
}

/// Fallback values used when creating products on the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDefaults {
    /// Name of the size option on created products.
    pub size_option: String,
    /// One variant is created per size, with SKU `{base}{size}`.
    pub sizes: Vec<String>,
    pub vendor: String,
    pub product_type: String,
}

impl Default for ProductDefaults {
    fn default() -> Self {
        Self {
            size_option: "Tamanho".to_string(),
            sizes: ["36", "38", "40", "42"].map(String::from).to_vec(),
            vendor: "Marca não especificada".to_string(),
            product_type: "Categoria não especificada".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingRules {
    /// Applied in order, each to the whole string.
    pub name_corrections: Vec<NameCorrection>,
    /// Each checked once, in order; a match is cut from the end of the name.
    pub name_suffixes: Vec<String>,
    /// Scanned in order as plain substrings before any letter size.
    pub numeric_sizes: Vec<String>,
    /// Declaration order breaks ties between equally long synonyms.
    pub letter_sizes: Vec<LetterSize>,
    /// When non-empty, only names containing one of these brands are synced.
    pub brand_filters: Vec<String>,
    pub sku_policy: SkuPolicy,
    pub product_defaults: ProductDefaults,
}

impl Default for MatchingRules {
    fn default() -> Self {
        let correction = |from: &str, to: &str| NameCorrection {
            from: from.to_string(),
            to: to.to_string(),
        };
        let letter = |code: &str, synonyms: &[&str]| LetterSize {
            code: code.to_string(),
            synonyms: synonyms.iter().map(|s| (*s).to_string()).collect(),
        };

        Self {
            name_corrections: vec![
                correction("Cal?a", "Calca"),
                correction("Calça", "Calca"),
                correction("Ca?a", "Calca"),
                correction("jacquard", "jaquard"),
            ],
            name_suffixes: [
                " + PAC",
                " PAC",
                " - Tamanho Unico",
                " - Kit bone + ecobag",
                " - Kit",
                " - ",
            ]
            .map(String::from)
            .to_vec(),
            numeric_sizes: ["34", "36", "38", "40", "42", "44", "46", "48", "50"]
                .map(String::from)
                .to_vec(),
            letter_sizes: vec![
                letter("PP", &["PP", "XS", "EXTRA SMALL"]),
                letter("P", &["P", "S", "SMALL", "1P", "2P", "3P"]),
                letter("M", &["M", "MEDIUM", "1M", "2M", "3M"]),
                letter("G", &["G", "L", "LARGE", "1G", "2G", "3G"]),
                letter("GG", &["GG", "XL", "EXTRA LARGE", "XG"]),
                letter("XGG", &["XGG", "XXL", "EXTRA EXTRA LARGE", "XXG"]),
                letter(
                    "U",
                    &[
                        "U",
                        "UNICO",
                        "ÚNICO",
                        "UNIVERSAL",
                        "TAMANHO UNICO",
                        "TAMANHO ÚNICO",
                    ],
                ),
            ],
            brand_filters: Vec::new(),
            sku_policy: SkuPolicy::default(),
            product_defaults: ProductDefaults::default(),
        }
    }
}

/// Load and validate matching rules from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_rules(path: &Path) -> Result<MatchingRules, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::RulesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let rules: MatchingRules = serde_yaml::from_str(&content)?;
    validate_rules(&rules)?;

    Ok(rules)
}

/// Like [`load_rules`], but returns the built-in tables when `path` does not
/// exist.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// fails validation.
pub fn load_rules_or_default(path: &Path) -> Result<MatchingRules, ConfigError> {
    if path.exists() {
        load_rules(path)
    } else {
        tracing::info!(
            path = %path.display(),
            "matching rules file not found; using built-in tables"
        );
        Ok(MatchingRules::default())
    }
}

fn validate_rules(rules: &MatchingRules) -> Result<(), ConfigError> {
    if rules.name_suffixes.iter().any(String::is_empty) {
        return Err(ConfigError::Validation(
            "name suffixes must be non-empty".to_string(),
        ));
    }

    if rules.name_corrections.iter().any(|c| c.from.is_empty()) {
        return Err(ConfigError::Validation(
            "name corrections must have a non-empty 'from'".to_string(),
        ));
    }

    if let Some(from) = correction_cycle(&rules.name_corrections) {
        return Err(ConfigError::Validation(format!(
            "name correction '{from}' feeds back into itself"
        )));
    }

    if rules.numeric_sizes.iter().any(|s| s.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "numeric sizes must be non-empty".to_string(),
        ));
    }

    let mut seen_codes = HashSet::new();
    for size in &rules.letter_sizes {
        let code = size.code.trim().to_uppercase();
        if code.is_empty() {
            return Err(ConfigError::Validation(
                "letter size code must be non-empty".to_string(),
            ));
        }
        if !seen_codes.insert(code) {
            return Err(ConfigError::Validation(format!(
                "duplicate letter size code: '{}'",
                size.code
            )));
        }
        if size.synonyms.is_empty() || size.synonyms.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "letter size '{}' needs at least one non-empty synonym",
                size.code
            )));
        }
    }

    if rules.product_defaults.sizes.is_empty() {
        return Err(ConfigError::Validation(
            "product_defaults.sizes must list at least one size".to_string(),
        ));
    }

    Ok(())
}

/// Finds a correction whose output, directly or through other corrections,
/// reintroduces its own `from`. Such a chain never reaches a fixed point.
///
/// Names are lower-cased between normalization passes, so an output also
/// triggers any correction matching its lower-cased form. Corrections with
/// `from == to` are no-ops and ignored.
fn correction_cycle(corrections: &[NameCorrection]) -> Option<&str> {
    let feeds = |i: usize, j: usize| {
        let (to, from) = (&corrections[i].to, corrections[j].from.as_str());
        to.contains(from) || to.to_lowercase().contains(from)
    };
    let active: Vec<usize> = (0..corrections.len())
        .filter(|&i| corrections[i].from != corrections[i].to)
        .collect();

    // 0 = unvisited, 1 = on the current path, 2 = done.
    let mut state = vec![0u8; corrections.len()];
    for &start in &active {
        if state[start] != 0 {
            continue;
        }
        let mut stack = vec![(start, 0usize)];
        state[start] = 1;
        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            if let Some(&succ) = active.get(frame.1) {
                frame.1 += 1;
                if !feeds(node, succ) {
                    continue;
                }
                match state[succ] {
                    1 => return Some(corrections[succ].from.as_str()),
                    0 => {
                        state[succ] = 1;
                        stack.push((succ, 0));
                    }
                    _ => {}
                }
            } else {
                state[node] = 2;
                stack.pop();
            }
        }
    }
    None
}

#[cfg(test)]
#[path = "rules_test.rs"]
mod tests;
