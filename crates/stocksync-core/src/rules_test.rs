use std::path::{Path, PathBuf};

use super::*;

fn repo_rules_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("config")
        .join("matching.yaml")
}

#[test]
fn sku_policy_accepts_prefixed_sku() {
    let policy = SkuPolicy::default();
    assert!(policy.is_valid("C0700136"));
    assert!(policy.is_valid("C01234"));
}

#[test]
fn sku_policy_rejects_short_or_non_numeric_prefixed_sku() {
    let policy = SkuPolicy::default();
    assert!(!policy.is_valid("C012"));
    assert!(!policy.is_valid("CAB123"));
    assert!(!policy.is_valid(""));
}

#[test]
fn sku_policy_accepts_in_house_ean13_only() {
    let policy = SkuPolicy::default();
    assert!(policy.is_valid("9990001234567"));
    assert!(!policy.is_valid("7891234567890"));
    assert!(!policy.is_valid("999000123456"));
}

#[test]
fn default_rules_pass_validation() {
    assert!(validate_rules(&MatchingRules::default()).is_ok());
}

#[test]
fn duplicate_letter_code_is_rejected() {
    let mut rules = MatchingRules::default();
    rules.letter_sizes.push(LetterSize {
        code: "gg".to_string(),
        synonyms: vec!["XLARGE".to_string()],
    });
    let err = validate_rules(&rules).unwrap_err();
    assert!(
        matches!(err, ConfigError::Validation(ref msg) if msg.contains("duplicate")),
        "expected duplicate-code validation error, got: {err:?}"
    );
}

#[test]
fn letter_size_without_synonyms_is_rejected() {
    let mut rules = MatchingRules::default();
    rules.letter_sizes.push(LetterSize {
        code: "XP".to_string(),
        synonyms: vec![],
    });
    assert!(matches!(
        validate_rules(&rules),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn cyclic_name_corrections_are_rejected() {
    let mut rules = MatchingRules::default();
    rules.name_corrections.push(NameCorrection {
        from: "Saia".to_string(),
        to: "Sainha".to_string(),
    });
    rules.name_corrections.push(NameCorrection {
        from: "nha".to_string(),
        to: "Saia".to_string(),
    });
    let err = validate_rules(&rules).unwrap_err();
    assert!(
        matches!(err, ConfigError::Validation(ref msg) if msg.contains("feeds back")),
        "expected correction-cycle validation error, got: {err:?}"
    );
}

#[test]
fn self_expanding_correction_is_rejected() {
    let mut rules = MatchingRules::default();
    rules.name_corrections.push(NameCorrection {
        from: "bone".to_string(),
        to: "Bone".to_string(),
    });
    assert!(matches!(
        validate_rules(&rules),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn chained_corrections_without_a_loop_are_accepted() {
    let mut rules = MatchingRules::default();
    rules.name_corrections.push(NameCorrection {
        from: "Blsa".to_string(),
        to: "Blusa".to_string(),
    });
    rules.name_corrections.push(NameCorrection {
        from: "Vstido".to_string(),
        to: "Vestido".to_string(),
    });
    assert!(validate_rules(&rules).is_ok());
}

#[test]
fn empty_suffix_is_rejected() {
    let mut rules = MatchingRules::default();
    rules.name_suffixes.push(String::new());
    assert!(matches!(
        validate_rules(&rules),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn partial_yaml_keeps_default_tables() {
    let yaml = "brand_filters: [\"Saphira\"]\n";
    let rules: MatchingRules = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(rules.brand_filters, vec!["Saphira".to_string()]);
    assert_eq!(rules.letter_sizes, MatchingRules::default().letter_sizes);
    assert_eq!(rules.sku_policy, SkuPolicy::default());
}

#[test]
fn load_rules_reports_missing_file() {
    let err = load_rules(Path::new("/definitely/not/here.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::RulesFileIo { .. }));
}

#[test]
fn load_rules_or_default_falls_back_when_missing() {
    let rules = load_rules_or_default(Path::new("/definitely/not/here.yaml")).unwrap();
    assert_eq!(rules, MatchingRules::default());
}

#[test]
fn repo_rules_file_matches_built_in_defaults() {
    let path = repo_rules_path();
    assert!(
        path.exists(),
        "matching.yaml missing at {path:?}; required for this test"
    );
    let rules = load_rules(&path).expect("failed to load matching.yaml");
    assert_eq!(rules, MatchingRules::default());
}
