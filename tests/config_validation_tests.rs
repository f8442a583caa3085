//! Config Validation Tests
//!
//! Typo detection and range validation of `finder_config.toml`, exercised
//! independently from the rest of the pipeline.

use std::io::Write;

use wildfire_water_finder::config::validation::{
    known_config_keys, suggest_correction, validate_unknown_keys,
};
use wildfire_water_finder::config::{defaults, ConfigError, FinderConfig};

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_api_key_warns_with_suggestion() {
    let toml_str = r#"
[api]
max_retires = 5
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert_eq!(warnings[0].field, "api.max_retires");
    assert_eq!(warnings[0].suggestion.as_deref(), Some("api.max_retries"));
}

#[test]
fn typo_in_section_name_warns() {
    let warnings = validate_unknown_keys(
        r#"
[serach]
states = ["CA"]
"#,
    );
    assert!(warnings
        .iter()
        .any(|w| w.field == "serach" && w.suggestion.as_deref() == Some("search")));
}

#[test]
fn unrelated_key_has_no_suggestion() {
    let known = known_config_keys();
    assert_eq!(suggest_correction("completely.unrelated.option", &known), None);
}

#[test]
fn full_valid_config_produces_no_warnings() {
    let toml_str = FinderConfig::default().to_toml().unwrap();
    assert!(validate_unknown_keys(&toml_str).is_empty());
}

#[test]
fn unknown_keys_do_not_fail_loading() {
    let config = FinderConfig::from_toml_str(
        r#"
[search]
stat = ["CA"]
categories = ["F", "B"]
"#,
    )
    .unwrap();
    assert_eq!(config.search.categories, vec!["F", "B"]);
    assert!(config.search.states.is_empty());
}

// ============================================================================
// Range Validation
// ============================================================================

#[test]
fn oversized_page_is_rejected() {
    let err = FinderConfig::from_toml_str(&format!(
        "[api]\npage_size = {}\n",
        defaults::MAX_PAGE_SIZE + 1
    ))
    .unwrap_err();
    match err {
        ConfigError::Validation(errors) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("api.page_size"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn bad_codes_are_rejected() {
    let err = FinderConfig::from_toml_str(
        r#"
[search]
states = ["California"]
categories = ["F", ""]
"#,
    )
    .unwrap_err();
    let ConfigError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    assert_eq!(errors.len(), 2, "{errors:?}");
}

#[test]
fn zero_max_records_is_rejected() {
    assert!(FinderConfig::from_toml_str("[api]\nmax_records = 0\n").is_err());
    let config = FinderConfig::from_toml_str("[api]\nmax_records = 5000\n").unwrap();
    assert_eq!(config.api.max_records, Some(5000));
}

#[test]
fn max_records_has_a_finite_default() {
    let config = FinderConfig::from_toml_str("[api]\npage_size = 500\n").unwrap();
    assert_eq!(config.api.max_records, Some(defaults::MAX_RECORDS));
    assert_eq!(FinderConfig::default().api.max_records, Some(defaults::MAX_RECORDS));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = FinderConfig::from_toml_str("[api\npage_size = ").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(..)));
}

// ============================================================================
// File Loading
// ============================================================================

#[test]
fn load_from_file_reads_all_sections() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[server]
addr = "127.0.0.1:9000"

[api]
base_url = "http://localhost:8080/api/open/v2/PublicAssistanceGrantAwardActivities"
page_size = 500
timeout_secs = 30

[search]
include_keywords = ["water", "sewer"]
exclude_keywords = ["county"]
incident_contains = false
"#
    )
    .unwrap();

    let config = FinderConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.server.addr, "127.0.0.1:9000");
    assert_eq!(config.api.page_size, 500);
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.api.max_retries, defaults::MAX_RETRIES);
    assert_eq!(config.search.include_keywords, vec!["water", "sewer"]);
    assert_eq!(config.search.exclude_keywords, vec!["county"]);
    assert!(!config.search.incident_contains);
    assert_eq!(config.search.categories, vec!["F"]);
}

#[test]
fn load_from_file_reports_path_on_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[server\naddr = 1").unwrap();

    match FinderConfig::load_from_file(file.path()) {
        Err(ConfigError::Parse(path, _)) => assert_eq!(path, file.path()),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn load_from_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = FinderConfig::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(..)));
}
