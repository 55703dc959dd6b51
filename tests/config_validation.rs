//! Integration tests for configuration loading and validation

#![allow(clippy::expect_used)]

use layout_codec::config::{
    CodecConfig, CodecSettings, LoggingConfig, DEFAULT_MAX_NESTING_DEPTH,
    DEFAULT_MAX_UNBOUNDED_READ,
};
use layout_codec::core::layout::StringEncoding;
use tracing::Level;

#[test]
fn test_default_config_validates() {
    let config = CodecConfig::default();
    let errors = config.validate();
    assert!(
        errors.is_empty(),
        "Default config should be valid, but got errors: {:?}",
        errors
    );
}

#[test]
fn test_default_settings() {
    let settings = CodecSettings::default();
    assert_eq!(settings.default_string_encoding, StringEncoding::Ascii);
    assert_eq!(settings.max_unbounded_read, DEFAULT_MAX_UNBOUNDED_READ);
    assert_eq!(settings.max_nesting_depth, DEFAULT_MAX_NESTING_DEPTH);
}

#[test]
fn test_zero_unbounded_read() {
    let mut config = CodecConfig::default();
    config.codec.max_unbounded_read = 0;

    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("Max unbounded read must be greater than 0")));
}

#[test]
fn test_excessive_nesting_depth() {
    let mut config = CodecConfig::default();
    config.codec.max_nesting_depth = 10_000;

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Max nesting depth too large")));
}

#[test]
fn test_zero_nesting_depth() {
    let config = CodecConfig::default_with_overrides(|c| c.codec.max_nesting_depth = 0);
    assert!(config.validate_strict().is_err());
}

#[test]
fn test_logging_requires_output() {
    let config = LoggingConfig {
        log_to_console: false,
        log_to_file: false,
        ..LoggingConfig::default()
    };
    let errors = config.validate();
    assert!(errors
        .iter()
        .any(|e| e.contains("At least one logging output")));
}

#[test]
fn test_file_logging_requires_path() {
    let config = LoggingConfig {
        log_to_file: true,
        log_file_path: None,
        ..LoggingConfig::default()
    };
    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("log_file_path must be specified")));
}

#[test]
fn test_empty_app_name() {
    let config = LoggingConfig {
        app_name: String::new(),
        ..LoggingConfig::default()
    };
    assert!(config
        .validate()
        .iter()
        .any(|e| e.contains("Application name cannot be empty")));
}

#[test]
fn test_validate_strict_lists_every_error() {
    let config = CodecConfig::default_with_overrides(|c| {
        c.codec.max_unbounded_read = 0;
        c.codec.max_nesting_depth = 0;
    });
    let err = config.validate_strict().expect_err("should fail");
    let message = err.to_string();
    assert!(message.contains("Max unbounded read"));
    assert!(message.contains("Max nesting depth"));
}

#[test]
fn test_from_toml_partial() {
    let config = CodecConfig::from_toml(
        r#"
        [codec]
        default_string_encoding = "unicode"
        max_nesting_depth = 8
        "#,
    )
    .expect("valid TOML");

    assert_eq!(
        config.codec.default_string_encoding,
        StringEncoding::Unicode
    );
    assert_eq!(config.codec.max_nesting_depth, 8);
    assert_eq!(config.codec.max_unbounded_read, DEFAULT_MAX_UNBOUNDED_READ);
    assert_eq!(config.logging.log_level, Level::INFO);
}

#[test]
fn test_from_toml_rejects_unknown_encoding() {
    let result = CodecConfig::from_toml(
        r#"
        [codec]
        default_string_encoding = "ebcdic"
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn test_example_config_parses_back() {
    let example = CodecConfig::example_config();
    let parsed = CodecConfig::from_toml(&example).expect("example config should parse");
    assert_eq!(parsed.codec, CodecSettings::default());
    assert_eq!(parsed.logging.app_name, "layout-codec");
}

#[test]
fn test_save_and_load_file() {
    let path = std::env::temp_dir().join(format!(
        "layout-codec-config-{}.toml",
        std::process::id()
    ));
    let config = CodecConfig::default_with_overrides(|c| {
        c.codec.max_unbounded_read = 4096;
        c.logging.log_level = Level::DEBUG;
    });

    config.save_to_file(&path).expect("save should succeed");
    let loaded = CodecConfig::from_file(&path).expect("load should succeed");
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded.codec.max_unbounded_read, 4096);
    assert_eq!(loaded.logging.log_level, Level::DEBUG);
}

#[test]
fn test_missing_file() {
    let result = CodecConfig::from_file("/nonexistent/layout-codec.toml");
    assert!(result.is_err());
}
