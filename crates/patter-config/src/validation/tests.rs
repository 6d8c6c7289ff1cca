//! Tests for the validation pipeline.

use super::*;

#[test]
fn default_config_validates() {
    assert!(validate(&PatterConfig::default()).is_ok());
}

#[test]
fn catches_zero_port() {
    let mut config = PatterConfig::default();
    config.server.port = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.port"));
}

#[test]
fn catches_empty_model() {
    let mut config = PatterConfig::default();
    config.generation.model = "  ".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("generation.model"));
}

#[test]
fn catches_non_http_base_url() {
    let mut config = PatterConfig::default();
    config.generation.base_url = "localhost:11434".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("generation.base_url"));
}

#[test]
fn catches_zero_timeout() {
    let mut config = PatterConfig::default();
    config.generation.timeout_secs = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("generation.timeout_secs"));
}

#[test]
fn catches_empty_and_identical_markers() {
    let mut config = PatterConfig::default();
    config.markup.begin = String::new();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("markup.begin must not be empty"));

    let mut config = PatterConfig::default();
    config.markup.end = config.markup.begin.clone();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("must differ"));
}

#[test]
fn collects_multiple_errors() {
    let mut config = PatterConfig::default();
    config.server.port = 0;
    config.generation.timeout_secs = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("server.port"));
    assert!(err.contains("generation.timeout_secs"));
    assert!(err.contains("; "));
}
