use std::path::Path;

use cb_domain::config::{Config, ConfigSeverity, LogFormat};

#[test]
fn default_token_env_is_telegram_token() {
    let config = Config::default();
    assert_eq!(config.telegram.token_env, "TELEGRAM_TOKEN");
}

#[test]
fn default_snapshot_lives_on_data_volume() {
    let config = Config::default();
    assert_eq!(
        config.storage.snapshot_path,
        Path::new("/data/conversationbot.json")
    );
    assert_eq!(config.storage.fallback_path, Path::new("conversationbot.json"));
    assert!(config.storage.atomic_writes);
}

#[test]
fn default_dispatch_is_single_loop() {
    let config = Config::default();
    assert_eq!(config.dispatch.max_in_flight, 1);
}

#[test]
fn empty_file_parses_to_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.telegram.poll_timeout_secs, 60);
    assert_eq!(config.telegram.request_timeout_secs, 75);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let toml_str = r#"
[storage]
snapshot_path = "/tmp/sessions.json"

[dispatch]
max_in_flight = 8
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.storage.snapshot_path, Path::new("/tmp/sessions.json"));
    assert!(config.storage.atomic_writes);
    assert_eq!(config.dispatch.max_in_flight, 8);
    assert_eq!(config.telegram.token_env, "TELEGRAM_TOKEN");
}

#[test]
fn defaults_validate_clean() {
    let config = Config::default();
    assert!(config.validate().is_empty());
}

#[test]
fn zero_in_flight_is_an_error() {
    let mut config = Config::default();
    config.dispatch.max_in_flight = 0;
    let issues = config.validate();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, ConfigSeverity::Error);
    assert_eq!(issues[0].field, "dispatch.max_in_flight");
}

#[test]
fn short_request_timeout_is_a_warning() {
    let mut config = Config::default();
    config.telegram.request_timeout_secs = 30;
    let issues = config.validate();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, ConfigSeverity::Warning);
    assert_eq!(issues[0].field, "telegram.request_timeout_secs");
}

#[test]
fn empty_token_env_is_an_error() {
    let mut config = Config::default();
    config.telegram.token_env = "  ".into();
    let issues = config.validate();
    assert!(issues
        .iter()
        .any(|i| i.field == "telegram.token_env" && i.severity == ConfigSeverity::Error));
}

#[test]
fn config_error_display_is_tagged() {
    let mut config = Config::default();
    config.storage.atomic_writes = false;
    let issues = config.validate();
    assert_eq!(issues.len(), 1);
    assert_eq!(
        issues[0].to_string(),
        "[WARN] storage.atomic_writes: direct overwrites can leave a truncated snapshot after a crash"
    );
}
