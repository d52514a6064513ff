// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the remindr configuration system.

use remindr_config::diagnostic::ConfigError;
use remindr_config::{load_and_validate_str, load_config_from_str, BackoffKind};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[service]
name = "salon"
log_level = "debug"

[storage]
database_path = "/tmp/remindr-test.db"
wal_mode = false

[phone]
home_region = "BE"

[delivery]
base_url = "https://messages.example"
api_token = "tok"
undeliverable_code = "470"
timeout_secs = 5
inter_attempt_delay_ms = 0

[cache]
enabled = false
freshness_days = 3

[reminders]
batch_size = 10
days_ahead = 2
business_name = "Salon Lumière"
message_template = "Hi {client_name}, see you {date} at {time}"

[summary]
recipient = "+33600000000"
use_cache = false

[calendar]
base_url = "https://calendar.example"
timeout_secs = 8

[migration]
max_attempts = 5
backoff_ms = 250
backoff = "exponential"
attempt_timeout_secs = 2
page_size = 20

[gateway]
host = "0.0.0.0"
port = 8080
bearer_token = "secret"
"#;

    let config = load_and_validate_str(toml).expect("valid config");
    assert_eq!(config.service.name, "salon");
    assert_eq!(config.service.log_level, "debug");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.phone.home_region, "BE");
    assert_eq!(config.delivery.undeliverable_code, "470");
    assert_eq!(config.delivery.inter_attempt_delay_ms, 0);
    assert!(!config.cache.enabled);
    assert_eq!(config.cache.freshness_days, 3);
    assert_eq!(config.reminders.batch_size, 10);
    assert_eq!(config.reminders.days_ahead, 2);
    assert_eq!(config.summary.recipient.as_deref(), Some("+33600000000"));
    assert!(config.summary.enabled);
    assert!(!config.summary.use_cache);
    assert_eq!(config.calendar.timeout_secs, 8);
    assert_eq!(config.migration.backoff, BackoffKind::Exponential);
    assert_eq!(config.migration.max_attempts, 5);
    assert_eq!(config.gateway.port, 8080);
    assert_eq!(config.gateway.bearer_token.as_deref(), Some("secret"));
}

#[test]
fn empty_toml_yields_defaults() {
    let config = load_config_from_str("").expect("defaults");
    assert_eq!(config.reminders.batch_size, 3);
    assert_eq!(config.gateway.port, 3000);
    assert!(config.delivery.base_url.is_none());
}

#[test]
fn unknown_key_gets_a_suggestion() {
    let toml = "[reminders]\nbach_size = 4\n";
    let errors = load_and_validate_str(toml).expect_err("unknown key");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "bach_size");
            assert_eq!(suggestion.as_deref(), Some("batch_size"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[telegram]\nbot_token = \"x\"\n").expect_err("unknown section");
    assert!(matches!(errors[0], ConfigError::UnknownKey { .. }));
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[gateway]\nport = \"eighty\"\n").expect_err("wrong type");
    assert!(matches!(errors[0], ConfigError::InvalidType { .. }));
}

#[test]
fn unknown_backoff_kind_is_rejected() {
    assert!(load_and_validate_str("[migration]\nbackoff = \"random\"\n").is_err());
}

#[test]
fn semantic_errors_surface_after_parse() {
    let errors = load_and_validate_str("[reminders]\nbatch_size = 0\n").expect_err("invalid");
    assert!(matches!(errors[0], ConfigError::Validation { .. }));
}
