// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the semantic constraints serde attributes cannot express. All
//! problems are collected; validation does not stop at the first one.

use remindr_phone::Region;

use crate::diagnostic::ConfigError;
use crate::model::RemindrConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &RemindrConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.service.log_level.as_str()) {
        errors.push(ConfigError::invalid(
            "service.log_level",
            format!("`{}` is not one of {}", config.service.log_level, LOG_LEVELS.join(", ")),
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::invalid("storage.database_path", "must not be empty"));
    }

    if Region::from_code(&config.phone.home_region).is_none() {
        errors.push(ConfigError::invalid(
            "phone.home_region",
            format!("`{}` is not a known region code", config.phone.home_region),
        ));
    }

    if config.reminders.batch_size < 1 {
        errors.push(ConfigError::invalid("reminders.batch_size", "must be at least 1"));
    }

    if !config.reminders.message_template.contains("{client_name}") {
        errors.push(ConfigError::invalid(
            "reminders.message_template",
            "must reference {client_name}",
        ));
    }

    if config.cache.freshness_days < 1 {
        errors.push(ConfigError::invalid("cache.freshness_days", "must be at least 1"));
    }

    for (key, secs) in [
        ("delivery.timeout_secs", config.delivery.timeout_secs),
        ("calendar.timeout_secs", config.calendar.timeout_secs),
        ("migration.attempt_timeout_secs", config.migration.attempt_timeout_secs),
    ] {
        if secs == 0 {
            errors.push(ConfigError::invalid(key, "must be greater than 0"));
        }
    }

    if config.migration.max_attempts < 1 {
        errors.push(ConfigError::invalid("migration.max_attempts", "must be at least 1"));
    }

    if config.migration.page_size < 1 {
        errors.push(ConfigError::invalid("migration.page_size", "must be at least 1"));
    }

    for (key, url) in [
        ("delivery.base_url", &config.delivery.base_url),
        ("calendar.base_url", &config.calendar.base_url),
    ] {
        if let Some(url) = url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            errors.push(ConfigError::invalid(key, format!("`{url}` is not an http(s) URL")));
        }
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::invalid("gateway.host", "must not be empty"));
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        errors.push(ConfigError::invalid(
            "gateway.host",
            format!("`{host}` is not a valid IP address or hostname"),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&RemindrConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_problem() {
        let mut config = RemindrConfig::default();
        config.reminders.batch_size = 0;
        config.phone.home_region = "ZZ".into();
        config.cache.freshness_days = 0;
        config.delivery.timeout_secs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn rejects_template_without_client_name() {
        let mut config = RemindrConfig::default();
        config.reminders.message_template = "See you at {time}".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("reminders.message_template"));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut config = RemindrConfig::default();
        config.calendar.base_url = Some("ftp://calendar".into());
        assert!(validate_config(&config).is_err());
        config.calendar.base_url = Some("https://calendar.example".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_bad_gateway_host() {
        let mut config = RemindrConfig::default();
        config.gateway.host = "not a host!".into();
        assert!(validate_config(&config).is_err());
        config.gateway.host = "::1".into();
        assert!(validate_config(&config).is_ok());
    }
}
