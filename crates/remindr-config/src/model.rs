// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the remindr reminder engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level remindr configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RemindrConfig {
    /// Process-level settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// SQLite storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Phone normalization settings.
    #[serde(default)]
    pub phone: PhoneConfig,

    /// Messaging provider settings.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Delivery capability cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Reminder discovery and batch settings.
    #[serde(default)]
    pub reminders: RemindersConfig,

    /// Completion digest settings.
    #[serde(default)]
    pub summary: SummaryConfig,

    /// Calendar provider settings.
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Title migration job settings.
    #[serde(default)]
    pub migration: MigrationConfig,

    /// HTTP triggering interface settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Process-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Instance name, used in logs and health output.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "remindr".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("remindr").join("remindr.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("remindr.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_true() -> bool {
    true
}

/// Phone normalization configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PhoneConfig {
    /// ISO code of the region tried first and used as fallback.
    #[serde(default = "default_home_region")]
    pub home_region: String,
}

impl Default for PhoneConfig {
    fn default() -> Self {
        Self {
            home_region: default_home_region(),
        }
    }
}

fn default_home_region() -> String {
    "FR".to_string()
}

/// Messaging provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Provider API base URL. `None` disables delivery.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Bearer token for the provider API.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Provider error code meaning "destination cannot receive messages".
    #[serde(default = "default_undeliverable_code")]
    pub undeliverable_code: String,

    /// Hard timeout for one provider call, in seconds.
    #[serde(default = "default_delivery_timeout")]
    pub timeout_secs: u64,

    /// Pause between two attempts of the same batch, in milliseconds.
    #[serde(default = "default_inter_attempt_delay")]
    pub inter_attempt_delay_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_token: None,
            undeliverable_code: default_undeliverable_code(),
            timeout_secs: default_delivery_timeout(),
            inter_attempt_delay_ms: default_inter_attempt_delay(),
        }
    }
}

fn default_undeliverable_code() -> String {
    "131026".to_string()
}

fn default_delivery_timeout() -> u64 {
    15
}

fn default_inter_attempt_delay() -> u64 {
    1000
}

/// Delivery capability cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Consult and write the cache during reminder delivery.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Entries older than this are treated as absent.
    #[serde(default = "default_freshness_days")]
    pub freshness_days: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            freshness_days: default_freshness_days(),
        }
    }
}

fn default_freshness_days() -> u32 {
    7
}

/// Reminder discovery and batch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RemindersConfig {
    /// Clients attempted per `process` call when the caller gives no size.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// How many days ahead of today the default target date lies.
    #[serde(default = "default_days_ahead")]
    pub days_ahead: u32,

    /// Business name rendered into messages.
    #[serde(default = "default_business_name")]
    pub business_name: String,

    /// Message template. Placeholders: `{client_name}`, `{service}`, `{date}`,
    /// `{time}`, `{business_name}`.
    #[serde(default = "default_message_template")]
    pub message_template: String,
}

impl Default for RemindersConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            days_ahead: default_days_ahead(),
            business_name: default_business_name(),
            message_template: default_message_template(),
        }
    }
}

fn default_batch_size() -> usize {
    3
}

fn default_days_ahead() -> u32 {
    1
}

fn default_business_name() -> String {
    "Remindr".to_string()
}

fn default_message_template() -> String {
    "Bonjour {client_name}, nous vous rappelons votre rendez-vous {service} \
     le {date} à {time} chez {business_name}. À bientôt !"
        .to_string()
}

/// Completion digest configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SummaryConfig {
    /// Send a digest when a session drains.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Supervisory phone number receiving the digest.
    #[serde(default)]
    pub recipient: Option<String>,

    /// Route the digest through the capability cache.
    #[serde(default = "default_true")]
    pub use_cache: bool,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            recipient: None,
            use_cache: true,
        }
    }
}

/// Calendar provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CalendarConfig {
    /// Calendar API base URL. `None` disables discovery and migration.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Bearer token for the calendar API.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Hard timeout for one calendar call, in seconds.
    #[serde(default = "default_calendar_timeout")]
    pub timeout_secs: u64,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_token: None,
            timeout_secs: default_calendar_timeout(),
        }
    }
}

fn default_calendar_timeout() -> u64 {
    15
}

/// Delay growth between migration retries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffKind {
    /// `base * attempt`.
    #[default]
    Linear,
    /// `base * 2^(attempt - 1)`.
    Exponential,
}

/// Title migration job configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationConfig {
    /// Attempts per event before it is reported failed.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay between attempts, in milliseconds.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    #[serde(default)]
    pub backoff: BackoffKind,

    /// Hard timeout for one update attempt, in seconds.
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_secs: u64,

    /// Events fetched per run when the caller gives no limit.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
            backoff: BackoffKind::Linear,
            attempt_timeout_secs: default_attempt_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    1000
}

fn default_attempt_timeout() -> u64 {
    10
}

fn default_page_size() -> usize {
    50
}

/// HTTP triggering interface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind to.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bearer token required on `/v1` routes. `None` rejects every `/v1` request.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            bearer_token: None,
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    3000
}

impl RemindrConfig {
    /// Renders the effective configuration as TOML with secrets redacted.
    pub fn to_redacted_toml(&self) -> Result<String, toml::ser::Error> {
        let mut shown = self.clone();
        for secret in [
            &mut shown.delivery.api_token,
            &mut shown.calendar.api_token,
            &mut shown.gateway.bearer_token,
        ] {
            if secret.is_some() {
                *secret = Some("<redacted>".to_string());
            }
        }
        toml::to_string_pretty(&shown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = RemindrConfig::default();
        assert_eq!(config.reminders.batch_size, 3);
        assert_eq!(config.cache.freshness_days, 7);
        assert_eq!(config.delivery.undeliverable_code, "131026");
        assert_eq!(config.phone.home_region, "FR");
        assert_eq!(config.migration.backoff, BackoffKind::Linear);
        assert!(config.gateway.bearer_token.is_none());
        assert!(config.reminders.message_template.contains("{client_name}"));
    }

    #[test]
    fn redacted_toml_hides_tokens() {
        let mut config = RemindrConfig::default();
        config.delivery.api_token = Some("secret-delivery".into());
        config.gateway.bearer_token = Some("secret-gateway".into());
        let rendered = config.to_redacted_toml().unwrap();
        assert!(!rendered.contains("secret-delivery"));
        assert!(!rendered.contains("secret-gateway"));
        assert!(rendered.contains("<redacted>"));
    }
}
