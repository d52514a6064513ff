// SPDX-FileCopyrightText: 2026 Remindr Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./remindr.toml` > `~/.config/remindr/remindr.toml` > `/etc/remindr/remindr.toml`
//! with environment variable overrides via `REMINDR_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RemindrConfig;

/// Config sections, used to turn `REMINDR_<SECTION>_<KEY>` into `<section>.<key>`.
const SECTIONS: &[&str] = &[
    "service",
    "storage",
    "phone",
    "delivery",
    "cache",
    "reminders",
    "summary",
    "calendar",
    "migration",
    "gateway",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/remindr/remindr.toml` (system-wide)
/// 3. `~/.config/remindr/remindr.toml` (user XDG config)
/// 4. `./remindr.toml` (local directory)
/// 5. `REMINDR_*` environment variables
pub fn load_config() -> Result<RemindrConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<RemindrConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RemindrConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RemindrConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RemindrConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RemindrConfig::default()))
        .merge(Toml::file("/etc/remindr/remindr.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("remindr/remindr.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("remindr.toml"))
        .merge(env_provider())
}

/// Maps `REMINDR_DELIVERY_API_TOKEN` to `delivery.api_token`.
///
/// Uses `Env::map()` rather than `Env::split("_")`: key names contain
/// underscores themselves. The mapper sees the key in its original case,
/// so it is lowercased before matching section names.
fn env_provider() -> Env {
    Env::prefixed("REMINDR_")
        .map(|key| env_key_to_path(&key.as_str().to_ascii_lowercase()).into())
}

/// Rewrites the first `<section>_` of a lowercased env key as `<section>.`.
pub(crate) fn env_key_to_path(key: &str) -> String {
    SECTIONS
        .iter()
        .find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|rest| format!("{section}.{rest}"))
        })
        .unwrap_or_else(|| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(env_key_to_path("delivery_api_token"), "delivery.api_token");
        assert_eq!(
            env_key_to_path("reminders_message_template"),
            "reminders.message_template"
        );
        assert_eq!(env_key_to_path("gateway_port"), "gateway.port");
        assert_eq!(env_key_to_path("unrelated"), "unrelated");
    }

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("remindr.toml", "[gateway]\nport = 4000\n")?;
            jail.set_env("REMINDR_GATEWAY_PORT", "5000");
            jail.set_env("REMINDR_DELIVERY_API_TOKEN", "tok");
            let config = load_config_from_path(Path::new("remindr.toml"))?;
            assert_eq!(config.gateway.port, 5000);
            assert_eq!(config.delivery.api_token.as_deref(), Some("tok"));
            Ok(())
        });
    }

    #[test]
    fn uppercase_env_keys_reach_nested_fields() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("REMINDR_REMINDERS_BATCH_SIZE", "7");
            jail.set_env("REMINDR_PHONE_HOME_REGION", "BE");
            let config = build_figment().extract::<RemindrConfig>()?;
            assert_eq!(config.reminders.batch_size, 7);
            assert_eq!(config.phone.home_region, "BE");
            Ok(())
        });
    }
}
