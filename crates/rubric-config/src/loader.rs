// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the hierarchy `./rubric.toml` > `~/.config/rubric/rubric.toml`
//! > `/etc/rubric/rubric.toml` with environment variable overrides via the
//! `RUBRIC_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::RubricConfig;

/// Load configuration from the standard file hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/rubric/rubric.toml` (system-wide)
/// 3. `~/.config/rubric/rubric.toml` (user XDG config)
/// 4. `./rubric.toml` (local directory)
/// 5. `RUBRIC_*` environment variables
pub fn load_config() -> Result<RubricConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RubricConfig::default()))
        .merge(Toml::file("/etc/rubric/rubric.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("rubric/rubric.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("rubric.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no file lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<RubricConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RubricConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RubricConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RubricConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `RUBRIC_HELPDESK_API_KEY` must map to
/// `helpdesk.api_key`, not `helpdesk.api.key`.
fn env_provider() -> Env {
    Env::prefixed("RUBRIC_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: RUBRIC_ANTHROPIC_API_KEY -> "anthropic_api_key"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("helpdesk_", "helpdesk.", 1)
            .replacen("anthropic_", "anthropic.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("queue_", "queue.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_string_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[queue]
delay_hours = 0

[gateway]
port = 9000
cron_secret = "s3cret"
"#,
        )
        .unwrap();
        assert_eq!(config.queue.delay_hours, 0);
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.gateway.cron_secret.as_deref(), Some("s3cret"));
        // Untouched sections keep defaults.
        assert_eq!(config.service.name, "rubric");
    }

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.queue.delay_hours, 24);
    }
}
