// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Rubric grading service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Rubric configuration.
///
/// Loaded from TOML files, with environment variable overrides.
/// All sections are optional and default to sensible values; the helpdesk
/// and anthropic credentials have no defaults and must be supplied before
/// the service can talk to its collaborators.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RubricConfig {
    /// Service identity and logging settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Helpdesk (Gorgias-style) API settings.
    #[serde(default)]
    pub helpdesk: HelpdeskConfig,

    /// Anthropic API settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Grading queue settings.
    #[serde(default)]
    pub queue: QueueConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Service identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Display name used in internal notes and evaluation rows.
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
    "rubric".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Helpdesk API configuration.
///
/// The helpdesk uses HTTP Basic auth with an account email and API key.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HelpdeskConfig {
    /// Helpdesk domain, e.g. `acme.gorgias.com`. `None` disables outbound calls.
    #[serde(default)]
    pub domain: Option<String>,

    /// Account email for Basic auth.
    #[serde(default)]
    pub email: Option<String>,

    /// API key for Basic auth.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Anthropic API key. `None` requires an environment variable override.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model to use for grading requests.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens to generate per evaluation response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Anthropic API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            api_version: default_api_version(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    4000
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("rubric").join("rubric.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("rubric.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Grading queue configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    /// Hours to wait between ticket closure and grading. 0 grades on the
    /// next worker run.
    #[serde(default = "default_delay_hours")]
    pub delay_hours: u32,

    /// Maximum rows claimed per worker run.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Tickets evaluated within this many days are not re-queued.
    #[serde(default = "default_recent_window_days")]
    pub recent_window_days: u32,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            delay_hours: default_delay_hours(),
            batch_size: default_batch_size(),
            recent_window_days: default_recent_window_days(),
        }
    }
}

fn default_delay_hours() -> u32 {
    24
}

fn default_batch_size() -> u32 {
    10
}

fn default_recent_window_days() -> u32 {
    7
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret for the queue-processing endpoint. `None` leaves the
    /// endpoint open (matching the source deployment's default).
    #[serde(default)]
    pub cron_secret: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cron_secret: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_source_behavior() {
        let config = RubricConfig::default();
        assert_eq!(config.queue.delay_hours, 24);
        assert_eq!(config.queue.batch_size, 10);
        assert_eq!(config.queue.recent_window_days, 7);
        assert_eq!(config.anthropic.model, "claude-sonnet-4-20250514");
        assert_eq!(config.anthropic.max_tokens, 4000);
        assert!(config.helpdesk.domain.is_none());
        assert!(config.gateway.cron_secret.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml_str = r#"
[queue]
delay_hours = 0
batch_sise = 5
"#;
        assert!(toml::from_str::<RubricConfig>(toml_str).is_err());
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let toml_str = r#"
[helpdesk]
domain = "acme.gorgias.com"
email = "qa@acme.com"
api_key = "key"

[queue]
delay_hours = 0
"#;
        let config: RubricConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.helpdesk.domain.as_deref(), Some("acme.gorgias.com"));
        assert_eq!(config.queue.delay_hours, 0);
        assert_eq!(config.queue.batch_size, 10);
    }
}
