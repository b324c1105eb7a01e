// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths, sane queue bounds, and complete
//! credential pairs.

use crate::diagnostic::ConfigError;
use crate::model::RubricConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &RubricConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    }

    if config.queue.batch_size == 0 {
        errors.push(ConfigError::Validation {
            message: "queue.batch_size must be at least 1".to_string(),
        });
    }

    // A week-long delay already defeats the point of timely QA feedback;
    // beyond that is almost certainly a unit mistake (days vs hours).
    if config.queue.delay_hours > 168 {
        errors.push(ConfigError::Validation {
            message: format!(
                "queue.delay_hours must be at most 168 (one week), got {}",
                config.queue.delay_hours
            ),
        });
    }

    // Helpdesk credentials come as a triple; a partial set means a typo'd
    // deployment, not an intentionally disabled integration.
    let helpdesk_set = [
        config.helpdesk.domain.is_some(),
        config.helpdesk.email.is_some(),
        config.helpdesk.api_key.is_some(),
    ];
    let set_count = helpdesk_set.iter().filter(|b| **b).count();
    if set_count != 0 && set_count != helpdesk_set.len() {
        errors.push(ConfigError::Validation {
            message: "helpdesk.domain, helpdesk.email, and helpdesk.api_key must be set together"
                .to_string(),
        });
    }

    if let Some(domain) = &config.helpdesk.domain
        && (domain.contains("://") || domain.contains('/'))
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "helpdesk.domain must be a bare host like `acme.gorgias.com`, got `{domain}`"
            ),
        });
    }

    if config.anthropic.max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "anthropic.max_tokens must be at least 1".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = RubricConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = RubricConfig::default();
        config.storage.database_path = "".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("database_path"))
        ));
    }

    #[test]
    fn zero_batch_size_fails_validation() {
        let mut config = RubricConfig::default();
        config.queue.batch_size = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("batch_size"))
        ));
    }

    #[test]
    fn partial_helpdesk_credentials_fail_validation() {
        let mut config = RubricConfig::default();
        config.helpdesk.domain = Some("acme.gorgias.com".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("set together"))
        ));
    }

    #[test]
    fn full_helpdesk_credentials_pass() {
        let mut config = RubricConfig::default();
        config.helpdesk.domain = Some("acme.gorgias.com".to_string());
        config.helpdesk.email = Some("qa@acme.com".to_string());
        config.helpdesk.api_key = Some("key".to_string());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn url_shaped_domain_fails_validation() {
        let mut config = RubricConfig::default();
        config.helpdesk.domain = Some("https://acme.gorgias.com".to_string());
        config.helpdesk.email = Some("qa@acme.com".to_string());
        config.helpdesk.api_key = Some("key".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("bare host"))
        ));
    }

    #[test]
    fn oversized_delay_fails_validation() {
        let mut config = RubricConfig::default();
        config.queue.delay_hours = 720;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("delay_hours"))
        ));
    }
}
