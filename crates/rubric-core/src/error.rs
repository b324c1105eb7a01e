// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Rubric grading service.

use thiserror::Error;

/// The primary error type used across all Rubric crates.
#[derive(Debug, Error)]
pub enum RubricError {
    /// Configuration errors (invalid TOML, missing credentials, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Helpdesk API errors. Carries the upstream HTTP status where one was
    /// received so handlers can propagate it.
    #[error("helpdesk error: {message}")]
    Helpdesk {
        message: String,
        status: Option<u16>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// LLM provider errors (API failure, token limits, model not found).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The model's free-text output could not be parsed into an evaluation.
    /// Carries a snippet of the raw output for diagnosis.
    #[error("malformed model output: {reason}")]
    MalformedOutput { reason: String, snippet: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RubricError {
    /// Upstream HTTP status to propagate for this error, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            RubricError::Helpdesk { status, .. } => *status,
            _ => None,
        }
    }
}
