// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Messages API client used for rubric scoring.

pub mod client;
pub mod types;

pub use client::AnthropicClient;
pub use types::{ApiMessage, MessageRequest, MessageResponse};
