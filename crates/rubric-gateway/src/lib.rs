// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Rubric QA service: webhook intake from the
//! helpdesk, the scheduled worker trigger, the widget summary endpoint,
//! and health.

pub mod auth;
pub mod handlers;
pub mod server;

pub use server::{GatewayState, QueuePolicy, ServerConfig, build_router, start_server};
