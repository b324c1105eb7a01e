// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the grading queue and evaluations.
//!
//! Single-writer design: all access goes through one tokio-rusqlite
//! connection, with embedded refinery migrations applied on open.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::{Database, now_rfc3339};
pub use models::*;
