// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Rubric QA grading service.
//!
//! This crate provides the shared error type and the domain types used
//! throughout the Rubric workspace: grading queue rows, evaluations, and
//! the score card structures persisted with them.

pub mod error;
pub mod types;

pub use error::RubricError;
pub use types::{
    CategoryBreakdown, CriterionScore, Evaluation, Grade, QueueItem, QueueStatus, ScoreCard,
};
