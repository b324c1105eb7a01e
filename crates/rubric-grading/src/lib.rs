// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The grading pipeline: transcript assembly, escalation trigger detection,
//! rubric prompting, model output parsing, score arithmetic, and the queue
//! worker that drives it all.

pub mod bots;
pub mod parse;
pub mod pipeline;
pub mod prompt;
pub mod scoring;
pub mod transcript;
pub mod triggers;
pub mod worker;

pub use pipeline::{Grader, TicketReport};
pub use worker::{BatchSummary, Worker};
