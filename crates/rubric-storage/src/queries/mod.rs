// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQL query modules, one per table.

pub mod evaluations;
pub mod queue;
