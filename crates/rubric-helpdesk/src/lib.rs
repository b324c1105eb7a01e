// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gorgias helpdesk API client.
//!
//! Covers the subset of the helpdesk REST API the grading workflow needs:
//! fetching tickets and conversations, posting internal notes, tagging
//! graded tickets, and scanning the ticket list for backfill.

pub mod client;
pub mod types;

pub use client::HelpdeskClient;
pub use types::{Page, Sender, Tag, Ticket, TicketMessage};
