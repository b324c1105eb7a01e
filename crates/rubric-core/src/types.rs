// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Rubric workspace.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle state of a grading queue row.
///
/// `pending` and `processing` are the active states; a ticket may have at
/// most one active row at a time (enforced by the storage schema).
/// `completed` and `failed` are terminal -- failed rows are only retried by
/// manual re-queueing or a backfill run.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// A unit of deferred grading work for one ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueItem {
    /// Auto-generated row id.
    pub id: i64,
    /// Helpdesk ticket identifier.
    pub ticket_id: String,
    /// Snapshot of ticket fields captured at enqueue time.
    pub ticket_data: serde_json::Value,
    /// Current lifecycle state.
    pub status: QueueStatus,
    /// RFC 3339 timestamp before which the worker must not pick this row up.
    pub process_at: String,
    /// Pipeline outcome (success summary or error), attached when terminal.
    pub result: Option<serde_json::Value>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
    /// RFC 3339 timestamp of the terminal transition, if any.
    pub processed_at: Option<String>,
}

/// Letter grade derived from a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "C+")]
    CPlus,
    C,
    D,
    F,
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(s)
    }
}

/// Score and model explanation for a single rubric criterion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionScore {
    /// 1-5 rating.
    pub score: u8,
    /// Model-provided justification.
    #[serde(default)]
    pub explanation: String,
}

/// Per-criterion scores for one rubric category, plus the category mean
/// scaled to 0-100.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub criteria: BTreeMap<String, CriterionScore>,
    pub category_score: f64,
}

/// The four weighted rubric categories for one agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCard {
    pub soft_skills: CategoryBreakdown,
    pub issue_understanding: CategoryBreakdown,
    pub product_process: CategoryBreakdown,
    pub tools_utilization: CategoryBreakdown,
}

/// The persisted scoring result for one agent on one ticket.
///
/// Append-only: re-grading adds a new row, so "latest per agent" is a
/// derived query, not a stored fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    /// Synthetic id: `auto-{ticket}-{agent}-{millis}`.
    pub id: String,
    pub ticket_id: String,
    pub agent_name: String,
    /// Who produced this evaluation (always the automation identity here).
    pub evaluator: String,
    /// Deep link to the ticket in the helpdesk UI.
    pub ticket_link: String,
    pub is_escalation_agent: bool,
    /// When set, the final score is forced to 0 and the grade to F.
    pub zero_tolerance_violation: bool,
    pub violation_notes: String,
    pub scores: ScoreCard,
    /// Weighted average of category scores, 0-100.
    pub final_score: f64,
    pub grade: Grade,
    /// Coaching feedback suggested by the model.
    pub comments: String,
    /// The model's overall analysis text.
    pub ai_reasoning: String,
    /// Escalation trigger phrases found in the transcript.
    pub detected_triggers: Vec<String>,
    pub auto_graded: bool,
    /// RFC 3339 timestamp.
    pub created_at: String,
}
