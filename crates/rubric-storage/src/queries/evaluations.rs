// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Evaluation persistence and read-side projections.
//!
//! The table is append-only. "Latest evaluation per agent" is derived at
//! query time from `created_at` ordering, never stored.

use rubric_core::RubricError;
use rubric_core::types::Evaluation;
use rusqlite::params;
use serde::Serialize;

use crate::database::{Database, map_tr_err};

/// One agent's most recent result on a ticket, as exposed to the
/// summary endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    pub agent_name: String,
    pub final_score: f64,
    pub grade: String,
    pub created_at: String,
}

/// Persist one evaluation row.
pub async fn insert(db: &Database, eval: &Evaluation) -> Result<(), RubricError> {
    let scores = serde_json::to_string(&eval.scores)
        .map_err(|e| RubricError::Internal(format!("serializing scores: {e}")))?;
    let triggers = serde_json::to_string(&eval.detected_triggers)
        .map_err(|e| RubricError::Internal(format!("serializing triggers: {e}")))?;
    let eval = eval.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO evaluations (
                     id, ticket_id, agent_name, evaluator, ticket_link,
                     is_escalation_agent, zero_tolerance_violation, violation_notes,
                     scores, final_score, grade, comments, ai_reasoning,
                     detected_triggers, auto_graded, created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                params![
                    eval.id,
                    eval.ticket_id,
                    eval.agent_name,
                    eval.evaluator,
                    eval.ticket_link,
                    eval.is_escalation_agent,
                    eval.zero_tolerance_violation,
                    eval.violation_notes,
                    scores,
                    eval.final_score,
                    eval.grade.to_string(),
                    eval.comments,
                    eval.ai_reasoning,
                    triggers,
                    eval.auto_graded,
                    eval.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Whether the ticket already has an evaluation created at or after `since`.
///
/// Gates the webhook: a ticket graded within the recent window is not
/// re-queued when it closes again.
pub async fn recent_exists(
    db: &Database,
    ticket_id: &str,
    since: &str,
) -> Result<bool, RubricError> {
    let ticket_id = ticket_id.to_string();
    let since = since.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM evaluations
                 WHERE ticket_id = ?1 AND created_at >= ?2",
                params![ticket_id, since],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// The most recent evaluation for each agent on a ticket, newest first.
pub async fn latest_per_agent(
    db: &Database,
    ticket_id: &str,
) -> Result<Vec<AgentSummary>, RubricError> {
    let ticket_id = ticket_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT agent_name, final_score, grade, MAX(created_at)
                 FROM evaluations
                 WHERE ticket_id = ?1
                 GROUP BY agent_name
                 ORDER BY MAX(created_at) DESC",
            )?;
            let summaries = stmt
                .query_map(params![ticket_id], |row| {
                    Ok(AgentSummary {
                        agent_name: row.get(0)?,
                        final_score: row.get(1)?,
                        grade: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(summaries)
        })
        .await
        .map_err(map_tr_err)
}

/// Ticket ids that already have at least one evaluation. Used by backfill
/// to skip tickets graded earlier.
pub async fn graded_ticket_ids(db: &Database) -> Result<Vec<String>, RubricError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare("SELECT DISTINCT ticket_id FROM evaluations")?;
            let ids = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ids)
        })
        .await
        .map_err(map_tr_err)
}
