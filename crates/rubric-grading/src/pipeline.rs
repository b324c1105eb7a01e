// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-ticket grading pipeline.
//!
//! One [`Grader::grade_ticket`] call takes a ticket from conversation fetch
//! through model scoring to persisted evaluations, internal notes, and the
//! graded tag. Failures before anything is persisted surface as errors so
//! the queue row is marked failed; per-agent persistence failures and the
//! note/tag side effects are logged and do not fail the run.

use rubric_anthropic::{AnthropicClient, ApiMessage, MessageRequest};
use rubric_core::RubricError;
use rubric_core::types::{Evaluation, Grade};
use rubric_helpdesk::HelpdeskClient;
use rubric_storage::{Database, now_rfc3339, queries};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::bots::is_bot;
use crate::parse::{parse_analysis, score_card};
use crate::prompt::build_prompt;
use crate::scoring::{final_score, grade_for};
use crate::transcript::{build_transcript, extract_agents};
use crate::triggers::{detect_triggers, is_escalation_agent};

/// Name the internal note is authored under.
const NOTE_AUTHOR: &str = "Rubric QA";

/// Evaluator identity recorded on automated evaluations.
const EVALUATOR: &str = "auto";

/// Executes the grading pipeline for single tickets.
#[derive(Clone)]
pub struct Grader {
    db: Database,
    helpdesk: HelpdeskClient,
    llm: AnthropicClient,
    domain: String,
    max_tokens: u32,
}

/// Outcome of a successful grading run for one ticket.
#[derive(Debug, Clone, Serialize)]
pub struct TicketReport {
    pub evaluations: Vec<AgentResult>,
    /// Human agents persisted.
    pub agents_processed: usize,
    /// Agents the model reported, bots included.
    pub agents_total: usize,
}

/// Summary of one agent's evaluation, echoed into the queue row result.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResult {
    pub agent: String,
    pub score: f64,
    pub grade: String,
    pub feedback: String,
}

impl Grader {
    pub fn new(
        db: Database,
        helpdesk: HelpdeskClient,
        llm: AnthropicClient,
        domain: String,
        max_tokens: u32,
    ) -> Self {
        Self {
            db,
            helpdesk,
            llm,
            domain,
            max_tokens,
        }
    }

    /// Grade one ticket end to end.
    pub async fn grade_ticket(&self, ticket_id: &str) -> Result<TicketReport, RubricError> {
        info!(ticket_id, "grading ticket");

        let messages = self.helpdesk.list_messages(ticket_id).await?;
        if messages.is_empty() {
            return Err(RubricError::Internal(
                "no messages found in ticket".to_string(),
            ));
        }

        let transcript = build_transcript(&messages);
        let agents = extract_agents(&messages);
        if agents.is_empty() {
            return Err(RubricError::Internal(
                "no agents found in ticket".to_string(),
            ));
        }
        let triggers = detect_triggers(&transcript);
        debug!(
            ticket_id,
            message_count = messages.len(),
            agents = ?agents,
            triggers = ?triggers,
            "ticket context assembled"
        );

        let prompt = build_prompt(ticket_id, &agents, &triggers, &transcript);
        let request = MessageRequest {
            model: self.llm.default_model().to_string(),
            messages: vec![ApiMessage::user(prompt)],
            system: None,
            max_tokens: self.max_tokens,
        };
        let response = self.llm.complete_message(&request).await?;
        let analysis = parse_analysis(&response.text())?;
        if analysis.agents.is_empty() {
            return Err(RubricError::MalformedOutput {
                reason: "analysis contains no agents".to_string(),
                snippet: response.text().chars().take(200).collect(),
            });
        }

        let agents_total = analysis.agents.len();
        let mut saved = Vec::new();
        let mut persist_failures = 0usize;

        for agent in &analysis.agents {
            // The model occasionally invents rows for automated senders.
            if is_bot(&agent.agent_name) {
                debug!(agent = %agent.agent_name, "skipping bot agent from analysis");
                continue;
            }

            let agent_name = if agent.agent_name.is_empty() {
                "Unknown".to_string()
            } else {
                agent.agent_name.clone()
            };
            let card = score_card(&agent.scores);
            let escalation =
                agent.is_escalation_agent || is_escalation_agent(&agent_name);
            let (score, grade) = if agent.zero_tolerance_violation {
                (0.0, Grade::F)
            } else {
                let s = final_score(&card);
                (s, grade_for(s))
            };

            let evaluation = Evaluation {
                id: evaluation_id(ticket_id, &agent_name),
                ticket_id: ticket_id.to_string(),
                agent_name: agent_name.clone(),
                evaluator: EVALUATOR.to_string(),
                ticket_link: format!("https://{}/app/ticket/{ticket_id}", self.domain),
                is_escalation_agent: escalation,
                zero_tolerance_violation: agent.zero_tolerance_violation,
                violation_notes: agent.violation_notes.clone(),
                scores: card,
                final_score: score,
                grade,
                comments: agent.suggested_feedback.clone(),
                ai_reasoning: agent.overall_analysis.clone(),
                detected_triggers: triggers.clone(),
                auto_graded: true,
                created_at: now_rfc3339(),
            };
            // One agent's persistence failure must not drop the others'
            // evaluations; skip the note for the failed agent and move on.
            if let Err(e) = queries::evaluations::insert(&self.db, &evaluation).await {
                warn!(ticket_id, agent = %agent_name, error = %e, "failed to save evaluation");
                persist_failures += 1;
                continue;
            }
            info!(
                ticket_id,
                agent = %agent_name,
                score = format!("{score:.1}"),
                grade = %grade,
                "evaluation saved"
            );

            let note = note_body(&agent_name, score, grade, &agent.suggested_feedback);
            if let Err(e) = self
                .helpdesk
                .post_internal_note(ticket_id, NOTE_AUTHOR, &note)
                .await
            {
                warn!(ticket_id, agent = %agent_name, error = %e, "failed to post internal note");
            }

            saved.push(AgentResult {
                agent: agent_name,
                score,
                grade: grade.to_string(),
                feedback: agent.suggested_feedback.clone(),
            });
        }

        if saved.is_empty() {
            let reason = if persist_failures > 0 {
                "no evaluations could be persisted"
            } else {
                "analysis contained no human agents"
            };
            return Err(RubricError::Internal(reason.to_string()));
        }

        if let Err(e) = self.helpdesk.tag_ticket_graded(ticket_id).await {
            warn!(ticket_id, error = %e, "failed to tag ticket as graded");
        }

        Ok(TicketReport {
            agents_processed: saved.len(),
            agents_total,
            evaluations: saved,
        })
    }
}

fn evaluation_id(ticket_id: &str, agent_name: &str) -> String {
    let slug = agent_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!(
        "auto-{ticket_id}-{slug}-{}",
        chrono::Utc::now().timestamp_millis()
    )
}

fn note_body(agent_name: &str, score: f64, grade: Grade, feedback: &str) -> String {
    let feedback = if feedback.is_empty() {
        "No specific feedback provided."
    } else {
        feedback
    };
    format!(
        "Evaluated by {NOTE_AUTHOR}\n\n\
         Agent: {agent_name}\n\
         Score: {score:.1}%\n\
         Grade: {grade}\n\n\
         Feedback:\n{feedback}\n\n\
         This evaluation was generated automatically after ticket closure.\n\
         View full details in the QA dashboard."
    )
}
