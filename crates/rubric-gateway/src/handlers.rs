// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.
//!
//! Handles the ticket-closed webhook, the worker trigger, the widget
//! summary endpoint, and health.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{Duration, SecondsFormat, Utc};
use rubric_core::RubricError;
use rubric_storage::queries;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::server::GatewayState;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// Response body for POST /webhook.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Response body for GET /webhook.
#[derive(Debug, Serialize)]
pub struct WebhookStatusResponse {
    pub status: String,
    pub delay_hours: u32,
    pub timestamp: String,
}

/// Response body for the worker trigger.
#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub message: String,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<rubric_grading::worker::TicketOutcome>,
}

/// Response body for the widget summary endpoint.
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
    pub status: String,
    pub agents: Vec<AgentEntry>,
}

/// One agent line in the widget summary.
#[derive(Debug, Serialize)]
pub struct AgentEntry {
    pub name: String,
    /// Formatted percentage, e.g. "85.0%".
    pub score: String,
    pub grade: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// POST /webhook
///
/// Ticket-closed notification from the helpdesk. Extracts the ticket id,
/// confirms the ticket is closed, and enqueues it for grading after the
/// configured delay. Replays and duplicates are acknowledged with 200 and
/// a distinguishing message rather than re-queued.
pub async fn post_webhook(
    State(state): State<GatewayState>,
    Query(params): Query<HashMap<String, String>>,
    body: Option<Json<serde_json::Value>>,
) -> Response {
    let from_body = body.as_ref().and_then(|Json(v)| extract_ticket_id(v));
    let ticket_id = match from_body.or_else(|| params.get("ticket_id").cloned()) {
        Some(id) => id,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "no ticket id found in payload".to_string(),
                }),
            )
                .into_response();
        }
    };

    // Enrich from the helpdesk when configured; the webhook payload alone
    // is trusted otherwise.
    let mut status = "closed".to_string();
    let mut snapshot = serde_json::json!({ "id": ticket_id });
    if let Some(helpdesk) = &state.helpdesk {
        match helpdesk.get_ticket(&ticket_id).await {
            Ok(ticket) => {
                if let Some(s) = &ticket.status {
                    status = s.clone();
                }
                snapshot = ticket.snapshot();
            }
            Err(e) => {
                warn!(ticket_id, error = %e, "could not fetch ticket, queueing with defaults");
            }
        }
    }

    if status != "closed" {
        return (
            StatusCode::OK,
            Json(WebhookResponse {
                message: "not a closed ticket, skipping".to_string(),
                ticket_id: Some(ticket_id),
                process_at: None,
                status: Some(status),
            }),
        )
            .into_response();
    }

    let now = Utc::now();
    let since = (now - Duration::days(i64::from(state.policy.recent_window_days)))
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    match queries::evaluations::recent_exists(&state.db, &ticket_id, &since).await {
        Ok(true) => {
            return (
                StatusCode::OK,
                Json(WebhookResponse {
                    message: "ticket already graded recently".to_string(),
                    ticket_id: Some(ticket_id),
                    process_at: None,
                    status: None,
                }),
            )
                .into_response();
        }
        Ok(false) => {}
        Err(e) => return error_response(&e),
    }

    let process_at = (now + Duration::hours(i64::from(state.policy.delay_hours)))
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    match queries::queue::enqueue(&state.db, &ticket_id, &snapshot, &process_at).await {
        Ok(Some(_)) => {
            info!(ticket_id, process_at, "ticket queued for grading");
            let message = if state.policy.delay_hours > 0 {
                format!(
                    "ticket queued for grading in {} hour(s)",
                    state.policy.delay_hours
                )
            } else {
                "ticket queued for immediate grading".to_string()
            };
            (
                StatusCode::OK,
                Json(WebhookResponse {
                    message,
                    ticket_id: Some(ticket_id),
                    process_at: Some(process_at),
                    status: None,
                }),
            )
                .into_response()
        }
        Ok(None) => (
            StatusCode::OK,
            Json(WebhookResponse {
                message: "ticket already queued".to_string(),
                ticket_id: Some(ticket_id),
                process_at: None,
                status: None,
            }),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

/// GET /webhook
///
/// Verification endpoint for the helpdesk's HTTP integration setup.
pub async fn get_webhook(State(state): State<GatewayState>) -> Json<WebhookStatusResponse> {
    Json(WebhookStatusResponse {
        status: "webhook endpoint active".to_string(),
        delay_hours: state.policy.delay_hours,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// GET|POST /process
///
/// Runs one worker batch. Intended for an external scheduler; also usable
/// as a manual trigger.
pub async fn process_queue(State(state): State<GatewayState>) -> Response {
    match state.worker.run_once().await {
        Ok(summary) => {
            let message = if summary.processed == 0 {
                "no tickets to process".to_string()
            } else {
                format!("processed {} tickets", summary.processed)
            };
            (
                StatusCode::OK,
                Json(ProcessResponse {
                    message,
                    successful: summary.successful,
                    failed: summary.failed,
                    results: summary.results,
                }),
            )
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

#[derive(Debug, Deserialize)]
pub struct SummaryParams {
    #[serde(default)]
    pub ticket_id: Option<String>,
}

/// GET /evaluations
///
/// Latest evaluation per agent for a ticket, shaped for the helpdesk
/// sidebar widget. Served with permissive CORS; storage errors degrade to
/// "not_graded" so the widget never breaks the agent's view.
pub async fn get_evaluations(
    State(state): State<GatewayState>,
    Query(params): Query<SummaryParams>,
) -> Json<SummaryResponse> {
    let mut response = SummaryResponse {
        ticket_id: params.ticket_id.clone(),
        status: "not_graded".to_string(),
        agents: Vec::new(),
    };

    if let Some(ticket_id) = &params.ticket_id {
        match queries::evaluations::latest_per_agent(&state.db, ticket_id).await {
            Ok(summaries) if !summaries.is_empty() => {
                response.status = "graded".to_string();
                response.agents = summaries
                    .into_iter()
                    .map(|s| AgentEntry {
                        name: s.agent_name,
                        score: format!("{:.1}%", s.final_score),
                        grade: s.grade,
                    })
                    .collect();
            }
            Ok(_) => {}
            Err(e) => {
                warn!(ticket_id, error = %e, "evaluation summary lookup failed");
            }
        }
    }

    Json(response)
}

/// GET /health
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Pull a ticket id out of the webhook payload. The helpdesk's HTTP
/// integration sends `{"ticket_id": "123"}`, but other event shapes nest it
/// under `ticket.id` or send a bare `id`; numbers are accepted too.
fn extract_ticket_id(body: &serde_json::Value) -> Option<String> {
    for candidate in [
        body.get("ticket_id"),
        body.get("ticket").and_then(|t| t.get("id")),
        body.get("id"),
    ]
    .into_iter()
    .flatten()
    {
        match candidate {
            serde_json::Value::String(s) if !s.is_empty() => return Some(s.clone()),
            serde_json::Value::Number(n) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn error_response(e: &RubricError) -> Response {
    // Upstream failures propagate the status the helpdesk returned when one
    // was received; a malformed model reply is our failure, not upstream's.
    let status = match e {
        RubricError::Helpdesk { .. } | RubricError::Provider { .. } => e
            .upstream_status()
            .and_then(|s| StatusCode::from_u16(s).ok())
            .unwrap_or(StatusCode::BAD_GATEWAY),
        RubricError::Config(_)
        | RubricError::Storage { .. }
        | RubricError::MalformedOutput { .. }
        | RubricError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!(error = %e, "request failed");
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_propagates_upstream_status() {
        let not_found = RubricError::Helpdesk {
            message: "ticket missing".into(),
            status: Some(404),
            source: None,
        };
        assert_eq!(error_response(&not_found).status(), StatusCode::NOT_FOUND);

        // No status recorded means the upstream never answered.
        let unreachable = RubricError::Helpdesk {
            message: "connection refused".into(),
            status: None,
            source: None,
        };
        assert_eq!(
            error_response(&unreachable).status(),
            StatusCode::BAD_GATEWAY
        );

        let malformed = RubricError::MalformedOutput {
            reason: "no JSON object found".into(),
            snippet: "I refuse".into(),
        };
        assert_eq!(
            error_response(&malformed).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn extracts_ticket_id_variants() {
        assert_eq!(
            extract_ticket_id(&serde_json::json!({ "ticket_id": "123" })),
            Some("123".to_string())
        );
        assert_eq!(
            extract_ticket_id(&serde_json::json!({ "ticket": { "id": 456 } })),
            Some("456".to_string())
        );
        assert_eq!(
            extract_ticket_id(&serde_json::json!({ "id": "789" })),
            Some("789".to_string())
        );
        assert_eq!(extract_ticket_id(&serde_json::json!({ "other": 1 })), None);
        assert_eq!(extract_ticket_id(&serde_json::json!({ "ticket_id": "" })), None);
    }

    #[test]
    fn ticket_id_precedence_prefers_explicit_field() {
        let body = serde_json::json!({ "ticket_id": "1", "ticket": { "id": "2" }, "id": "3" });
        assert_eq!(extract_ticket_id(&body), Some("1".to_string()));
    }

    #[test]
    fn webhook_response_omits_empty_fields() {
        let resp = WebhookResponse {
            message: "ticket already queued".to_string(),
            ticket_id: Some("5001".to_string()),
            process_at: None,
            status: None,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("process_at").is_none());
        assert!(json.get("status").is_none());
    }
}
