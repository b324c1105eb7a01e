// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue worker.
//!
//! One run drains a single batch of due queue rows, sequentially. Each row
//! is claimed with a conditional update first, so overlapping runs (cron
//! firing while a manual trigger is in flight) never grade the same ticket
//! twice.

use rubric_core::RubricError;
use rubric_storage::{Database, now_rfc3339, queries};
use serde::Serialize;
use tracing::{info, warn};

use crate::pipeline::Grader;

/// Drains due grading work from the queue.
#[derive(Clone)]
pub struct Worker {
    db: Database,
    grader: Grader,
    batch_size: u32,
}

/// Outcome of one worker run, returned to the trigger caller.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    pub results: Vec<TicketOutcome>,
}

/// Per-ticket outcome within a batch.
#[derive(Debug, Clone, Serialize)]
pub struct TicketOutcome {
    pub ticket_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Worker {
    pub fn new(db: Database, grader: Grader, batch_size: u32) -> Self {
        Self {
            db,
            grader,
            batch_size,
        }
    }

    /// Process one batch of due queue rows. Returns a summary even when
    /// every ticket in the batch failed; only storage errors abort the run.
    pub async fn run_once(&self) -> Result<BatchSummary, RubricError> {
        let now = now_rfc3339();
        let items = queries::queue::due(&self.db, &now, self.batch_size).await?;
        if items.is_empty() {
            info!("no queue items due");
            return Ok(BatchSummary {
                processed: 0,
                successful: 0,
                failed: 0,
                results: Vec::new(),
            });
        }
        info!(count = items.len(), "processing due queue items");

        let mut results = Vec::with_capacity(items.len());
        for item in items {
            if !queries::queue::claim(&self.db, item.id).await? {
                // Another run got there first.
                continue;
            }

            match self.grader.grade_ticket(&item.ticket_id).await {
                Ok(report) => {
                    let mut doc = serde_json::to_value(&report).map_err(|e| {
                        RubricError::Internal(format!("serializing ticket report: {e}"))
                    })?;
                    doc["success"] = serde_json::Value::Bool(true);
                    queries::queue::complete(&self.db, item.id, &doc).await?;
                    results.push(TicketOutcome {
                        ticket_id: item.ticket_id,
                        success: true,
                        error: None,
                    });
                }
                Err(e) => {
                    warn!(ticket_id = %item.ticket_id, error = %e, "grading failed");
                    let message = e.to_string();
                    queries::queue::fail(&self.db, item.id, &message).await?;
                    results.push(TicketOutcome {
                        ticket_id: item.ticket_id,
                        success: false,
                        error: Some(message),
                    });
                }
            }
        }

        let successful = results.iter().filter(|r| r.success).count();
        let summary = BatchSummary {
            processed: results.len(),
            successful,
            failed: results.len() - successful,
            results,
        };
        info!(
            processed = summary.processed,
            successful = summary.successful,
            failed = summary.failed,
            "worker run complete"
        );
        Ok(summary)
    }
}
