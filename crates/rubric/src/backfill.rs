// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backfill: queue ungraded closed tickets from a historical window.
//!
//! Scans the helpdesk ticket list newest-first, queueing every closed
//! ticket that closed at or after the cutoff and has neither an evaluation
//! nor an active queue row. Queued rows get an immediate deadline; the
//! normal worker drains them batch by batch.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use rubric_core::RubricError;
use rubric_helpdesk::{HelpdeskClient, Ticket};
use rubric_storage::{Database, queries};
use tracing::{debug, info};

/// Outcome of a backfill run.
#[derive(Debug, Default)]
pub struct BackfillReport {
    pub pages_scanned: usize,
    pub closed_found: usize,
    pub queued: usize,
    pub skipped: usize,
}

/// Queue ungraded closed tickets whose close time is at or after `since`.
///
/// `since` accepts a date (`2026-02-01`) or an RFC 3339 timestamp. Tickets
/// closed within the last 24 hours are left to the webhook path, which is
/// still inside its grading delay for them.
pub async fn run_backfill(
    db: &Database,
    helpdesk: &HelpdeskClient,
    since: &str,
) -> Result<BackfillReport, RubricError> {
    let since = parse_since(since)?;
    let fresh_cutoff = Utc::now() - Duration::hours(24);

    let graded: HashSet<String> = queries::evaluations::graded_ticket_ids(db)
        .await?
        .into_iter()
        .collect();
    let mut queued_ids: HashSet<String> = queries::queue::active_ticket_ids(db)
        .await?
        .into_iter()
        .collect();
    info!(
        graded = graded.len(),
        queued = queued_ids.len(),
        since = %since,
        "starting backfill scan"
    );

    let mut report = BackfillReport::default();
    let mut cursor: Option<String> = None;

    loop {
        let page = helpdesk.list_tickets(cursor.as_deref()).await?;
        if page.data.is_empty() {
            break;
        }
        report.pages_scanned += 1;

        // The list is ordered by update time descending; once a whole page
        // predates the window, so does everything after it.
        let page_exhausted = page
            .data
            .last()
            .and_then(|t| parse_datetime(t.updated_datetime.as_deref()))
            .is_some_and(|updated| updated < since);

        for ticket in &page.data {
            if ticket.status.as_deref() != Some("closed") {
                continue;
            }
            let closed_at = parse_datetime(
                ticket
                    .closed_datetime
                    .as_deref()
                    .or(ticket.updated_datetime.as_deref()),
            );
            let Some(closed_at) = closed_at else {
                debug!(ticket_id = %ticket.id_string(), "skipping ticket with unparseable close time");
                continue;
            };
            if closed_at < since || closed_at > fresh_cutoff {
                continue;
            }
            report.closed_found += 1;

            let tid = ticket.id_string();
            if graded.contains(&tid) || queued_ids.contains(&tid) {
                report.skipped += 1;
                continue;
            }

            let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            if enqueue_snapshot(db, ticket, &now).await?.is_some() {
                report.queued += 1;
                queued_ids.insert(tid);
            } else {
                report.skipped += 1;
            }
        }

        if page_exhausted {
            info!("reached tickets older than the backfill window");
            break;
        }
        match page.next_cursor() {
            Some(next) => cursor = Some(next.to_string()),
            None => break,
        }
    }

    info!(
        pages = report.pages_scanned,
        closed = report.closed_found,
        queued = report.queued,
        skipped = report.skipped,
        "backfill complete"
    );
    Ok(report)
}

async fn enqueue_snapshot(
    db: &Database,
    ticket: &Ticket,
    process_at: &str,
) -> Result<Option<i64>, RubricError> {
    queries::queue::enqueue(db, &ticket.id_string(), &ticket.snapshot(), process_at).await
}

fn parse_since(value: &str) -> Result<DateTime<Utc>, RubricError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    Err(RubricError::Config(format!(
        "invalid --since value '{value}': expected YYYY-MM-DD or an RFC 3339 timestamp"
    )))
}

fn parse_datetime(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
