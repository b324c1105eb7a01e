// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Grading queue operations.
//!
//! Enqueue is an atomic insert-if-absent: the partial unique index on
//! active rows means a second webhook for the same ticket cannot create a
//! duplicate, with no check-then-insert window.

use rubric_core::RubricError;
use rubric_core::types::{QueueItem, QueueStatus};
use rusqlite::params;

use crate::database::{Database, map_tr_err, now_rfc3339};

const ITEM_COLUMNS: &str =
    "id, ticket_id, ticket_data, status, process_at, result, created_at, processed_at";

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<QueueItem> {
    let ticket_data: String = row.get(2)?;
    let status: String = row.get(3)?;
    let result: Option<String> = row.get(5)?;
    let status = status.parse::<QueueStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(QueueItem {
        id: row.get(0)?,
        ticket_id: row.get(1)?,
        ticket_data: serde_json::from_str(&ticket_data).unwrap_or(serde_json::Value::Null),
        status,
        process_at: row.get(4)?,
        result: result.and_then(|s| serde_json::from_str(&s).ok()),
        created_at: row.get(6)?,
        processed_at: row.get(7)?,
    })
}

/// Insert a pending row for `ticket_id` unless an active row already exists.
///
/// Returns the new row id, or `None` when the ticket already has a
/// `pending`/`processing` row (the insert is silently ignored by the
/// partial unique index).
pub async fn enqueue(
    db: &Database,
    ticket_id: &str,
    ticket_data: &serde_json::Value,
    process_at: &str,
) -> Result<Option<i64>, RubricError> {
    let ticket_id = ticket_id.to_string();
    let ticket_data = ticket_data.to_string();
    let process_at = process_at.to_string();
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO grading_queue (ticket_id, ticket_data, status, process_at, created_at)
                 VALUES (?1, ?2, 'pending', ?3, ?4)",
                params![ticket_id, ticket_data, process_at, now_rfc3339()],
            )?;
            if inserted == 0 {
                Ok(None)
            } else {
                Ok(Some(conn.last_insert_rowid()))
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch up to `limit` pending rows whose `process_at` has passed, oldest
/// deadline first.
pub async fn due(db: &Database, now: &str, limit: u32) -> Result<Vec<QueueItem>, RubricError> {
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ITEM_COLUMNS} FROM grading_queue
                 WHERE status = 'pending' AND process_at <= ?1
                 ORDER BY process_at ASC
                 LIMIT ?2"
            ))?;
            let items = stmt
                .query_map(params![now, limit], row_to_item)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(items)
        })
        .await
        .map_err(map_tr_err)
}

/// Claim a pending row for processing.
///
/// Conditional update: returns `false` when the row was already claimed by
/// an overlapping worker run (or is no longer pending), so the caller must
/// skip it.
pub async fn claim(db: &Database, id: i64) -> Result<bool, RubricError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE grading_queue SET status = 'processing'
                 WHERE id = ?1 AND status = 'pending'",
                params![id],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// Mark a row completed and attach the pipeline's result document.
pub async fn complete(
    db: &Database,
    id: i64,
    result: &serde_json::Value,
) -> Result<(), RubricError> {
    finish(db, id, QueueStatus::Completed, result.clone()).await
}

/// Mark a row failed with a descriptive error. Failed rows are terminal;
/// there is no automatic retry.
pub async fn fail(db: &Database, id: i64, error: &str) -> Result<(), RubricError> {
    let result = serde_json::json!({ "success": false, "error": error });
    finish(db, id, QueueStatus::Failed, result).await
}

async fn finish(
    db: &Database,
    id: i64,
    status: QueueStatus,
    result: serde_json::Value,
) -> Result<(), RubricError> {
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE grading_queue
                 SET status = ?1, result = ?2, processed_at = ?3
                 WHERE id = ?4",
                params![status, result.to_string(), now_rfc3339(), id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch a single row by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<QueueItem>, RubricError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ITEM_COLUMNS} FROM grading_queue WHERE id = ?1"
            ))?;
            let item = stmt.query_row(params![id], row_to_item);
            match item {
                Ok(item) => Ok(Some(item)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Ticket ids with an active (`pending`/`processing`) row. Used by backfill
/// to avoid re-queueing.
pub async fn active_ticket_ids(db: &Database) -> Result<Vec<String>, RubricError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT DISTINCT ticket_id FROM grading_queue
                 WHERE status IN ('pending', 'processing')",
            )?;
            let ids = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ids)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete terminal (`completed`/`failed`) rows processed before `cutoff`.
/// Returns the number of rows removed. The core workflow never deletes
/// queue rows; only this maintenance path does.
pub async fn prune_terminal(db: &Database, cutoff: &str) -> Result<usize, RubricError> {
    let cutoff = cutoff.to_string();
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM grading_queue
                 WHERE status IN ('completed', 'failed') AND processed_at < ?1",
                params![cutoff],
            )?;
            Ok(deleted)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn snapshot(ticket_id: &str) -> serde_json::Value {
        serde_json::json!({ "id": ticket_id, "subject": "Return request", "status": "closed" })
    }

    #[tokio::test]
    async fn enqueue_is_insert_if_absent() {
        let (db, _dir) = setup_db().await;

        let first = enqueue(&db, "5001", &snapshot("5001"), "2026-01-01T00:00:00.000Z")
            .await
            .unwrap();
        assert!(first.is_some());

        // Second enqueue for the same ticket is a no-op while a row is active.
        let second = enqueue(&db, "5001", &snapshot("5001"), "2026-01-02T00:00:00.000Z")
            .await
            .unwrap();
        assert!(second.is_none());

        // A different ticket is unaffected.
        let other = enqueue(&db, "5002", &snapshot("5002"), "2026-01-01T00:00:00.000Z")
            .await
            .unwrap();
        assert!(other.is_some());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn completed_ticket_can_be_requeued() {
        let (db, _dir) = setup_db().await;

        let id = enqueue(&db, "5001", &snapshot("5001"), "2026-01-01T00:00:00.000Z")
            .await
            .unwrap()
            .unwrap();
        assert!(claim(&db, id).await.unwrap());
        complete(&db, id, &serde_json::json!({ "success": true }))
            .await
            .unwrap();

        // The partial index only covers active rows, so a fresh enqueue works.
        let again = enqueue(&db, "5001", &snapshot("5001"), "2026-01-05T00:00:00.000Z")
            .await
            .unwrap();
        assert!(again.is_some());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn due_filters_by_deadline_and_orders_ascending() {
        let (db, _dir) = setup_db().await;

        enqueue(&db, "late", &snapshot("late"), "2026-03-01T00:00:00.000Z")
            .await
            .unwrap();
        enqueue(&db, "early", &snapshot("early"), "2026-01-01T00:00:00.000Z")
            .await
            .unwrap();
        enqueue(&db, "future", &snapshot("future"), "2099-01-01T00:00:00.000Z")
            .await
            .unwrap();

        let items = due(&db, "2026-06-01T00:00:00.000Z", 10).await.unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.ticket_id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late"]);

        // Before any deadline has passed, nothing is due.
        let none = due(&db, "2025-01-01T00:00:00.000Z", 10).await.unwrap();
        assert!(none.is_empty());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn due_respects_limit() {
        let (db, _dir) = setup_db().await;
        for n in 0..15 {
            let tid = format!("t{n}");
            enqueue(&db, &tid, &snapshot(&tid), "2026-01-01T00:00:00.000Z")
                .await
                .unwrap();
        }
        let items = due(&db, "2026-06-01T00:00:00.000Z", 10).await.unwrap();
        assert_eq!(items.len(), 10);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn claim_succeeds_exactly_once() {
        let (db, _dir) = setup_db().await;
        let id = enqueue(&db, "5001", &snapshot("5001"), "2026-01-01T00:00:00.000Z")
            .await
            .unwrap()
            .unwrap();

        assert!(claim(&db, id).await.unwrap());
        // Overlapping worker run loses the conditional update.
        assert!(!claim(&db, id).await.unwrap());

        let item = get(&db, id).await.unwrap().unwrap();
        assert_eq!(item.status, QueueStatus::Processing);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn fail_records_error_and_is_terminal() {
        let (db, _dir) = setup_db().await;
        let id = enqueue(&db, "5001", &snapshot("5001"), "2026-01-01T00:00:00.000Z")
            .await
            .unwrap()
            .unwrap();
        claim(&db, id).await.unwrap();
        fail(&db, id, "No agents found in ticket").await.unwrap();

        let item = get(&db, id).await.unwrap().unwrap();
        assert_eq!(item.status, QueueStatus::Failed);
        assert!(item.processed_at.is_some());
        let result = item.result.unwrap();
        assert_eq!(result["success"], false);
        assert_eq!(result["error"], "No agents found in ticket");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn prune_removes_only_old_terminal_rows() {
        let (db, _dir) = setup_db().await;

        let done = enqueue(&db, "done", &snapshot("done"), "2026-01-01T00:00:00.000Z")
            .await
            .unwrap()
            .unwrap();
        claim(&db, done).await.unwrap();
        complete(&db, done, &serde_json::json!({ "success": true }))
            .await
            .unwrap();

        enqueue(&db, "open", &snapshot("open"), "2026-01-01T00:00:00.000Z")
            .await
            .unwrap();

        // Cutoff in the far future removes the terminal row only.
        let deleted = prune_terminal(&db, "2099-01-01T00:00:00.000Z").await.unwrap();
        assert_eq!(deleted, 1);

        let active = active_ticket_ids(&db).await.unwrap();
        assert_eq!(active, vec!["open".to_string()]);

        db.close().await.unwrap();
    }
}
