//! Dashboard aggregator.
//!
//! Read-side projection over the current document set. Every call
//! recomputes from the store, so the dashboard never lags behind the last
//! mutation. Each row is read in a single statement and aggregation never
//! sees a half-updated record.

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::db::repository::document::{document_from_row, document_row, DOCUMENT_COLUMNS};
use crate::db::DatabaseError;
use crate::error::EngineError;
use crate::models::enums::{DocumentStatus, Urgency};
use crate::models::Document;
use crate::sla;

/// Records with more than this many days of slack are left off the task
/// list (documents without a due date are still included, at the bottom).
pub const TASK_HORIZON_DAYS: i64 = 30;

/// Counts partitioned by lifecycle status, plus the at-risk total.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: u32,
    pub pending: u32,
    pub in_progress: u32,
    pub completed: u32,
    pub overdue: u32,
    pub cancelled: u32,
    pub erroneous: u32,
    /// Non-terminal records whose derived urgency is critical or overdue.
    pub critical_count: u32,
}

/// One row of the prioritized task list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEntry {
    pub document: Document,
    pub days_until_due: Option<i64>,
    pub urgency: Urgency,
}

/// Counts by status plus the derived at-risk count.
pub fn counts(conn: &Connection, today: NaiveDate) -> Result<StatusCounts, EngineError> {
    let count = |status: &DocumentStatus| -> Result<u32, DatabaseError> {
        conn.query_row(
            "SELECT COUNT(*) FROM documents WHERE status = ?1",
            params![status.as_str()],
            |row| row.get(0),
        )
        .map_err(DatabaseError::from)
    };

    let total: u32 = conn
        .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
        .map_err(DatabaseError::from)?;

    let critical_count = active_documents(conn)?
        .iter()
        .filter(|doc| {
            matches!(
                sla::urgency_for(doc.due_date, &doc.status, today),
                Urgency::Critical | Urgency::Overdue
            )
        })
        .count() as u32;

    Ok(StatusCounts {
        total,
        pending: count(&DocumentStatus::Pending)?,
        in_progress: count(&DocumentStatus::InProgress)?,
        completed: count(&DocumentStatus::Completed)?,
        overdue: count(&DocumentStatus::Overdue)?,
        cancelled: count(&DocumentStatus::Cancelled)?,
        erroneous: count(&DocumentStatus::Erroneous)?,
        critical_count,
    })
}

/// Most recently created non-terminal documents.
pub fn recent_active(conn: &Connection, limit: usize) -> Result<Vec<Document>, EngineError> {
    let sql = format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents
         WHERE status NOT IN ('completed', 'cancelled')
         ORDER BY created_at DESC, id DESC LIMIT ?1"
    );
    let mut stmt = conn.prepare(&sql).map_err(DatabaseError::from)?;
    let rows = stmt
        .query_map(params![limit as i64], document_row)
        .map_err(DatabaseError::from)?;

    let mut docs = Vec::new();
    for row in rows {
        docs.push(document_from_row(row.map_err(DatabaseError::from)?)?);
    }
    Ok(docs)
}

/// Prioritized task list: most pressing first.
///
/// Ordering is urgency tier, then ascending days-remaining, then priority.
/// Documents without a due date rank at the lowest tier rather than being
/// excluded; anything with more than 30 days of slack is dropped.
pub fn tasks_due(
    conn: &Connection,
    limit: usize,
    today: NaiveDate,
) -> Result<Vec<TaskEntry>, EngineError> {
    let mut tasks: Vec<TaskEntry> = active_documents(conn)?
        .into_iter()
        .filter_map(|doc| {
            let days = sla::days_until_due(doc.due_date, today);
            if matches!(days, Some(d) if d > TASK_HORIZON_DAYS) {
                return None;
            }
            let urgency = sla::classify(days, &doc.status);
            Some(TaskEntry {
                document: doc,
                days_until_due: days,
                urgency,
            })
        })
        .collect();

    tasks.sort_by_key(|t| {
        (
            t.urgency.rank(),
            t.days_until_due.unwrap_or(i64::MAX),
            t.document.priority.rank(),
        )
    });
    tasks.truncate(limit);
    Ok(tasks)
}

/// All non-terminal documents, each row from a single snapshot read.
fn active_documents(conn: &Connection) -> Result<Vec<Document>, EngineError> {
    let sql = format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents
         WHERE status NOT IN ('completed', 'cancelled')"
    );
    let mut stmt = conn.prepare(&sql).map_err(DatabaseError::from)?;
    let rows = stmt.query_map([], document_row).map_err(DatabaseError::from)?;

    let mut docs = Vec::new();
    for row in rows {
        docs.push(document_from_row(row.map_err(DatabaseError::from)?)?);
    }
    Ok(docs)
}
