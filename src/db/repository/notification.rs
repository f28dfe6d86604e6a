use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::NotificationKind;
use crate::models::Notification;

use super::{format_ts, parse_ts, parse_uuid_opt};

pub fn insert_notification(
    conn: &Connection,
    document_id: Option<i64>,
    user_id: Option<&Uuid>,
    kind: &NotificationKind,
    message: &str,
    created_at: &chrono::NaiveDateTime,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO notifications (document_id, user_id, kind, message, read, created_at)
         VALUES (?1, ?2, ?3, ?4, 0, ?5)",
        params![
            document_id,
            user_id.map(|id| id.to_string()),
            kind.as_str(),
            message,
            format_ts(created_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Mark one notification read. Idempotent; returns rows touched.
pub fn mark_notification_read(conn: &Connection, id: i64) -> Result<usize, DatabaseError> {
    let rows = conn.execute(
        "UPDATE notifications SET read = 1 WHERE id = ?1 AND read = 0",
        params![id],
    )?;
    Ok(rows)
}

/// Mark every unread notification for a user read. Idempotent.
pub fn mark_all_notifications_read(
    conn: &Connection,
    user_id: &Uuid,
) -> Result<usize, DatabaseError> {
    let rows = conn.execute(
        "UPDATE notifications SET read = 1 WHERE user_id = ?1 AND read = 0",
        params![user_id.to_string()],
    )?;
    Ok(rows)
}

/// Notifications for a user created at or after `cutoff`, newest first.
pub fn list_notifications_since(
    conn: &Connection,
    user_id: &Uuid,
    cutoff: &chrono::NaiveDateTime,
) -> Result<Vec<Notification>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, document_id, user_id, kind, message, read, created_at
         FROM notifications
         WHERE user_id = ?1 AND created_at >= ?2
         ORDER BY created_at DESC, id DESC",
    )?;

    let rows = stmt.query_map(params![user_id.to_string(), format_ts(cutoff)], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, Option<i64>>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, i32>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut notifications = Vec::new();
    for row in rows {
        let (id, document_id, user_id, kind, message, read, created_at) = row?;
        notifications.push(Notification {
            id,
            document_id,
            user_id: parse_uuid_opt(user_id),
            kind: NotificationKind::from_str(&kind)?,
            message,
            read: read != 0,
            created_at: parse_ts(&created_at),
        });
    }
    Ok(notifications)
}

/// All notifications attached to a document (for tests and audit views).
pub fn list_notifications_for_document(
    conn: &Connection,
    document_id: i64,
) -> Result<Vec<Notification>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, document_id, user_id, kind, message, read, created_at
         FROM notifications WHERE document_id = ?1
         ORDER BY created_at ASC, id ASC",
    )?;

    let rows = stmt.query_map(params![document_id], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, Option<i64>>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, i32>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut notifications = Vec::new();
    for row in rows {
        let (id, document_id, user_id, kind, message, read, created_at) = row?;
        notifications.push(Notification {
            id,
            document_id,
            user_id: parse_uuid_opt(user_id),
            kind: NotificationKind::from_str(&kind)?,
            message,
            read: read != 0,
            created_at: parse_ts(&created_at),
        });
    }
    Ok(notifications)
}

/// Whether a notification of the given kind already exists for a document.
/// Used to keep sweep notifications one-shot.
pub fn has_notification_of_kind(
    conn: &Connection,
    document_id: i64,
    kind: &NotificationKind,
) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM notifications WHERE document_id = ?1 AND kind = ?2",
        params![document_id, kind.as_str()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Delete notifications created before `cutoff`. Returns rows deleted.
pub fn delete_notifications_before(
    conn: &Connection,
    cutoff: &chrono::NaiveDateTime,
) -> Result<usize, DatabaseError> {
    let rows = conn.execute(
        "DELETE FROM notifications WHERE created_at < ?1",
        params![format_ts(cutoff)],
    )?;
    Ok(rows)
}
