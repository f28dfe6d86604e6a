//! Notification dispatcher.
//!
//! Transitions in the lifecycle and shipment state machines fan out here as
//! an explicit call, not a storage trigger. Emission is best-effort from the
//! point of view of the triggering transition: a failed append is logged and
//! never rolls the transition back.

use chrono::NaiveDateTime;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository;
use crate::error::EngineError;
use crate::models::enums::NotificationKind;
use crate::models::Notification;

/// Notifications older than this are no longer surfaced as active.
pub const RETENTION_DAYS: i64 = 7;

/// Append a notification. Fails only when it addresses nobody.
pub fn emit(
    conn: &Connection,
    kind: NotificationKind,
    document_id: Option<i64>,
    user_id: Option<&Uuid>,
    message: &str,
    now: NaiveDateTime,
) -> Result<Notification, EngineError> {
    if document_id.is_none() && user_id.is_none() {
        return Err(EngineError::ValidationFailed {
            field: "target",
            reason: "notification must address a document or a user".into(),
        });
    }

    let id = repository::insert_notification(conn, document_id, user_id, &kind, message, &now)?;
    tracing::debug!(id, kind = kind.as_str(), "Notification emitted");

    Ok(Notification {
        id,
        document_id,
        user_id: user_id.copied(),
        kind,
        message: message.to_string(),
        read: false,
        created_at: now,
    })
}

/// Fire-and-forget variant used inside state transitions. A persistence
/// failure here must not fail the transition itself.
pub fn emit_best_effort(
    conn: &Connection,
    kind: NotificationKind,
    document_id: Option<i64>,
    user_id: Option<&Uuid>,
    message: &str,
    now: NaiveDateTime,
) {
    if let Err(e) = emit(conn, kind, document_id, user_id, message, now) {
        tracing::warn!(error = %e, kind = kind.as_str(), "Failed to emit notification");
    }
}

/// Mark one notification read. A second call is a no-op.
pub fn mark_read(conn: &Connection, id: i64) -> Result<(), EngineError> {
    repository::mark_notification_read(conn, id)?;
    Ok(())
}

/// Mark all of a user's notifications read. Idempotent.
pub fn mark_all_read(conn: &Connection, user_id: &Uuid) -> Result<usize, EngineError> {
    let flipped = repository::mark_all_notifications_read(conn, user_id)?;
    Ok(flipped)
}

/// Active notifications for a user: everything within the retention
/// window, newest first. Older rows are never surfaced.
pub fn active_notifications(
    conn: &Connection,
    user_id: &Uuid,
    now: NaiveDateTime,
) -> Result<Vec<Notification>, EngineError> {
    let cutoff = now - chrono::Duration::days(RETENTION_DAYS);
    let notifications = repository::list_notifications_since(conn, user_id, &cutoff)?;
    Ok(notifications)
}

/// Hard-delete notifications past the retention window. Soft policy:
/// consumers already filter by the window, this just reclaims rows.
pub fn prune_expired(conn: &Connection, now: NaiveDateTime) -> Result<usize, EngineError> {
    let cutoff = now - chrono::Duration::days(RETENTION_DAYS);
    let deleted = repository::delete_notifications_before(conn, &cutoff)?;
    if deleted > 0 {
        tracing::info!(deleted, "Pruned expired notifications");
    }
    Ok(deleted)
}
