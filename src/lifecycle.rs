//! Document lifecycle state machine.
//!
//! A routing slip moves pending → in_progress → completed, with overdue
//! entered when the due date lapses and cancelled/erroneous applied as
//! administrative actions. Completed and cancelled are terminal; leaving
//! them requires an explicit reopen policy. Every transition fans out a
//! notification to the slip's creator as an explicit, best-effort call.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rusqlite::Connection;

use crate::config;
use crate::db::repository;
use crate::error::EngineError;
use crate::models::enums::{DocumentStatus, NotificationKind, Priority};
use crate::models::{Actor, Document, NewDocument};
use crate::notify;
use crate::sla;

/// Policy knobs for the transition contract. The legacy system was
/// inconsistent about reopening terminal slips; default is strict.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionPolicy {
    pub allow_reopen: bool,
}

/// Outcome of one overdue sweep run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Documents flipped to overdue.
    pub flipped: usize,
    /// One-shot due-soon notifications emitted.
    pub due_soon: usize,
    /// Documents skipped because their individual update failed.
    pub failed: usize,
}

/// Parse an externally supplied status string.
pub fn parse_status(value: &str) -> Result<DocumentStatus, EngineError> {
    DocumentStatus::from_str(value).map_err(|_| EngineError::InvalidStatus {
        value: value.to_string(),
    })
}

/// Register a new routing slip at the intake desk.
///
/// Assigns the tracking code, writes the initial custody entry in the same
/// transaction, and notifies the creator. New slips always start pending.
pub fn register(
    conn: &Connection,
    input: &NewDocument,
    actor: &Actor,
    now: NaiveDateTime,
) -> Result<Document, EngineError> {
    if input.reference.trim().is_empty() {
        return Err(EngineError::ValidationFailed {
            field: "reference",
            reason: "reference text must not be empty".into(),
        });
    }

    let tx = conn.unchecked_transaction().map_err(crate::db::DatabaseError::from)?;

    let id = repository::next_document_id(&tx)?;
    let tracking_code = format!(
        "{}-{}-{:06}",
        config::TRACKING_CODE_PREFIX,
        now.year(),
        id
    );

    let doc = Document {
        id,
        tracking_code,
        reference: input.reference.clone(),
        origin: input.origin.clone(),
        requester_name: input.requester_name.clone(),
        requester_phone: input.requester_phone.clone(),
        document_date: input.document_date,
        page_count: input.page_count,
        notes: input.notes.clone(),
        status: DocumentStatus::Pending,
        priority: input.priority.unwrap_or(Priority::Routine),
        due_date: input.due_date,
        completed_at: None,
        current_location: config::INTAKE_LOCATION.to_string(),
        current_custodian: actor.display_name.clone(),
        extension: input.extension.clone(),
        created_by: Some(actor.id),
        version: 0,
        created_at: now,
        updated_at: now,
    };

    repository::insert_document(&tx, &doc)?;
    repository::insert_custody_entry(
        &tx,
        doc.id,
        &doc.current_location,
        &doc.current_custodian,
        None,
        Some(&actor.id),
        &now,
    )?;

    notify::emit_best_effort(
        &tx,
        NotificationKind::Created,
        Some(doc.id),
        Some(&actor.id),
        &format!("Hoja de ruta {} registered", doc.tracking_code),
        now,
    );

    tx.commit().map_err(crate::db::DatabaseError::from)?;

    tracing::info!(
        document_id = doc.id,
        tracking_code = %doc.tracking_code,
        actor = %actor.display_name,
        "Routing slip registered"
    );
    Ok(doc)
}

/// Apply a status transition to a document.
///
/// Re-applying the current status is a no-op, not an error. Leaving a
/// terminal status fails with `InvalidTransition` unless the policy allows
/// reopening. Returns the updated record and a confirmation message.
pub fn advance(
    conn: &Connection,
    document_id: i64,
    target: DocumentStatus,
    actor: &Actor,
    detail: Option<&str>,
    policy: &TransitionPolicy,
    now: NaiveDateTime,
) -> Result<(Document, String), EngineError> {
    let tx = conn.unchecked_transaction().map_err(crate::db::DatabaseError::from)?;

    let mut doc = repository::get_document(&tx, document_id)?
        .ok_or_else(|| EngineError::document_not_found(document_id))?;

    if doc.status == target {
        // Idempotent re-application: no update, no notification.
        let message = format!(
            "Hoja de ruta {} is already {}",
            doc.tracking_code,
            target.as_str()
        );
        return Ok((doc, message));
    }

    if doc.status.is_terminal() && !policy.allow_reopen {
        return Err(EngineError::InvalidTransition {
            from: doc.status.as_str(),
            to: target.as_str(),
        });
    }

    let completed_at = match target {
        DocumentStatus::Completed => Some(now),
        // Leaving completed (reopen) clears the completion timestamp.
        _ if doc.status == DocumentStatus::Completed => None,
        _ => doc.completed_at,
    };

    let rows = repository::update_lifecycle_fields(
        &tx,
        doc.id,
        &target,
        completed_at.as_ref(),
        &now,
        doc.version,
    )?;
    if rows == 0 {
        return Err(EngineError::ConcurrentModification { id: doc.id });
    }

    let previous = doc.status;
    doc.status = target;
    doc.completed_at = completed_at;
    doc.updated_at = now;
    doc.version += 1;

    let kind = if target == DocumentStatus::Completed {
        NotificationKind::Completed
    } else {
        NotificationKind::StatusChanged
    };
    let mut message = format!(
        "Hoja de ruta {} moved from {} to {} by {}",
        doc.tracking_code,
        previous.as_str(),
        target.as_str(),
        actor.display_name
    );
    if let Some(detail) = detail {
        message.push_str(&format!(": {detail}"));
    }
    notify::emit_best_effort(&tx, kind, Some(doc.id), doc.created_by.as_ref(), &message, now);

    tx.commit().map_err(crate::db::DatabaseError::from)?;

    tracing::info!(
        document_id = doc.id,
        from = previous.as_str(),
        to = target.as_str(),
        "Status transition applied"
    );
    Ok((doc, message))
}

/// Flip a pending parent document to in_progress when a shipment tied to
/// it is dispatched. One-directional coupling: delivery and cancellation
/// never touch the parent.
pub(crate) fn nudge_in_progress(
    conn: &Connection,
    document_id: i64,
    now: NaiveDateTime,
) -> Result<(), EngineError> {
    let doc = repository::get_document(conn, document_id)?
        .ok_or_else(|| EngineError::document_not_found(document_id))?;

    if doc.status != DocumentStatus::Pending {
        return Ok(());
    }

    let rows = repository::update_lifecycle_fields(
        conn,
        doc.id,
        &DocumentStatus::InProgress,
        None,
        &now,
        doc.version,
    )?;
    if rows == 0 {
        return Err(EngineError::ConcurrentModification { id: doc.id });
    }

    notify::emit_best_effort(
        conn,
        NotificationKind::StatusChanged,
        Some(doc.id),
        doc.created_by.as_ref(),
        &format!(
            "Hoja de ruta {} moved to in_progress after dispatch",
            doc.tracking_code
        ),
        now,
    );
    tracing::debug!(document_id = doc.id, "Pending document nudged to in_progress");
    Ok(())
}

/// Scheduled sweep: flip pending/in_progress documents whose due date has
/// lapsed into overdue, and emit one-shot due-soon notifications for
/// documents entering the critical window. Per-document failures are
/// isolated so one bad row never aborts the sweep.
pub fn sweep_overdue(
    conn: &Connection,
    today: NaiveDate,
    now: NaiveDateTime,
) -> Result<SweepOutcome, EngineError> {
    let mut outcome = SweepOutcome::default();

    let candidates = sweep_candidates(conn)?;
    for doc in candidates {
        let days = match sla::days_until_due(doc.due_date, today) {
            Some(d) => d,
            None => continue,
        };

        if days < 0 {
            match flip_overdue(conn, &doc, now) {
                Ok(()) => outcome.flipped += 1,
                Err(e) => {
                    outcome.failed += 1;
                    tracing::warn!(document_id = doc.id, error = %e, "Overdue flip failed");
                }
            }
        } else if days <= sla::CRITICAL_WINDOW_DAYS {
            match emit_due_soon_once(conn, &doc, days, now) {
                Ok(true) => outcome.due_soon += 1,
                Ok(false) => {}
                Err(e) => {
                    outcome.failed += 1;
                    tracing::warn!(document_id = doc.id, error = %e, "Due-soon check failed");
                }
            }
        }
    }

    tracing::info!(
        flipped = outcome.flipped,
        due_soon = outcome.due_soon,
        failed = outcome.failed,
        "Overdue sweep finished"
    );
    Ok(outcome)
}

fn sweep_candidates(conn: &Connection) -> Result<Vec<Document>, EngineError> {
    let mut candidates = Vec::new();
    for status in [DocumentStatus::Pending, DocumentStatus::InProgress] {
        let filter = crate::models::filters::DocumentFilter {
            status: Some(status),
            ..Default::default()
        };
        candidates.extend(repository::list_documents(conn, &filter)?);
    }
    Ok(candidates)
}

fn flip_overdue(conn: &Connection, doc: &Document, now: NaiveDateTime) -> Result<(), EngineError> {
    let rows = repository::update_lifecycle_fields(
        conn,
        doc.id,
        &DocumentStatus::Overdue,
        None,
        &now,
        doc.version,
    )?;
    if rows == 0 {
        return Err(EngineError::ConcurrentModification { id: doc.id });
    }

    if !repository::has_notification_of_kind(conn, doc.id, &NotificationKind::Overdue)? {
        notify::emit_best_effort(
            conn,
            NotificationKind::Overdue,
            Some(doc.id),
            doc.created_by.as_ref(),
            &format!("Hoja de ruta {} is overdue", doc.tracking_code),
            now,
        );
    }
    Ok(())
}

fn emit_due_soon_once(
    conn: &Connection,
    doc: &Document,
    days: i64,
    now: NaiveDateTime,
) -> Result<bool, EngineError> {
    if repository::has_notification_of_kind(conn, doc.id, &NotificationKind::DueSoon)? {
        return Ok(false);
    }
    notify::emit_best_effort(
        conn,
        NotificationKind::DueSoon,
        Some(doc.id),
        doc.created_by.as_ref(),
        &format!(
            "Hoja de ruta {} is due in {} day(s)",
            doc.tracking_code, days
        ),
        now,
    );
    Ok(true)
}
