//! Shipment (envío) sub-workflow.
//!
//! A shipment is a dispatch attempt of a document (or a standalone item)
//! to a recipient/destination, with its own small state machine:
//! registered → dispatched → delivered, cancellable from any non-terminal
//! state. Reaching dispatched nudges a still-pending parent document to
//! in_progress; delivery and cancellation never touch the parent.

use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::db::repository;
use crate::error::EngineError;
use crate::lifecycle;
use crate::models::enums::ShipmentStatus;
use crate::models::filters::ShipmentFilter;
use crate::models::{Actor, NewShipment, Shipment};

/// Parse an externally supplied shipment status string.
pub fn parse_shipment_status(value: &str) -> Result<ShipmentStatus, EngineError> {
    ShipmentStatus::from_str(value).map_err(|_| EngineError::InvalidState {
        value: value.to_string(),
    })
}

/// Register a new shipment.
///
/// `auto_dispatch` starts it at dispatched with `dispatched_at = now`
/// (counter dispatch), which also nudges a pending parent document.
pub fn create_shipment(
    conn: &Connection,
    input: &NewShipment,
    actor: &Actor,
    now: NaiveDateTime,
) -> Result<Shipment, EngineError> {
    if input.recipient_name.trim().is_empty() {
        return Err(EngineError::ValidationFailed {
            field: "recipient_name",
            reason: "recipient name must not be empty".into(),
        });
    }

    let tx = conn
        .unchecked_transaction()
        .map_err(crate::db::DatabaseError::from)?;

    if let Some(dest_id) = input.destination_id {
        if !repository::destination_exists(&tx, dest_id)? {
            return Err(EngineError::destination_not_found(dest_id));
        }
    }
    if let Some(document_id) = input.document_id {
        if repository::get_document(&tx, document_id)?.is_none() {
            return Err(EngineError::document_not_found(document_id));
        }
    }

    let (status, dispatched_at) = if input.auto_dispatch {
        (ShipmentStatus::Dispatched, Some(now))
    } else {
        (ShipmentStatus::Registered, None)
    };

    let mut shipment = Shipment {
        id: 0,
        document_id: input.document_id,
        recipient_name: input.recipient_name.clone(),
        recipient_email: input.recipient_email.clone(),
        recipient_phone: input.recipient_phone.clone(),
        destination_id: input.destination_id,
        attachments: input.attachments.clone(),
        comments: input.comments.clone(),
        status,
        dispatched_at,
        delivered_at: None,
        created_by: Some(actor.id),
        created_at: now,
    };
    shipment.id = repository::insert_shipment(&tx, &shipment)?;

    if status == ShipmentStatus::Dispatched {
        if let Some(document_id) = shipment.document_id {
            lifecycle::nudge_in_progress(&tx, document_id, now)?;
        }
    }

    tx.commit().map_err(crate::db::DatabaseError::from)?;

    tracing::info!(
        shipment_id = shipment.id,
        recipient = %shipment.recipient_name,
        status = shipment.status.as_str(),
        "Shipment created"
    );
    Ok(shipment)
}

/// Apply a status transition to a shipment.
///
/// Transitions are monotonic except cancellation. Delivering a shipment
/// that was never marked dispatched backfills `dispatched_at` first: an
/// item must have been sent before it can arrive. Cancellation preserves
/// earlier timestamps for the audit trail.
pub fn advance_shipment(
    conn: &Connection,
    shipment_id: i64,
    target: ShipmentStatus,
    delivered_at: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> Result<Shipment, EngineError> {
    let tx = conn
        .unchecked_transaction()
        .map_err(crate::db::DatabaseError::from)?;

    let mut shipment = repository::get_shipment(&tx, shipment_id)?
        .ok_or_else(|| EngineError::shipment_not_found(shipment_id))?;

    if shipment.status == target {
        // Idempotent re-application is a no-op.
        return Ok(shipment);
    }

    if shipment.status.is_terminal() {
        return Err(EngineError::InvalidTransition {
            from: shipment.status.as_str(),
            to: target.as_str(),
        });
    }

    match target {
        ShipmentStatus::Registered => {
            // Backward move; the workflow is monotonic.
            return Err(EngineError::InvalidTransition {
                from: shipment.status.as_str(),
                to: target.as_str(),
            });
        }
        ShipmentStatus::Dispatched => {
            shipment.dispatched_at.get_or_insert(now);
        }
        ShipmentStatus::Delivered => {
            let delivered = delivered_at.unwrap_or(now);
            // Must have been sent before delivered.
            shipment.dispatched_at.get_or_insert(delivered);
            shipment.delivered_at = Some(delivered);
        }
        ShipmentStatus::Cancelled => {
            // Timestamps stay untouched.
        }
    }

    let previous = shipment.status;
    shipment.status = target;

    repository::update_shipment_status(
        &tx,
        shipment.id,
        &shipment.status,
        shipment.dispatched_at.as_ref(),
        shipment.delivered_at.as_ref(),
    )?;

    if target == ShipmentStatus::Dispatched {
        if let Some(document_id) = shipment.document_id {
            lifecycle::nudge_in_progress(&tx, document_id, now)?;
        }
    }

    tx.commit().map_err(crate::db::DatabaseError::from)?;

    tracing::info!(
        shipment_id = shipment.id,
        from = previous.as_str(),
        to = target.as_str(),
        "Shipment transition applied"
    );
    Ok(shipment)
}

/// List shipments, optionally scoped to one document or status.
pub fn list_shipments(
    conn: &Connection,
    filter: &ShipmentFilter,
) -> Result<Vec<Shipment>, EngineError> {
    let shipments = repository::list_shipments(conn, filter)?;
    Ok(shipments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::{DestinationCategory, DocumentStatus};
    use crate::models::{AttachmentMeta, NewDocument};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn clerk() -> Actor {
        Actor::new(Uuid::new_v4(), "Ana Quispe")
    }

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 16)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap()
    }

    fn dispatch_form(recipient: &str) -> NewShipment {
        NewShipment {
            recipient_name: recipient.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn standalone_auto_dispatch_starts_dispatched() {
        let conn = open_memory_database().unwrap();
        let mut input = dispatch_form("Dirección Legal");
        input.auto_dispatch = true;

        let shipment = create_shipment(&conn, &input, &clerk(), fixed_now()).unwrap();
        assert_eq!(shipment.status, ShipmentStatus::Dispatched);
        assert_eq!(shipment.dispatched_at, Some(fixed_now()));
        assert!(shipment.delivered_at.is_none());
        assert!(shipment.document_id.is_none());
    }

    #[test]
    fn empty_recipient_name_is_rejected() {
        let conn = open_memory_database().unwrap();
        let result = create_shipment(&conn, &dispatch_form("  "), &clerk(), fixed_now());
        assert!(matches!(
            result,
            Err(EngineError::ValidationFailed { field: "recipient_name", .. })
        ));
    }

    #[test]
    fn unknown_destination_is_rejected() {
        let conn = open_memory_database().unwrap();
        let mut input = dispatch_form("Dirección Legal");
        input.destination_id = Some(404);
        let result = create_shipment(&conn, &input, &clerk(), fixed_now());
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
    }

    #[test]
    fn attachments_round_trip_as_ordered_metadata() {
        let conn = open_memory_database().unwrap();
        let mut input = dispatch_form("Unidad de Archivo");
        input.attachments = vec![
            AttachmentMeta {
                name: "informe.pdf".into(),
                size: 128_000,
                mime_type: "application/pdf".into(),
            },
            AttachmentMeta {
                name: "anexo.jpg".into(),
                size: 42_000,
                mime_type: "image/jpeg".into(),
            },
        ];

        let shipment = create_shipment(&conn, &input, &clerk(), fixed_now()).unwrap();
        let stored = repository::get_shipment(&conn, shipment.id).unwrap().unwrap();
        assert_eq!(stored.attachments, input.attachments);
    }

    #[test]
    fn registered_to_dispatched_sets_timestamp() {
        let conn = open_memory_database().unwrap();
        let shipment =
            create_shipment(&conn, &dispatch_form("Notaría 2"), &clerk(), fixed_now()).unwrap();
        assert_eq!(shipment.status, ShipmentStatus::Registered);
        assert!(shipment.dispatched_at.is_none());

        let later = fixed_now() + chrono::Duration::hours(1);
        let dispatched =
            advance_shipment(&conn, shipment.id, ShipmentStatus::Dispatched, None, later).unwrap();
        assert_eq!(dispatched.dispatched_at, Some(later));

        // Re-applying dispatched keeps the original timestamp
        let again = advance_shipment(
            &conn,
            shipment.id,
            ShipmentStatus::Dispatched,
            None,
            later + chrono::Duration::hours(1),
        )
        .unwrap();
        assert_eq!(again.dispatched_at, Some(later));
    }

    #[test]
    fn direct_delivery_backfills_dispatched_at() {
        let conn = open_memory_database().unwrap();
        let shipment =
            create_shipment(&conn, &dispatch_form("Notaría 2"), &clerk(), fixed_now()).unwrap();

        let delivered =
            advance_shipment(&conn, shipment.id, ShipmentStatus::Delivered, None, fixed_now())
                .unwrap();
        assert_eq!(delivered.status, ShipmentStatus::Delivered);
        // dispatched_at never left null: backfilled to the delivery time
        assert_eq!(delivered.dispatched_at, delivered.delivered_at);
        assert!(delivered.dispatched_at.is_some());
    }

    #[test]
    fn delivered_implies_dispatched_at_for_all_paths() {
        let conn = open_memory_database().unwrap();
        for auto in [false, true] {
            let mut input = dispatch_form("Receptor");
            input.auto_dispatch = auto;
            let shipment = create_shipment(&conn, &input, &clerk(), fixed_now()).unwrap();
            let delivered = advance_shipment(
                &conn,
                shipment.id,
                ShipmentStatus::Delivered,
                None,
                fixed_now() + chrono::Duration::hours(2),
            )
            .unwrap();
            assert!(delivered.dispatched_at.is_some());
        }
    }

    #[test]
    fn cancellation_preserves_audit_timestamps() {
        let conn = open_memory_database().unwrap();
        let mut input = dispatch_form("Receptor");
        input.auto_dispatch = true;
        let shipment = create_shipment(&conn, &input, &clerk(), fixed_now()).unwrap();

        let cancelled = advance_shipment(
            &conn,
            shipment.id,
            ShipmentStatus::Cancelled,
            None,
            fixed_now() + chrono::Duration::hours(3),
        )
        .unwrap();
        assert_eq!(cancelled.status, ShipmentStatus::Cancelled);
        assert_eq!(cancelled.dispatched_at, Some(fixed_now()));
    }

    #[test]
    fn terminal_shipments_reject_further_transitions() {
        let conn = open_memory_database().unwrap();
        let shipment =
            create_shipment(&conn, &dispatch_form("Receptor"), &clerk(), fixed_now()).unwrap();
        advance_shipment(&conn, shipment.id, ShipmentStatus::Cancelled, None, fixed_now()).unwrap();

        let result =
            advance_shipment(&conn, shipment.id, ShipmentStatus::Dispatched, None, fixed_now());
        assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
    }

    #[test]
    fn backward_move_to_registered_is_rejected() {
        let conn = open_memory_database().unwrap();
        let mut input = dispatch_form("Receptor");
        input.auto_dispatch = true;
        let shipment = create_shipment(&conn, &input, &clerk(), fixed_now()).unwrap();

        let result =
            advance_shipment(&conn, shipment.id, ShipmentStatus::Registered, None, fixed_now());
        assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
    }

    #[test]
    fn unknown_shipment_is_not_found() {
        let conn = open_memory_database().unwrap();
        let result = advance_shipment(&conn, 404, ShipmentStatus::Dispatched, None, fixed_now());
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
    }

    #[test]
    fn parse_shipment_status_rejects_unknown_values() {
        assert!(matches!(
            parse_shipment_status("lost"),
            Err(EngineError::InvalidState { .. })
        ));
        assert_eq!(
            parse_shipment_status("delivered").unwrap(),
            ShipmentStatus::Delivered
        );
    }

    #[test]
    fn dispatch_nudges_pending_parent_document() {
        let conn = open_memory_database().unwrap();
        let actor = clerk();
        let doc = crate::lifecycle::register(
            &conn,
            &NewDocument {
                reference: "Expediente".to_string(),
                ..Default::default()
            },
            &actor,
            fixed_now(),
        )
        .unwrap();

        let mut input = dispatch_form("Dirección Legal");
        input.document_id = Some(doc.id);
        let shipment = create_shipment(&conn, &input, &actor, fixed_now()).unwrap();

        // Still registered: parent untouched
        let parent = repository::get_document(&conn, doc.id).unwrap().unwrap();
        assert_eq!(parent.status, DocumentStatus::Pending);

        advance_shipment(&conn, shipment.id, ShipmentStatus::Dispatched, None, fixed_now())
            .unwrap();
        let parent = repository::get_document(&conn, doc.id).unwrap().unwrap();
        assert_eq!(parent.status, DocumentStatus::InProgress);

        // Delivery does not complete the parent
        advance_shipment(&conn, shipment.id, ShipmentStatus::Delivered, None, fixed_now())
            .unwrap();
        let parent = repository::get_document(&conn, doc.id).unwrap().unwrap();
        assert_eq!(parent.status, DocumentStatus::InProgress);
    }

    #[test]
    fn auto_dispatch_nudges_parent_at_creation() {
        let conn = open_memory_database().unwrap();
        let actor = clerk();
        let doc = crate::lifecycle::register(
            &conn,
            &NewDocument {
                reference: "Expediente".to_string(),
                ..Default::default()
            },
            &actor,
            fixed_now(),
        )
        .unwrap();

        let mut input = dispatch_form("Dirección Legal");
        input.document_id = Some(doc.id);
        input.auto_dispatch = true;
        create_shipment(&conn, &input, &actor, fixed_now()).unwrap();

        let parent = repository::get_document(&conn, doc.id).unwrap().unwrap();
        assert_eq!(parent.status, DocumentStatus::InProgress);
    }

    #[test]
    fn document_may_hold_several_in_flight_shipments() {
        let conn = open_memory_database().unwrap();
        let actor = clerk();
        let doc = crate::lifecycle::register(
            &conn,
            &NewDocument {
                reference: "Expediente".to_string(),
                ..Default::default()
            },
            &actor,
            fixed_now(),
        )
        .unwrap();

        for recipient in ["Receptor A", "Receptor B"] {
            let mut input = dispatch_form(recipient);
            input.document_id = Some(doc.id);
            input.auto_dispatch = true;
            create_shipment(&conn, &input, &actor, fixed_now()).unwrap();
        }

        let in_flight = list_shipments(
            &conn,
            &ShipmentFilter {
                document_id: Some(doc.id),
                status: Some(ShipmentStatus::Dispatched),
            },
        )
        .unwrap();
        assert_eq!(in_flight.len(), 2);
    }

    #[test]
    fn list_shipments_scoped_to_document() {
        let conn = open_memory_database().unwrap();
        let actor = clerk();
        let doc = crate::lifecycle::register(
            &conn,
            &NewDocument {
                reference: "Expediente".to_string(),
                ..Default::default()
            },
            &actor,
            fixed_now(),
        )
        .unwrap();

        let mut linked = dispatch_form("Receptor A");
        linked.document_id = Some(doc.id);
        create_shipment(&conn, &linked, &actor, fixed_now()).unwrap();
        create_shipment(&conn, &dispatch_form("Receptor B"), &actor, fixed_now()).unwrap();

        let scoped = list_shipments(
            &conn,
            &ShipmentFilter {
                document_id: Some(doc.id),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].recipient_name, "Receptor A");
    }
}
