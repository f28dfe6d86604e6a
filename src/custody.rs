//! Custody ledger.
//!
//! Every location/custodian change appends to an immutable ledger; the
//! document's current custody fields are a materialized view of the latest
//! entry. The append and the view update commit as one transaction.

use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::db::repository;
use crate::error::EngineError;
use crate::models::{Actor, CustodyEntry, Document};

/// Move a document to a new location/custodian.
///
/// Free-text locations are permitted (ad-hoc destinations), but a supplied
/// destination id must exist in the directory. Ledger append and document
/// update are atomic: both happen or neither does.
pub fn relocate(
    conn: &Connection,
    document_id: i64,
    new_location: &str,
    new_custodian: &str,
    destination_id: Option<i64>,
    actor: &Actor,
    now: NaiveDateTime,
) -> Result<Document, EngineError> {
    if new_location.trim().is_empty() {
        return Err(EngineError::ValidationFailed {
            field: "location",
            reason: "location must not be empty".into(),
        });
    }
    if new_custodian.trim().is_empty() {
        return Err(EngineError::ValidationFailed {
            field: "custodian",
            reason: "custodian must not be empty".into(),
        });
    }

    let tx = conn
        .unchecked_transaction()
        .map_err(crate::db::DatabaseError::from)?;

    let mut doc = repository::get_document(&tx, document_id)?
        .ok_or_else(|| EngineError::document_not_found(document_id))?;

    if let Some(dest_id) = destination_id {
        if !repository::destination_exists(&tx, dest_id)? {
            return Err(EngineError::destination_not_found(dest_id));
        }
    }

    repository::insert_custody_entry(
        &tx,
        doc.id,
        new_location,
        new_custodian,
        destination_id,
        Some(&actor.id),
        &now,
    )?;

    let rows = repository::update_custody_fields(
        &tx,
        doc.id,
        new_location,
        new_custodian,
        &now,
        doc.version,
    )?;
    if rows == 0 {
        return Err(EngineError::ConcurrentModification { id: doc.id });
    }

    tx.commit().map_err(crate::db::DatabaseError::from)?;

    doc.current_location = new_location.to_string();
    doc.current_custodian = new_custodian.to_string();
    doc.updated_at = now;
    doc.version += 1;

    tracing::info!(
        document_id = doc.id,
        location = new_location,
        custodian = new_custodian,
        "Document relocated"
    );
    Ok(doc)
}

/// Custody ledger for a document, oldest first. Pure read.
pub fn custody_history(
    conn: &Connection,
    document_id: i64,
) -> Result<Vec<CustodyEntry>, EngineError> {
    if repository::get_document(conn, document_id)?.is_none() {
        return Err(EngineError::document_not_found(document_id));
    }
    let entries = repository::list_custody_entries(conn, document_id)?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::lifecycle;
    use crate::models::enums::DestinationCategory;
    use crate::models::NewDocument;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn clerk() -> Actor {
        Actor::new(Uuid::new_v4(), "Ana Quispe")
    }

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 16)
            .unwrap()
            .and_hms_opt(11, 0, 0)
            .unwrap()
    }

    fn registered_document(conn: &Connection) -> Document {
        let input = NewDocument {
            reference: "Expediente".to_string(),
            ..Default::default()
        };
        lifecycle::register(conn, &input, &clerk(), fixed_now()).unwrap()
    }

    #[test]
    fn relocate_appends_entry_and_updates_view() {
        let conn = open_memory_database().unwrap();
        let doc = registered_document(&conn);

        let updated = relocate(
            &conn,
            doc.id,
            "Dirección Jurídica",
            "Dr. Mamani",
            None,
            &clerk(),
            fixed_now(),
        )
        .unwrap();

        assert_eq!(updated.current_location, "Dirección Jurídica");
        assert_eq!(updated.current_custodian, "Dr. Mamani");

        let history = custody_history(&conn, doc.id).unwrap();
        // Intake entry + relocation
        assert_eq!(history.len(), 2);
        let last = history.last().unwrap();
        assert_eq!(last.location, updated.current_location);
        assert_eq!(last.custodian, updated.current_custodian);
    }

    #[test]
    fn two_relocations_stay_chronological() {
        let conn = open_memory_database().unwrap();
        let doc = registered_document(&conn);
        let actor = clerk();

        relocate(&conn, doc.id, "Archivo", "Sra. Flores", None, &actor, fixed_now()).unwrap();
        let later = fixed_now() + chrono::Duration::minutes(5);
        let updated = relocate(&conn, doc.id, "Despacho", "Lic. Rojas", None, &actor, later).unwrap();

        let history = custody_history(&conn, doc.id).unwrap();
        assert_eq!(history.len(), 3);
        assert!(history[1].recorded_at <= history[2].recorded_at);
        assert_eq!(history[2].location, "Despacho");
        assert_eq!(updated.current_location, history[2].location);
        assert_eq!(updated.current_custodian, history[2].custodian);
    }

    #[test]
    fn relocate_unknown_document_is_not_found() {
        let conn = open_memory_database().unwrap();
        let result = relocate(&conn, 42, "Archivo", "Alguien", None, &clerk(), fixed_now());
        assert!(matches!(result, Err(EngineError::NotFound { .. })));
    }

    #[test]
    fn relocate_with_missing_destination_fails_atomically() {
        let conn = open_memory_database().unwrap();
        let doc = registered_document(&conn);

        let result = relocate(
            &conn,
            doc.id,
            "Dirección Jurídica",
            "Dr. Mamani",
            Some(99),
            &clerk(),
            fixed_now(),
        );
        assert!(matches!(result, Err(EngineError::NotFound { .. })));

        // Neither the ledger nor the document changed
        let history = custody_history(&conn, doc.id).unwrap();
        assert_eq!(history.len(), 1);
        let unchanged = crate::db::repository::get_document(&conn, doc.id)
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.current_location, doc.current_location);
    }

    #[test]
    fn relocate_with_known_destination_records_it() {
        let conn = open_memory_database().unwrap();
        let doc = registered_document(&conn);
        let dest_id = crate::db::repository::insert_destination(
            &conn,
            "Dirección Legal",
            &DestinationCategory::Internal,
        )
        .unwrap();

        relocate(
            &conn,
            doc.id,
            "Dirección Legal",
            "Dr. Mamani",
            Some(dest_id),
            &clerk(),
            fixed_now(),
        )
        .unwrap();

        let history = custody_history(&conn, doc.id).unwrap();
        assert_eq!(history.last().unwrap().destination_id, Some(dest_id));
    }

    #[test]
    fn relocate_rejects_empty_fields() {
        let conn = open_memory_database().unwrap();
        let doc = registered_document(&conn);

        assert!(matches!(
            relocate(&conn, doc.id, "  ", "Alguien", None, &clerk(), fixed_now()),
            Err(EngineError::ValidationFailed { field: "location", .. })
        ));
        assert!(matches!(
            relocate(&conn, doc.id, "Archivo", "", None, &clerk(), fixed_now()),
            Err(EngineError::ValidationFailed { field: "custodian", .. })
        ));
    }

    #[test]
    fn custody_history_unknown_document_is_not_found() {
        let conn = open_memory_database().unwrap();
        assert!(matches!(
            custody_history(&conn, 7),
            Err(EngineError::NotFound { .. })
        ));
    }
}
