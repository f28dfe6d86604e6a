use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::CustodyEntry;

use super::{format_ts, parse_ts, parse_uuid_opt};

pub fn insert_custody_entry(
    conn: &Connection,
    document_id: i64,
    location: &str,
    custodian: &str,
    destination_id: Option<i64>,
    actor_id: Option<&uuid::Uuid>,
    recorded_at: &chrono::NaiveDateTime,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO custody_entries (document_id, location, custodian, destination_id,
         actor_id, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            document_id,
            location,
            custodian,
            destination_id,
            actor_id.map(|id| id.to_string()),
            format_ts(recorded_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Custody ledger for one document, oldest entry first. Insertion order
/// (rowid) breaks ties between entries recorded within the same second.
pub fn list_custody_entries(
    conn: &Connection,
    document_id: i64,
) -> Result<Vec<CustodyEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, document_id, location, custodian, destination_id, actor_id, recorded_at
         FROM custody_entries WHERE document_id = ?1
         ORDER BY recorded_at ASC, id ASC",
    )?;

    let rows = stmt.query_map(params![document_id], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<i64>>(4)?,
            row.get::<_, Option<String>>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows {
        let (id, document_id, location, custodian, destination_id, actor_id, recorded_at) = row?;
        entries.push(CustodyEntry {
            id,
            document_id,
            location,
            custodian,
            destination_id,
            actor_id: parse_uuid_opt(actor_id),
            recorded_at: parse_ts(&recorded_at),
        });
    }
    Ok(entries)
}
