use std::str::FromStr;

use rusqlite::types::ToSql;
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::enums::*;
use crate::models::filters::DocumentFilter;
use crate::models::Document;

use super::{format_ts, parse_date_opt, parse_ts, parse_ts_opt, parse_uuid_opt};

pub(crate) const DOCUMENT_COLUMNS: &str = "id, tracking_code, reference, origin, requester_name, \
     requester_phone, document_date, page_count, notes, status, priority, due_date, \
     completed_at, current_location, current_custodian, extension_json, created_by, \
     version, created_at, updated_at";

/// Next document id, for tracking-code generation. Must run inside the
/// same transaction as the insert that uses it.
pub fn next_document_id(conn: &Connection) -> Result<i64, DatabaseError> {
    let next: i64 = conn.query_row(
        "SELECT COALESCE(MAX(id), 0) + 1 FROM documents",
        [],
        |row| row.get(0),
    )?;
    Ok(next)
}

pub fn insert_document(conn: &Connection, doc: &Document) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO documents (id, tracking_code, reference, origin, requester_name,
         requester_phone, document_date, page_count, notes, status, priority, due_date,
         completed_at, current_location, current_custodian, extension_json, created_by,
         version, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                 ?17, ?18, ?19, ?20)",
        params![
            doc.id,
            doc.tracking_code,
            doc.reference,
            doc.origin,
            doc.requester_name,
            doc.requester_phone,
            doc.document_date.map(|d| d.to_string()),
            doc.page_count,
            doc.notes,
            doc.status.as_str(),
            doc.priority.as_str(),
            doc.due_date.map(|d| d.to_string()),
            doc.completed_at.as_ref().map(format_ts),
            doc.current_location,
            doc.current_custodian,
            doc.extension
                .as_ref()
                .map(|v| serde_json::to_string(v).unwrap_or_else(|_| "null".into())),
            doc.created_by.map(|id| id.to_string()),
            doc.version,
            format_ts(&doc.created_at),
            format_ts(&doc.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_document(conn: &Connection, id: i64) -> Result<Option<Document>, DatabaseError> {
    let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let result = stmt.query_row(params![id], document_row);

    match result {
        Ok(row) => Ok(Some(document_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_document_by_tracking_code(
    conn: &Connection,
    code: &str,
) -> Result<Option<Document>, DatabaseError> {
    let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE tracking_code = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let result = stmt.query_row(params![code], document_row);

    match result {
        Ok(row) => Ok(Some(document_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Update lifecycle fields with an optimistic version check.
///
/// Returns the number of rows updated: 0 means the expected version no
/// longer matches (or the document vanished); the caller decides which.
pub fn update_lifecycle_fields(
    conn: &Connection,
    id: i64,
    status: &DocumentStatus,
    completed_at: Option<&chrono::NaiveDateTime>,
    now: &chrono::NaiveDateTime,
    expected_version: i64,
) -> Result<usize, DatabaseError> {
    let rows = conn.execute(
        "UPDATE documents SET status = ?2, completed_at = ?3, updated_at = ?4,
         version = version + 1
         WHERE id = ?1 AND version = ?5",
        params![
            id,
            status.as_str(),
            completed_at.map(format_ts),
            format_ts(now),
            expected_version,
        ],
    )?;
    Ok(rows)
}

/// Update current custody fields with an optimistic version check.
pub fn update_custody_fields(
    conn: &Connection,
    id: i64,
    location: &str,
    custodian: &str,
    now: &chrono::NaiveDateTime,
    expected_version: i64,
) -> Result<usize, DatabaseError> {
    let rows = conn.execute(
        "UPDATE documents SET current_location = ?2, current_custodian = ?3,
         updated_at = ?4, version = version + 1
         WHERE id = ?1 AND version = ?5",
        params![id, location, custodian, format_ts(now), expected_version],
    )?;
    Ok(rows)
}

/// List documents matching a filter, most recently created first.
pub fn list_documents(
    conn: &Connection,
    filter: &DocumentFilter,
) -> Result<Vec<Document>, DatabaseError> {
    let mut conditions: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(ref status) = filter.status {
        conditions.push("status = ?");
        values.push(Box::new(status.as_str()));
    }
    if let Some(ref priority) = filter.priority {
        conditions.push("priority = ?");
        values.push(Box::new(priority.as_str()));
    }
    if let Some(ref search) = filter.search {
        conditions.push(
            "(tracking_code LIKE ? OR reference LIKE ? OR origin LIKE ? \
             OR requester_name LIKE ?)",
        );
        let pattern = format!("%{search}%");
        for _ in 0..4 {
            values.push(Box::new(pattern.clone()));
        }
    }
    if let Some(from) = filter.created_from {
        conditions.push("created_at >= ?");
        values.push(Box::new(from.to_string()));
    }
    if let Some(to) = filter.created_to {
        conditions.push("created_at <= ?");
        // Inclusive end-of-day bound
        values.push(Box::new(format!("{to} 23:59:59")));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    let sql = format!(
        "SELECT {DOCUMENT_COLUMNS} FROM documents {where_clause} ORDER BY created_at DESC, id DESC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        rusqlite::params_from_iter(values.iter().map(|v| v.as_ref())),
        document_row,
    )?;

    let mut docs = Vec::new();
    for row in rows {
        docs.push(document_from_row(row?)?);
    }
    Ok(docs)
}

// Internal row type for Document mapping
pub(crate) struct DocumentRow {
    id: i64,
    tracking_code: String,
    reference: String,
    origin: Option<String>,
    requester_name: Option<String>,
    requester_phone: Option<String>,
    document_date: Option<String>,
    page_count: Option<u32>,
    notes: Option<String>,
    status: String,
    priority: String,
    due_date: Option<String>,
    completed_at: Option<String>,
    current_location: String,
    current_custodian: String,
    extension_json: Option<String>,
    created_by: Option<String>,
    version: i64,
    created_at: String,
    updated_at: String,
}

pub(crate) fn document_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DocumentRow> {
    Ok(DocumentRow {
        id: row.get(0)?,
        tracking_code: row.get(1)?,
        reference: row.get(2)?,
        origin: row.get(3)?,
        requester_name: row.get(4)?,
        requester_phone: row.get(5)?,
        document_date: row.get(6)?,
        page_count: row.get(7)?,
        notes: row.get(8)?,
        status: row.get(9)?,
        priority: row.get(10)?,
        due_date: row.get(11)?,
        completed_at: row.get(12)?,
        current_location: row.get(13)?,
        current_custodian: row.get(14)?,
        extension_json: row.get(15)?,
        created_by: row.get(16)?,
        version: row.get(17)?,
        created_at: row.get(18)?,
        updated_at: row.get(19)?,
    })
}

pub(crate) fn document_from_row(row: DocumentRow) -> Result<Document, DatabaseError> {
    Ok(Document {
        id: row.id,
        tracking_code: row.tracking_code,
        reference: row.reference,
        origin: row.origin,
        requester_name: row.requester_name,
        requester_phone: row.requester_phone,
        document_date: parse_date_opt(row.document_date),
        page_count: row.page_count,
        notes: row.notes,
        status: DocumentStatus::from_str(&row.status)?,
        priority: Priority::from_str(&row.priority)?,
        due_date: parse_date_opt(row.due_date),
        completed_at: parse_ts_opt(row.completed_at),
        current_location: row.current_location,
        current_custodian: row.current_custodian,
        extension: row
            .extension_json
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok()),
        created_by: parse_uuid_opt(row.created_by),
        version: row.version,
        created_at: parse_ts(&row.created_at),
        updated_at: parse_ts(&row.updated_at),
    })
}
