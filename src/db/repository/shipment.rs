use std::str::FromStr;

use rusqlite::types::ToSql;
use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::enums::ShipmentStatus;
use crate::models::filters::ShipmentFilter;
use crate::models::{AttachmentMeta, Shipment};

use super::{format_ts, parse_ts, parse_ts_opt, parse_uuid_opt};

const SHIPMENT_COLUMNS: &str = "id, document_id, recipient_name, recipient_email, \
     recipient_phone, destination_id, attachments_json, comments, status, dispatched_at, \
     delivered_at, created_by, created_at";

pub fn insert_shipment(conn: &Connection, shipment: &Shipment) -> Result<i64, DatabaseError> {
    let attachments_json =
        serde_json::to_string(&shipment.attachments).unwrap_or_else(|_| "[]".to_string());

    conn.execute(
        "INSERT INTO shipments (document_id, recipient_name, recipient_email,
         recipient_phone, destination_id, attachments_json, comments, status,
         dispatched_at, delivered_at, created_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            shipment.document_id,
            shipment.recipient_name,
            shipment.recipient_email,
            shipment.recipient_phone,
            shipment.destination_id,
            attachments_json,
            shipment.comments,
            shipment.status.as_str(),
            shipment.dispatched_at.as_ref().map(format_ts),
            shipment.delivered_at.as_ref().map(format_ts),
            shipment.created_by.map(|id| id.to_string()),
            format_ts(&shipment.created_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_shipment(conn: &Connection, id: i64) -> Result<Option<Shipment>, DatabaseError> {
    let sql = format!("SELECT {SHIPMENT_COLUMNS} FROM shipments WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let result = stmt.query_row(params![id], shipment_row);

    match result {
        Ok(row) => Ok(Some(shipment_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Update status and workflow timestamps of a shipment.
pub fn update_shipment_status(
    conn: &Connection,
    id: i64,
    status: &ShipmentStatus,
    dispatched_at: Option<&chrono::NaiveDateTime>,
    delivered_at: Option<&chrono::NaiveDateTime>,
) -> Result<usize, DatabaseError> {
    let rows = conn.execute(
        "UPDATE shipments SET status = ?2, dispatched_at = ?3, delivered_at = ?4
         WHERE id = ?1",
        params![
            id,
            status.as_str(),
            dispatched_at.map(format_ts),
            delivered_at.map(format_ts),
        ],
    )?;
    Ok(rows)
}

/// List shipments matching a filter, most recent first.
pub fn list_shipments(
    conn: &Connection,
    filter: &ShipmentFilter,
) -> Result<Vec<Shipment>, DatabaseError> {
    let mut conditions: Vec<&str> = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(document_id) = filter.document_id {
        conditions.push("document_id = ?");
        values.push(Box::new(document_id));
    }
    if let Some(ref status) = filter.status {
        conditions.push("status = ?");
        values.push(Box::new(status.as_str()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    let sql = format!(
        "SELECT {SHIPMENT_COLUMNS} FROM shipments {where_clause} ORDER BY created_at DESC, id DESC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        rusqlite::params_from_iter(values.iter().map(|v| v.as_ref())),
        shipment_row,
    )?;

    let mut shipments = Vec::new();
    for row in rows {
        shipments.push(shipment_from_row(row?)?);
    }
    Ok(shipments)
}

// Internal row type for Shipment mapping
pub(crate) struct ShipmentRow {
    id: i64,
    document_id: Option<i64>,
    recipient_name: String,
    recipient_email: Option<String>,
    recipient_phone: Option<String>,
    destination_id: Option<i64>,
    attachments_json: String,
    comments: Option<String>,
    status: String,
    dispatched_at: Option<String>,
    delivered_at: Option<String>,
    created_by: Option<String>,
    created_at: String,
}

pub(crate) fn shipment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ShipmentRow> {
    Ok(ShipmentRow {
        id: row.get(0)?,
        document_id: row.get(1)?,
        recipient_name: row.get(2)?,
        recipient_email: row.get(3)?,
        recipient_phone: row.get(4)?,
        destination_id: row.get(5)?,
        attachments_json: row.get(6)?,
        comments: row.get(7)?,
        status: row.get(8)?,
        dispatched_at: row.get(9)?,
        delivered_at: row.get(10)?,
        created_by: row.get(11)?,
        created_at: row.get(12)?,
    })
}

pub(crate) fn shipment_from_row(row: ShipmentRow) -> Result<Shipment, DatabaseError> {
    let attachments: Vec<AttachmentMeta> =
        serde_json::from_str(&row.attachments_json).unwrap_or_default();

    Ok(Shipment {
        id: row.id,
        document_id: row.document_id,
        recipient_name: row.recipient_name,
        recipient_email: row.recipient_email,
        recipient_phone: row.recipient_phone,
        destination_id: row.destination_id,
        attachments,
        comments: row.comments,
        status: ShipmentStatus::from_str(&row.status)?,
        dispatched_at: parse_ts_opt(row.dispatched_at),
        delivered_at: parse_ts_opt(row.delivered_at),
        created_by: parse_uuid_opt(row.created_by),
        created_at: parse_ts(&row.created_at),
    })
}
