use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{DocumentStatus, Priority};

/// A tracked routing slip (hoja de ruta).
///
/// `days_until_due` and urgency are never stored; they are derived at read
/// time by the SLA calculator from `due_date` and `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    /// Human-readable tracking code, unique and immutable once assigned.
    pub tracking_code: String,
    pub reference: String,
    pub origin: Option<String>,
    pub requester_name: Option<String>,
    pub requester_phone: Option<String>,
    pub document_date: Option<NaiveDate>,
    pub page_count: Option<u32>,
    pub notes: Option<String>,
    pub status: DocumentStatus,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub completed_at: Option<NaiveDateTime>,
    /// Materialized view of the latest custody entry.
    pub current_location: String,
    pub current_custodian: String,
    /// Opaque extension payload (extra form sections); passed through
    /// unexamined by the lifecycle engine.
    pub extension: Option<serde_json::Value>,
    /// Creator attribution for audit; not an access lock.
    pub created_by: Option<Uuid>,
    /// Optimistic-concurrency counter, bumped on every mutation.
    pub version: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Intake form for a new routing slip.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewDocument {
    pub reference: String,
    pub origin: Option<String>,
    pub requester_name: Option<String>,
    pub requester_phone: Option<String>,
    pub document_date: Option<NaiveDate>,
    pub page_count: Option<u32>,
    pub notes: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub extension: Option<serde_json::Value>,
}
