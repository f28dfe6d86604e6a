use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row of the append-only custody ledger. The owning document's
/// `current_location`/`current_custodian` mirror the latest entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustodyEntry {
    pub id: i64,
    pub document_id: i64,
    pub location: String,
    pub custodian: String,
    pub destination_id: Option<i64>,
    pub actor_id: Option<Uuid>,
    pub recorded_at: NaiveDateTime,
}
