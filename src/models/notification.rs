use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::NotificationKind;

/// A consumer-facing notification produced as a side effect of lifecycle
/// and shipment transitions. One-way; never mutates document state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub document_id: Option<i64>,
    pub user_id: Option<Uuid>,
    pub kind: NotificationKind,
    pub message: String,
    pub read: bool,
    pub created_at: NaiveDateTime,
}
