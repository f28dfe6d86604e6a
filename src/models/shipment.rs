use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ShipmentStatus;

/// A dispatch attempt (envío) of a document or standalone item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: i64,
    pub document_id: Option<i64>,
    pub recipient_name: String,
    pub recipient_email: Option<String>,
    pub recipient_phone: Option<String>,
    pub destination_id: Option<i64>,
    /// Ordered attachment metadata; binary content lives outside this core.
    pub attachments: Vec<AttachmentMeta>,
    pub comments: Option<String>,
    pub status: ShipmentStatus,
    pub dispatched_at: Option<NaiveDateTime>,
    pub delivered_at: Option<NaiveDateTime>,
    pub created_by: Option<Uuid>,
    pub created_at: NaiveDateTime,
}

/// Metadata for one attached file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttachmentMeta {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

/// Dispatch form for a new shipment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewShipment {
    pub document_id: Option<i64>,
    pub recipient_name: String,
    pub recipient_email: Option<String>,
    pub recipient_phone: Option<String>,
    pub destination_id: Option<i64>,
    pub attachments: Vec<AttachmentMeta>,
    pub comments: Option<String>,
    /// When true the shipment starts at `dispatched` with
    /// `dispatched_at = now` (counter-dispatch at the intake desk).
    pub auto_dispatch: bool,
}
