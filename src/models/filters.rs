use chrono::NaiveDate;

use super::enums::{DocumentStatus, Priority, ShipmentStatus};

#[derive(Debug, Default)]
pub struct DocumentFilter {
    pub status: Option<DocumentStatus>,
    pub priority: Option<Priority>,
    /// Substring match against tracking code, reference, origin and
    /// requester name.
    pub search: Option<String>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
}

#[derive(Debug, Default)]
pub struct ShipmentFilter {
    pub document_id: Option<i64>,
    pub status: Option<ShipmentStatus>,
}
