use serde::{Deserialize, Serialize};

use super::enums::DestinationCategory;

/// An entry of the destination directory. Read-only lookup for the
/// custody ledger and shipment workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    pub id: i64,
    pub name: String,
    pub category: DestinationCategory,
}
