use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity attached to every mutating call for audit attribution.
/// Authentication happens in the excluded transport layer; this core only
/// records the supplied identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub display_name: String,
}

impl Actor {
    pub fn new(id: Uuid, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}
