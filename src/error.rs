use thiserror::Error;

use crate::db::DatabaseError;

/// Business-rule failures of the routing engine. Every variant carries the
/// offending field or id so the transport layer can render an actionable
/// message without leaking storage internals.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed for {field}: {reason}")]
    ValidationFailed { field: &'static str, reason: String },

    #[error("Unrecognized document status: {value}")]
    InvalidStatus { value: String },

    #[error("Unrecognized shipment status: {value}")]
    InvalidState { value: String },

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("Document {id} was modified concurrently, retry the operation")]
    ConcurrentModification { id: i64 },

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl EngineError {
    pub fn document_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "document",
            id: id.to_string(),
        }
    }

    pub fn shipment_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "shipment",
            id: id.to_string(),
        }
    }

    pub fn destination_not_found(id: i64) -> Self {
        Self::NotFound {
            entity: "destination",
            id: id.to_string(),
        }
    }
}
