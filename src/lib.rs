//! Rutero: a tracking engine for government routing slips (hojas de ruta).
//!
//! A routing slip is the cover sheet stapled to a citizen's paperwork as it
//! moves through an agency. This crate tracks each slip's lifecycle status,
//! due-date urgency, physical custody trail, outbound shipments, and the
//! notifications and dashboard views derived from them. Persistence is a
//! local SQLite file; all state changes go through the service modules so
//! the custody ledger and status history stay consistent.

pub mod config;
pub mod custody;
pub mod dashboard;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod notify;
pub mod sla;

pub use error::EngineError;
pub use models::{Actor, CustodyEntry, Destination, Document, NewDocument, NewShipment, Notification, Shipment};

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Honors `RUST_LOG` when set, otherwise falls back to the crate default.
/// Safe to call once per process; embedding applications that install their
/// own subscriber should skip this.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::info!(version = config::APP_VERSION, "{} starting", config::APP_NAME);
}
