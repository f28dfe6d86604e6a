pub mod custody;
pub mod destination;
pub mod document;
pub mod notification;
pub mod shipment;

pub use custody::*;
pub use destination::*;
pub use document::*;
pub use notification::*;
pub use shipment::*;

use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

/// Storage format for timestamps, matching SQLite's datetime() output.
pub(crate) const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn format_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

/// Lenient timestamp parsing: accepts both the storage format and the
/// ISO "T" separator produced by older exports.
pub(crate) fn parse_ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TS_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .unwrap_or_else(|_| {
            tracing::warn!(value = s, "Unparseable stored timestamp, using epoch default");
            NaiveDateTime::default()
        })
}

pub(crate) fn parse_date_opt(s: Option<String>) -> Option<NaiveDate> {
    s.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok())
}

pub(crate) fn parse_ts_opt(s: Option<String>) -> Option<NaiveDateTime> {
    s.map(|t| parse_ts(&t))
}

pub(crate) fn parse_uuid_opt(s: Option<String>) -> Option<Uuid> {
    s.and_then(|v| Uuid::parse_str(&v).ok())
}
