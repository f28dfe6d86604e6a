//! Due-date SLA calculator.
//!
//! Pure functions over `(due_date, status, today)`; the clock is always
//! injected, never read from a global, so the classification is testable
//! in isolation. Urgency is derived on every read and never persisted.

use chrono::NaiveDate;

use crate::models::enums::{DocumentStatus, Urgency};

/// Due dates within this many days (inclusive) are critical.
pub const CRITICAL_WINDOW_DAYS: i64 = 3;

/// Due dates within this many days (inclusive) are upcoming.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

/// Signed days between today and the due date. Negative when lapsed,
/// `None` when the document has no due date.
pub fn days_until_due(due_date: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    due_date.map(|due| (due - today).num_days())
}

/// Classify urgency from days-remaining and current status.
///
/// Terminal and erroneous-free rule set:
/// - completed/cancelled documents are never urgent, whatever the date;
/// - no due date means no urgency;
/// - lapsed ⇒ overdue; 0..=3 ⇒ critical; 4..=7 ⇒ upcoming; else normal.
pub fn classify(days: Option<i64>, status: &DocumentStatus) -> Urgency {
    if status.is_terminal() {
        return Urgency::None;
    }
    match days {
        None => Urgency::None,
        Some(d) if d < 0 => Urgency::Overdue,
        Some(d) if d <= CRITICAL_WINDOW_DAYS => Urgency::Critical,
        Some(d) if d <= UPCOMING_WINDOW_DAYS => Urgency::Upcoming,
        Some(_) => Urgency::Normal,
    }
}

/// Convenience: classify straight from a document's fields.
pub fn urgency_for(
    due_date: Option<NaiveDate>,
    status: &DocumentStatus,
    today: NaiveDate,
) -> Urgency {
    classify(days_until_due(due_date, today), status)
}
