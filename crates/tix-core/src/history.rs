//! Append-only audit trail on a ticket.

use chrono::{DateTime, Utc};

use crate::model::{HistoryAction, HistoryEntry, Ticket, ValueSnapshot};

/// Append one entry to `ticket.history`.
///
/// `old_value` and `new_value` are kept only when they carry at least one
/// populated field. An empty snapshot counts as "not provided" and is left
/// out of the entry; a snapshot holding an empty string is still recorded.
pub fn record(
    ticket: &mut Ticket,
    action: HistoryAction,
    old_value: Option<ValueSnapshot>,
    new_value: Option<ValueSnapshot>,
    at: DateTime<Utc>,
) {
    ticket.history.push(HistoryEntry {
        action,
        old_value: old_value.filter(|v| !v.is_empty()),
        new_value: new_value.filter(|v| !v.is_empty()),
        timestamp: at,
    });
}

/// Entries appended after the first `len_before` ones.
#[must_use]
pub fn appended_since(ticket: &Ticket, len_before: usize) -> &[HistoryEntry] {
    ticket.history.get(len_before..).unwrap_or_default()
}
