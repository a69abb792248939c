//! Update reconciler: diff a partial patch against a stored ticket.
//!
//! Decides which fields change, classifies the change, and appends the
//! matching history entries:
//!
//! - a status change yields exactly one `status_updated` entry carrying only
//!   the old and new status
//! - any change to title, description, contact name or contact info yields
//!   exactly one `information_updated` entry with the pre- and post-update
//!   title/description/contact (status is never part of this payload)
//! - when both happen, `status_updated` is appended first
//!
//! Absent or empty patch values are no-ops, as are values equal to the
//! current one. `updatedAt` is refreshed on every reconciliation, including
//! ones that change nothing.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

use crate::error::TicketError;
use crate::history;
use crate::model::ticket::required_message;
use crate::model::{HistoryAction, Status, Ticket, ValueSnapshot};

/// Raw partial update as received from a caller.
///
/// Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A patch whose values have been checked and normalized.
///
/// `None` means "leave the field alone".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub contact_name: Option<String>,
    pub contact_info: Option<String>,
    pub status: Option<Status>,
}

impl TicketPatch {
    /// Deserialize a patch from a request payload.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Validation`] if the payload is not an object or
    /// a recognised field holds a non-string value.
    pub fn from_payload(payload: &Value) -> Result<Self, TicketError> {
        if !payload.is_object() {
            return Err(TicketError::invalid("update body must be a JSON object"));
        }
        Self::deserialize(payload).map_err(|e| TicketError::invalid(format!("invalid update: {e}")))
    }

    /// Check every supplied value before anything is mutated.
    ///
    /// Empty strings are dropped as "not provided". Title and contact values
    /// are trimmed; one that trims to nothing is an error on that field.
    /// Status must be one of the four statuses.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Validation`] collecting every offending field.
    pub fn validate(self) -> Result<ValidatedPatch, TicketError> {
        let mut errors = Vec::new();

        let mut trimmed = |value: Option<String>, path: &str| {
            let value = provided(value)?;
            let value = value.trim();
            if value.is_empty() {
                errors.push(required_message(path));
                None
            } else {
                Some(value.to_string())
            }
        };

        let title = trimmed(self.title, "title");
        let contact_name = trimmed(self.contact_name, "contact.name");
        let contact_info = trimmed(self.contact_info, "contact.info");
        let description = provided(self.description);

        let status = match provided(self.status) {
            Some(raw) => match Status::parse_field(&raw) {
                Ok(status) => Some(status),
                Err(err) => {
                    errors.extend(err.validation_errors().iter().cloned());
                    None
                }
            },
            None => None,
        };

        if errors.is_empty() {
            Ok(ValidatedPatch {
                title,
                description,
                contact_name,
                contact_info,
                status,
            })
        } else {
            Err(TicketError::Validation { errors })
        }
    }
}

fn provided(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl ValidatedPatch {
    /// True when the patch names no field at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.contact_name.is_none()
            && self.contact_info.is_none()
            && self.status.is_none()
    }
}

/// Classification of one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub status_changed: bool,
    pub information_changed: bool,
}

impl ChangeSet {
    /// Number of history entries this change produced.
    #[must_use]
    pub const fn entries(self) -> usize {
        self.status_changed as usize + self.information_changed as usize
    }

    #[must_use]
    pub const fn is_noop(self) -> bool {
        !self.status_changed && !self.information_changed
    }
}

impl fmt::Display for ChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status_changed, self.information_changed) {
            (false, false) => f.write_str("no-op"),
            (true, false) => f.write_str("status"),
            (false, true) => f.write_str("information"),
            (true, true) => f.write_str("status+information"),
        }
    }
}

/// Apply `patch` to `ticket`, appending history and stamping `updatedAt`.
pub fn reconcile(ticket: &mut Ticket, patch: &ValidatedPatch, now: DateTime<Utc>) -> ChangeSet {
    let before = ticket.information_snapshot();
    let old_status = ticket.status;
    let mut changes = ChangeSet::default();

    changes.information_changed |= assign(&mut ticket.title, patch.title.as_deref());
    changes.information_changed |= assign(&mut ticket.description, patch.description.as_deref());
    changes.information_changed |= assign(&mut ticket.contact.name, patch.contact_name.as_deref());
    changes.information_changed |= assign(&mut ticket.contact.info, patch.contact_info.as_deref());

    if let Some(status) = patch.status.filter(|s| *s != old_status) {
        ticket.status = status;
        changes.status_changed = true;
        history::record(
            ticket,
            HistoryAction::StatusUpdated,
            Some(ValueSnapshot::status(old_status)),
            Some(ValueSnapshot::status(status)),
            now,
        );
    }

    if changes.information_changed {
        let after = ticket.information_snapshot();
        history::record(
            ticket,
            HistoryAction::InformationUpdated,
            Some(before),
            Some(after),
            now,
        );
    }

    ticket.updated_at = now;
    changes
}

fn assign(field: &mut String, value: Option<&str>) -> bool {
    match value {
        Some(value) if value != field.as_str() => {
            value.clone_into(field);
            true
        }
        _ => false,
    }
}
