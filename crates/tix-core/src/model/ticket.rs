use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::ticket_id::TicketId;
use crate::error::TicketError;

/// The four ticket statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Accepted,
    Resolved,
    Rejected,
}

impl Status {
    pub const ALL: [Self; 4] = [Self::Pending, Self::Accepted, Self::Resolved, Self::Rejected];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a status supplied for the `status` field.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Validation`] naming the `status` field when the
    /// value is not one of the four statuses.
    pub fn parse_field(raw: &str) -> Result<Self, TicketError> {
        raw.parse::<Self>()
            .map_err(|_| TicketError::invalid(invalid_status_message(raw)))
    }
}

pub(crate) fn invalid_status_message(raw: &str) -> String {
    format!("status: `{raw}` is not a valid enum value")
}

/// The kinds of audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Created,
    StatusUpdated,
    InformationUpdated,
}

impl HistoryAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::StatusUpdated => "status_updated",
            Self::InformationUpdated => "information_updated",
        }
    }
}

/// Reporter name plus a free-form contact channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub info: String,
}

/// Partial copy of ticket fields stored in a history entry.
///
/// Which fields are populated depends on the entry's action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl ValueSnapshot {
    #[must_use]
    pub const fn status(status: Status) -> Self {
        Self {
            title: None,
            description: None,
            contact: None,
            status: Some(status),
        }
    }

    /// True when no field is populated.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.contact.is_none()
            && self.status.is_none()
    }
}

/// One immutable audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub action: HistoryAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<ValueSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<ValueSnapshot>,
    pub timestamp: DateTime<Utc>,
}

/// A ticket that has not been stored yet.
///
/// History stays empty until the store assigns an identifier; see
/// [`NewTicket::into_ticket`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub contact: Contact,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewTicket {
    /// Build a pending ticket stamped at `now`.
    ///
    /// Title and contact fields are trimmed; the description is kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Validation`] listing every required field that
    /// is empty after trimming.
    pub fn new(
        title: &str,
        description: &str,
        contact: Contact,
        now: DateTime<Utc>,
    ) -> Result<Self, TicketError> {
        let draft = Self {
            title: title.trim().to_string(),
            description: description.to_string(),
            contact: Contact {
                name: contact.name.trim().to_string(),
                info: contact.info.trim().to_string(),
            },
            status: Status::Pending,
            created_at: now,
            updated_at: now,
        };
        check_required(&draft.title, &draft.description, &draft.contact)?;
        Ok(draft)
    }

    /// Attach the store-assigned id and synthesize the `created` entry.
    #[must_use]
    pub fn into_ticket(self, id: TicketId) -> Ticket {
        let created = HistoryEntry {
            action: HistoryAction::Created,
            old_value: None,
            new_value: Some(ValueSnapshot {
                title: Some(self.title.clone()),
                description: Some(self.description.clone()),
                contact: Some(self.contact.clone()),
                status: Some(self.status),
            }),
            timestamp: self.created_at,
        };

        Ticket {
            id,
            title: self.title,
            description: self.description,
            contact: self.contact,
            status: self.status,
            history: vec![created],
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A stored ticket document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    pub title: String,
    pub description: String,
    pub contact: Contact,
    pub status: Status,
    pub history: Vec<HistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Title, description and contact; the payload of `information_updated`.
    #[must_use]
    pub fn information_snapshot(&self) -> ValueSnapshot {
        ValueSnapshot {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            contact: Some(self.contact.clone()),
            status: None,
        }
    }

    /// Check the invariants a document must hold before it is written.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Validation`] for empty required fields or an
    /// empty history.
    pub fn validate(&self) -> Result<(), TicketError> {
        check_required(&self.title, &self.description, &self.contact)?;
        if self.history.is_empty() {
            return Err(TicketError::invalid("history: a stored ticket needs its created entry"));
        }
        Ok(())
    }
}

pub(crate) fn required_message(path: &str) -> String {
    format!("{path}: Path `{path}` is required.")
}

fn check_required(title: &str, description: &str, contact: &Contact) -> Result<(), TicketError> {
    let errors: Vec<String> = [
        ("title", title),
        ("description", description),
        ("contact.name", contact.name.as_str()),
        ("contact.info", contact.info.as_str()),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_empty())
    .map(|(path, _)| required_message(path))
    .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TicketError::Validation { errors })
    }
}

/// Error returned when parsing an enum value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "resolved" => Ok(Self::Resolved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseEnumError {
                expected: "status",
                got: s.to_string(),
            }),
        }
    }
}
