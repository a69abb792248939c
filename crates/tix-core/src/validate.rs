//! Pre-create input checks.
//!
//! Runs over the raw request payload so that non-string values are caught
//! alongside missing and blank ones. Every failing field is reported, in the
//! fixed order title, description, contactName, contactInfo.

use serde::Serialize;
use serde_json::Value;

use crate::model::Contact;

/// Payload keys checked at creation, paired with their error message.
const REQUIRED_FIELDS: [(&str, &str); 4] = [
    ("title", "Title is required"),
    ("description", "Description is required"),
    ("contactName", "Contact name is required"),
    ("contactInfo", "Contact information is required"),
];

/// Outcome of [`validate_ticket_data`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Check that every required creation field is a non-blank string.
#[must_use]
pub fn validate_ticket_data(payload: &Value) -> ValidationReport {
    let errors: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|(key, _)| present_string(payload, key).is_none())
        .map(|(_, message)| (*message).to_string())
        .collect();

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
    }
}

/// Creation fields extracted from a payload that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketInput {
    pub title: String,
    pub description: String,
    pub contact: Contact,
}

impl TicketInput {
    /// Validate `payload` and pull out its creation fields.
    ///
    /// # Errors
    ///
    /// Returns the failing [`ValidationReport`] when any field is missing,
    /// not a string, or blank.
    pub fn from_payload(payload: &Value) -> Result<Self, ValidationReport> {
        let report = validate_ticket_data(payload);
        if !report.is_valid {
            return Err(report);
        }

        let field = |key: &str| present_string(payload, key).unwrap_or_default().to_string();
        Ok(Self {
            title: field("title"),
            description: field("description"),
            contact: Contact {
                name: field("contactName"),
                info: field("contactInfo"),
            },
        })
    }
}

fn present_string<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}
