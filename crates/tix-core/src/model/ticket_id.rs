//! Ticket identifiers.
//!
//! IDs are assigned by the store at insert time and have the shape
//! `tk-` followed by exactly 12 lowercase hex digits.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const PREFIX: &str = "tk-";
pub const HEX_LEN: usize = 12;

const HEX_MASK: u64 = 0xFFFF_FFFF_FFFF;

/// A well-formed ticket identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketId(String);

/// Error returned when text is not a ticket identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedTicketId {
    pub got: String,
}

impl fmt::Display for MalformedTicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "malformed ticket id '{}': expected {PREFIX} followed by {HEX_LEN} hex digits",
            self.got
        )
    }
}

impl std::error::Error for MalformedTicketId {}

impl TicketId {
    /// Draw a fresh random identifier.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let bits = rng.r#gen::<u64>() & HEX_MASK;
        Self(format!("{PREFIX}{bits:012x}"))
    }

    /// Parse and validate an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedTicketId`] if `raw` does not match `tk-[0-9a-f]{12}`.
    pub fn parse(raw: &str) -> Result<Self, MalformedTicketId> {
        if is_well_formed(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(MalformedTicketId {
                got: raw.to_string(),
            })
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns true when `raw` has the stored identifier shape.
#[must_use]
pub fn is_well_formed(raw: &str) -> bool {
    raw.strip_prefix(PREFIX).is_some_and(|hex| {
        hex.len() == HEX_LEN
            && hex
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    })
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TicketId {
    type Err = MalformedTicketId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TicketId {
    type Error = MalformedTicketId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_well_formed(&value) {
            Ok(Self(value))
        } else {
            Err(MalformedTicketId { got: value })
        }
    }
}

impl From<TicketId> for String {
    fn from(id: TicketId) -> Self {
        id.0
    }
}

impl AsRef<str> for TicketId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
