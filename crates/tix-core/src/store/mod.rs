//! Storage collaborator: where ticket documents live.
//!
//! The core only needs four operations (insert, filtered+sorted find,
//! find by id, and whole-document replace) so the seam is a trait. The
//! shipped implementation is [`sqlite::SqliteStore`].
//!
//! Saves replace the whole document with no version check: two concurrent
//! read-modify-write cycles on one ticket resolve as last-write-wins.

pub mod migrations;
pub mod schema;
pub mod sqlite;

use std::fmt;

use crate::model::{NewTicket, Ticket};

pub use sqlite::SqliteStore;

/// Errors raised by a [`TicketStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No document has this identifier.
    #[error("ticket '{id}' not found")]
    NotFound { id: String },

    /// The identifier is not in the store's format.
    #[error("malformed ticket id '{id}'")]
    MalformedId { id: String },

    /// Fresh identifiers kept colliding with existing ones.
    #[error("could not allocate a unique ticket id after {attempts} attempts")]
    IdExhausted { attempts: u32 },

    /// The backing database failed.
    #[error("database error: {0}")]
    Backend(#[from] rusqlite::Error),

    /// A stored document could not be encoded or decoded.
    #[error("document codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Opening or migrating the database failed.
    #[error("{0:#}")]
    Open(anyhow::Error),
}

/// Sort order for listings. Ties break on id ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Most recently created first.
    #[default]
    CreatedDesc,
    /// Most recently updated first.
    UpdatedDesc,
}

impl SortOrder {
    /// Map the caller's `sort` selector: `latest` orders by last update,
    /// anything else (including nothing) by creation time.
    #[must_use]
    pub fn from_selector(selector: Option<&str>) -> Self {
        match selector {
            Some("latest") => Self::UpdatedDesc,
            _ => Self::CreatedDesc,
        }
    }

    pub(crate) const fn sql_clause(self) -> &'static str {
        match self {
            Self::CreatedDesc => "ORDER BY created_at_us DESC, ticket_id ASC",
            Self::UpdatedDesc => "ORDER BY updated_at_us DESC, ticket_id ASC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreatedDesc => f.write_str("created_desc"),
            Self::UpdatedDesc => f.write_str("updated_desc"),
        }
    }
}

/// Filter and order for [`TicketStore::find`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketQuery {
    /// Exact status match. Values outside the enum simply match nothing.
    pub status: Option<String>,
    pub sort: SortOrder,
}

impl TicketQuery {
    #[cfg(test)]
    pub(crate) fn with_status(status: crate::model::Status) -> Self {
        Self {
            status: Some(status.to_string()),
            sort: SortOrder::default(),
        }
    }
}

/// Document store operations the ticket core relies on.
pub trait TicketStore {
    /// Persist a new ticket, assigning its id and `created` history entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails.
    fn insert(&self, draft: NewTicket) -> Result<Ticket, StoreError>;

    /// All tickets matching `query`, in its sort order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the read fails.
    fn find(&self, query: &TicketQuery) -> Result<Vec<Ticket>, StoreError>;

    /// One ticket by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MalformedId`] for ids not in the store's format
    /// and [`StoreError::NotFound`] when nothing matches.
    fn find_by_id(&self, id: &str) -> Result<Ticket, StoreError>;

    /// Replace the stored document with `ticket`, atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the id is unknown.
    fn save(&self, ticket: &Ticket) -> Result<Ticket, StoreError>;
}

impl<S: TicketStore + ?Sized> TicketStore for &S {
    fn insert(&self, draft: NewTicket) -> Result<Ticket, StoreError> {
        (**self).insert(draft)
    }

    fn find(&self, query: &TicketQuery) -> Result<Vec<Ticket>, StoreError> {
        (**self).find(query)
    }

    fn find_by_id(&self, id: &str) -> Result<Ticket, StoreError> {
        (**self).find_by_id(id)
    }

    fn save(&self, ticket: &Ticket) -> Result<Ticket, StoreError> {
        (**self).save(ticket)
    }
}
