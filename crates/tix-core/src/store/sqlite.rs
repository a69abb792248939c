//! SQLite-backed ticket document store.
//!
//! Runtime defaults follow the usual single-writer setup:
//! - `journal_mode = WAL` so readers are not blocked by a writer
//! - `busy_timeout = 5s` to ride out transient lock contention
//!
//! Each ticket is one row: the serialized document plus the columns used to
//! filter and order listings. Every write is a single statement, so a save
//! either replaces the whole document or leaves it untouched.

use anyhow::Context;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use super::{StoreError, TicketQuery, TicketStore, migrations};
use crate::model::{NewTicket, Ticket, TicketId};

/// Busy timeout used for store connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Fresh ids drawn before giving up on an insert.
const MAX_ID_ATTEMPTS: u32 = 8;

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the store at `path`, apply pragmas, and migrate.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Open`] if opening, configuring, or migrating the
    /// database fails.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        open_at(path).map_err(StoreError::Open)
    }

    /// A private in-memory store, mostly for tests.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Open`] if migrating the fresh database fails.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let mut conn = Connection::open_in_memory()?;
        migrations::migrate(&mut conn)
            .context("apply ticket store migrations")
            .map_err(StoreError::Open)?;
        Ok(Self { conn })
    }

    /// Number of stored tickets.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the count query fails.
    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tickets", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

fn open_at(path: &Path) -> anyhow::Result<SqliteStore> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create store directory {}", parent.display()))?;
    }

    let mut conn = Connection::open(path)
        .with_context(|| format!("open ticket store {}", path.display()))?;

    configure_connection(&conn).context("configure sqlite pragmas")?;
    migrations::migrate(&mut conn).context("apply ticket store migrations")?;
    debug!(path = %path.display(), "opened ticket store");

    Ok(SqliteStore { conn })
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}

fn decode(document: &str) -> Result<Ticket, StoreError> {
    Ok(serde_json::from_str(document)?)
}

impl TicketStore for SqliteStore {
    fn insert(&self, draft: NewTicket) -> Result<Ticket, StoreError> {
        let mut rng = rand::thread_rng();

        for attempt in 1..=MAX_ID_ATTEMPTS {
            let ticket = draft.clone().into_ticket(TicketId::generate(&mut rng));
            let document = serde_json::to_string(&ticket)?;

            let inserted = self.conn.execute(
                "INSERT INTO tickets (ticket_id, status, document, created_at_us, updated_at_us)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(ticket_id) DO NOTHING",
                params![
                    ticket.id.as_str(),
                    ticket.status.as_str(),
                    document,
                    ticket.created_at.timestamp_micros(),
                    ticket.updated_at.timestamp_micros(),
                ],
            )?;

            if inserted == 1 {
                return Ok(ticket);
            }
            warn!(attempt, id = %ticket.id, "ticket id collision, drawing another");
        }

        Err(StoreError::IdExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    fn find(&self, query: &TicketQuery) -> Result<Vec<Ticket>, StoreError> {
        let where_clause = if query.status.is_some() {
            " WHERE status = ?1"
        } else {
            ""
        };
        let sql = format!(
            "SELECT document FROM tickets{where_clause} {}",
            query.sort.sql_clause()
        );
        debug!(status = ?query.status, sort = %query.sort, "finding tickets");

        let mut stmt = self.conn.prepare(&sql)?;
        let documents = stmt
            .query_map(params_from_iter(query.status.iter()), |row| {
                row.get::<_, String>(0)
            })?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        documents.iter().map(|doc| decode(doc)).collect()
    }

    fn find_by_id(&self, id: &str) -> Result<Ticket, StoreError> {
        let parsed = TicketId::parse(id).map_err(|_| StoreError::MalformedId { id: id.to_string() })?;

        let document: Option<String> = self
            .conn
            .query_row(
                "SELECT document FROM tickets WHERE ticket_id = ?1",
                params![parsed.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match document {
            Some(doc) => decode(&doc),
            None => Err(StoreError::NotFound { id: id.to_string() }),
        }
    }

    fn save(&self, ticket: &Ticket) -> Result<Ticket, StoreError> {
        let document = serde_json::to_string(ticket)?;

        let updated = self.conn.execute(
            "UPDATE tickets
             SET status = ?2, document = ?3, created_at_us = ?4, updated_at_us = ?5
             WHERE ticket_id = ?1",
            params![
                ticket.id.as_str(),
                ticket.status.as_str(),
                document,
                ticket.created_at.timestamp_micros(),
                ticket.updated_at.timestamp_micros(),
            ],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound {
                id: ticket.id.to_string(),
            });
        }
        Ok(ticket.clone())
    }
}
