//! SQLite schema for the ticket document store.
//!
//! - `tickets` keeps one JSON document per ticket plus the columns used
//!   to filter and sort (`status`, `created_at_us`, `updated_at_us`)
//! - `store_meta` records the applied schema version

/// Migration v1: document table and store metadata.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS tickets (
    ticket_id TEXT PRIMARY KEY,
    status TEXT NOT NULL CHECK (status IN ('pending', 'accepted', 'resolved', 'rejected')),
    document TEXT NOT NULL CHECK (json_valid(document)),
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL,
    CHECK (ticket_id LIKE 'tk-%')
);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL
);

INSERT OR IGNORE INTO store_meta (id, schema_version) VALUES (1, 1);
";

/// Migration v2: read-path indexes for the two listing orders.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_tickets_created
    ON tickets(created_at_us DESC, ticket_id);

CREATE INDEX IF NOT EXISTS idx_tickets_updated
    ON tickets(updated_at_us DESC, ticket_id);

CREATE INDEX IF NOT EXISTS idx_tickets_status_created
    ON tickets(status, created_at_us DESC);
";

/// Indexes expected after all migrations have run.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_tickets_created",
    "idx_tickets_updated",
    "idx_tickets_status_created",
];
