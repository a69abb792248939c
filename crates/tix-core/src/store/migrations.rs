//! Schema upgrades for the ticket store, keyed on `PRAGMA user_version`.

use super::schema;
use rusqlite::Connection;
use tracing::debug;

/// Ordered upgrade steps; step `n` brings the schema to version `n`.
const STEPS: [&str; 2] = [schema::MIGRATION_V1_SQL, schema::MIGRATION_V2_SQL];

/// Schema version a fully migrated store reports.
pub const LATEST_SCHEMA_VERSION: i64 = 2;

/// Version recorded in the database header (0 for a fresh file).
///
/// # Errors
///
/// Returns an error if the pragma cannot be read.
pub fn current_schema_version(conn: &Connection) -> rusqlite::Result<i64> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}

/// Bring the store up to [`LATEST_SCHEMA_VERSION`].
///
/// Each pending step runs in its own transaction together with the version
/// bump, so an interrupted upgrade resumes at the first missing step.
///
/// # Errors
///
/// Returns an error if any step fails; earlier steps stay applied.
pub fn migrate(conn: &mut Connection) -> rusqlite::Result<i64> {
    let from = current_schema_version(conn)?;

    for (version, sql) in (1..).zip(STEPS).skip_while(|(version, _)| *version <= from) {
        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.execute("UPDATE store_meta SET schema_version = ?1 WHERE id = 1", [version])?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
        debug!(version, "ticket store schema upgraded");
    }

    current_schema_version(conn)
}
