//! Store schema migrations.
//!
//! Versioning lives in the `store_meta` table, not a SQLite pragma:
//! [`migrate`] bootstraps that table on first contact, then applies every
//! migration newer than the recorded version, each inside its own
//! transaction.

use super::schema;
use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::debug;

/// Schema version this build writes and expects.
pub const LATEST_SCHEMA_VERSION: u32 = 2;

/// Creates the version bookkeeping row; safe to run on every open.
const BOOTSTRAP_SQL: &str = "
CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL
);
INSERT OR IGNORE INTO store_meta (id, schema_version) VALUES (1, 0);
";

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: [Migration; 2] = [
    Migration {
        version: 1,
        name: "documents",
        sql: schema::MIGRATION_V1_SQL,
    },
    Migration {
        version: 2,
        name: "fts-and-embeddings",
        sql: schema::MIGRATION_V2_SQL,
    },
];

/// Schema version recorded in `store_meta`.
///
/// # Errors
///
/// Returns an error when the bookkeeping table is missing (the store was
/// never migrated) or unreadable.
pub fn current_schema_version(conn: &Connection) -> Result<u32> {
    let version: i64 = conn
        .query_row(
            "SELECT schema_version FROM store_meta WHERE id = 1",
            [],
            |row| row.get(0),
        )
        .context("read schema version from store_meta")?;
    u32::try_from(version).with_context(|| format!("schema version {version} out of range"))
}

/// Bring the store up to [`LATEST_SCHEMA_VERSION`] and return the version
/// now recorded.
///
/// # Errors
///
/// Returns an error if bootstrapping or any migration fails; a failed
/// migration rolls back and leaves the recorded version untouched.
pub fn migrate(conn: &mut Connection) -> Result<u32> {
    conn.execute_batch(BOOTSTRAP_SQL)
        .context("bootstrap store_meta")?;

    let mut applied = current_schema_version(conn)?;
    for migration in &MIGRATIONS {
        if migration.version <= applied {
            continue;
        }

        let tx = conn
            .transaction()
            .with_context(|| format!("begin migration '{}'", migration.name))?;
        tx.execute_batch(migration.sql)
            .with_context(|| format!("apply migration '{}'", migration.name))?;
        tx.execute(
            "UPDATE store_meta SET schema_version = ?1 WHERE id = 1",
            [i64::from(migration.version)],
        )
        .with_context(|| format!("record migration '{}'", migration.name))?;
        tx.commit()
            .with_context(|| format!("commit migration '{}'", migration.name))?;

        debug!(
            version = migration.version,
            name = migration.name,
            "applied store migration"
        );
        applied = migration.version;
    }

    Ok(applied)
}
