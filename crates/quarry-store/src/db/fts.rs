//! FTS5 index diagnostics and recovery.
//!
//! The `documents_fts` table is trigger-maintained and should never drift
//! from `documents`. These helpers exist for health checks and for repair
//! after manual surgery on the database file.

#![allow(clippy::module_name_repetitions)]

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Rebuild the FTS5 index from the current `documents` table.
///
/// Drops and recreates all FTS5 index content. Useful when the index is
/// suspected to be out of sync.
///
/// # Errors
///
/// Returns an error if the rebuild SQL fails.
pub fn rebuild_fts_index(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "DELETE FROM documents_fts;
         INSERT INTO documents_fts(rowid, body, doc_id)
         SELECT rowid, body, doc_id FROM documents;",
    )
    .context("rebuild FTS5 index from documents table")?;
    Ok(())
}

/// Return the number of rows in the FTS5 index.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn fts_row_count(conn: &Connection) -> Result<u64> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM documents_fts", [], |row| row.get(0))
        .context("count FTS5 rows")?;
    Ok(u64::try_from(count).unwrap_or(0))
}

/// Validate that the FTS5 index row count matches the `documents` table.
///
/// # Errors
///
/// Returns an error if either count query fails.
pub fn fts_in_sync(conn: &Connection) -> Result<bool> {
    let docs: i64 = conn
        .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
        .context("count documents")?;
    let fts: i64 = conn
        .query_row("SELECT COUNT(*) FROM documents_fts", [], |row| row.get(0))
        .context("count FTS5 rows")?;
    Ok(docs == fts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ingest::insert_document, open_in_memory};
    use crate::document::Document;

    #[test]
    fn fts_row_count_follows_ingest() {
        let conn = open_in_memory().expect("open store");
        assert_eq!(fts_row_count(&conn).unwrap(), 0);

        insert_document(&conn, &Document::new("d1", "alpha")).unwrap();
        insert_document(&conn, &Document::new("d2", "beta")).unwrap();
        assert_eq!(fts_row_count(&conn).unwrap(), 2);
    }

    #[test]
    fn rebuild_restores_dropped_index_content() {
        let conn = open_in_memory().expect("open store");
        insert_document(&conn, &Document::new("d1", "alpha beta")).unwrap();

        conn.execute_batch("DELETE FROM documents_fts").unwrap();
        assert!(!fts_in_sync(&conn).unwrap());

        rebuild_fts_index(&conn).unwrap();
        assert!(fts_in_sync(&conn).unwrap());
        assert_eq!(fts_row_count(&conn).unwrap(), 1);
    }
}
