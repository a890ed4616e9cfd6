//! Document ingest.
//!
//! The FTS5 lexical index follows automatically via the triggers defined in
//! [`super::schema`]; ingest only touches the `documents` table. Embeddings
//! are written separately by the embedding pipeline in `quarry-search`.

use crate::document::Document;
use anyhow::{Context, Result, bail};
use rusqlite::{Connection, params};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Insert a single document.
///
/// # Errors
///
/// Returns an error for an empty `doc_id`, a duplicate `doc_id`, or any
/// database failure.
pub fn insert_document(conn: &Connection, doc: &Document) -> Result<()> {
    if doc.doc_id.trim().is_empty() {
        bail!("document id must be non-empty");
    }

    conn.execute(
        "INSERT INTO documents (doc_id, body, created_at_us) VALUES (?1, ?2, ?3)",
        params![doc.doc_id, doc.body, now_us()],
    )
    .with_context(|| format!("insert document {}", doc.doc_id))?;

    Ok(())
}

/// Insert a batch of documents inside a single transaction.
///
/// Returns the number of documents inserted. The batch is all-or-nothing:
/// one bad document rolls back the whole insert.
///
/// # Errors
///
/// Returns an error for empty/duplicate ids or any database failure.
pub fn insert_documents(conn: &mut Connection, docs: &[Document]) -> Result<usize> {
    let tx = conn.transaction().context("begin ingest transaction")?;

    for doc in docs {
        if doc.doc_id.trim().is_empty() {
            bail!("document id must be non-empty");
        }
        tx.execute(
            "INSERT INTO documents (doc_id, body, created_at_us) VALUES (?1, ?2, ?3)",
            params![doc.doc_id, doc.body, now_us()],
        )
        .with_context(|| format!("insert document {}", doc.doc_id))?;
    }

    tx.commit().context("commit ingest transaction")?;
    debug!(count = docs.len(), "ingested document batch");

    Ok(docs.len())
}

/// Replace the body of an existing document.
///
/// The FTS index follows via the update trigger; the stored embedding goes
/// stale until the next embedding sweep re-hashes the body.
///
/// # Errors
///
/// Returns an error when the document does not exist or the update fails.
pub fn update_document(conn: &Connection, doc: &Document) -> Result<()> {
    let changed = conn
        .execute(
            "UPDATE documents SET body = ?2 WHERE doc_id = ?1",
            params![doc.doc_id, doc.body],
        )
        .with_context(|| format!("update document {}", doc.doc_id))?;
    if changed == 0 {
        bail!("document {} does not exist", doc.doc_id);
    }
    Ok(())
}

/// Delete a document. The FTS row follows via trigger and the embedding via
/// `ON DELETE CASCADE`. Returns `true` when a row was deleted.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_document(conn: &Connection, doc_id: &str) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM documents WHERE doc_id = ?1", params![doc_id])
        .with_context(|| format!("delete document {doc_id}"))?;
    Ok(deleted > 0)
}

/// Number of documents in the corpus.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn document_count(conn: &Connection) -> Result<u64> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
        .context("count documents")?;
    Ok(u64::try_from(count).unwrap_or(0))
}

/// Load all documents as `(doc_id, body)` pairs, ordered by `doc_id`.
///
/// Used by the embedding pipeline to sweep the corpus.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn all_documents(conn: &Connection) -> Result<Vec<(String, String)>> {
    let mut stmt = conn
        .prepare("SELECT doc_id, body FROM documents ORDER BY doc_id")
        .context("prepare document sweep query")?;

    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .context("execute document sweep query")?;

    let mut docs = Vec::new();
    for row in rows {
        docs.push(row.context("read document row")?);
    }
    Ok(docs)
}

fn now_us() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_micros()).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn insert_document_roundtrip() {
        let conn = open_in_memory().expect("open store");
        insert_document(&conn, &Document::new("d1", "some text")).unwrap();

        assert_eq!(document_count(&conn).unwrap(), 1);
        let docs = all_documents(&conn).unwrap();
        assert_eq!(docs, vec![("d1".to_string(), "some text".to_string())]);
    }

    #[test]
    fn insert_document_rejects_empty_id() {
        let conn = open_in_memory().expect("open store");
        let err = insert_document(&conn, &Document::new("  ", "text")).unwrap_err();
        assert!(err.to_string().contains("non-empty"));
    }

    #[test]
    fn insert_document_rejects_duplicate_id() {
        let conn = open_in_memory().expect("open store");
        insert_document(&conn, &Document::new("d1", "a")).unwrap();
        assert!(insert_document(&conn, &Document::new("d1", "b")).is_err());
    }

    #[test]
    fn insert_documents_is_transactional() {
        let mut conn = open_in_memory().expect("open store");
        let docs = vec![
            Document::new("d1", "first"),
            Document::new("d1", "duplicate id"),
        ];

        assert!(insert_documents(&mut conn, &docs).is_err());
        assert_eq!(document_count(&conn).unwrap(), 0);
    }

    #[test]
    fn update_document_replaces_body_and_fts_entry() {
        let conn = open_in_memory().expect("open store");
        insert_document(&conn, &Document::new("d1", "original phrasing")).unwrap();

        update_document(&conn, &Document::new("d1", "replacement wording")).unwrap();

        let fresh: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM documents_fts WHERE documents_fts MATCH 'replacement'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(fresh, 1);

        let stale: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM documents_fts WHERE documents_fts MATCH 'original'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(stale, 0);
    }

    #[test]
    fn update_document_requires_existing_id() {
        let conn = open_in_memory().expect("open store");
        let err = update_document(&conn, &Document::new("missing", "text")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn delete_document_removes_document_and_fts_row() {
        let conn = open_in_memory().expect("open store");
        insert_document(&conn, &Document::new("d1", "short lived")).unwrap();

        assert!(delete_document(&conn, "d1").unwrap());
        assert_eq!(document_count(&conn).unwrap(), 0);
        assert_eq!(crate::db::fts::fts_row_count(&conn).unwrap(), 0);

        // Second delete is a no-op, not an error.
        assert!(!delete_document(&conn, "d1").unwrap());
    }

    #[test]
    fn insert_documents_batch() {
        let mut conn = open_in_memory().expect("open store");
        let docs = vec![
            Document::new("d1", "first"),
            Document::new("d2", "second"),
            Document::new("d3", "third"),
        ];

        let inserted = insert_documents(&mut conn, &docs).unwrap();
        assert_eq!(inserted, 3);
        assert_eq!(document_count(&conn).unwrap(), 3);
    }
}
