//! Canonical SQLite schema for the quarry document store.
//!
//! Three surfaces, all kept consistent by the store:
//! - `documents` holds the corpus (opaque id + searchable body)
//! - `documents_fts` is the FTS5 lexical index; triggers mirror every
//!   insert, update, and delete on `documents` into it
//! - `doc_embeddings` holds one JSON-encoded dense vector per document,
//!   written by the embedding pipeline in `quarry-search`
//!
//! Schema version bookkeeping lives in `store_meta`, owned by
//! [`super::migrations`].

/// Migration v1: the documents table.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS documents (
    doc_id TEXT PRIMARY KEY CHECK (length(trim(doc_id)) > 0),
    body TEXT NOT NULL,
    created_at_us INTEGER NOT NULL
);
";

/// Migration v2: FTS5 lexical index with sync triggers, and embedding
/// storage.
///
/// `documents_fts` is a self-contained FTS5 table, so the triggers keep it
/// in sync with plain DML keyed on `rowid`; the FTS5 `'delete'` command is
/// only valid for external-content tables and would abort here.
pub const MIGRATION_V2_SQL: &str = r"
CREATE VIRTUAL TABLE IF NOT EXISTS documents_fts USING fts5(
    body,
    doc_id UNINDEXED,
    tokenize='porter unicode61',
    prefix='2 3'
);

CREATE TRIGGER IF NOT EXISTS documents_ai
AFTER INSERT ON documents
BEGIN
    INSERT INTO documents_fts(rowid, body, doc_id)
    VALUES (new.rowid, new.body, new.doc_id);
END;

CREATE TRIGGER IF NOT EXISTS documents_au
AFTER UPDATE ON documents
BEGIN
    DELETE FROM documents_fts WHERE rowid = old.rowid;

    INSERT INTO documents_fts(rowid, body, doc_id)
    VALUES (new.rowid, new.body, new.doc_id);
END;

CREATE TRIGGER IF NOT EXISTS documents_ad
AFTER DELETE ON documents
BEGIN
    DELETE FROM documents_fts WHERE rowid = old.rowid;
END;

DELETE FROM documents_fts;
INSERT INTO documents_fts(rowid, body, doc_id)
SELECT rowid, body, doc_id FROM documents;

CREATE TABLE IF NOT EXISTS doc_embeddings (
    doc_id TEXT PRIMARY KEY REFERENCES documents(doc_id) ON DELETE CASCADE,
    content_hash TEXT NOT NULL,
    embedding_json TEXT NOT NULL
);
";
