//! Embedding provider contract and corpus embedding sweep.
//!
//! The provider itself is opaque: anything that maps text to a
//! fixed-dimension vector can back semantic search. The sweep keeps
//! `doc_embeddings` current by hashing document bodies and re-embedding
//! only rows whose content changed.

use anyhow::{Context, Result, bail};
use quarry_store::db::ingest::all_documents;
use rusqlite::{Connection, OptionalExtension, params};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Maps text to a fixed-dimension dense vector.
///
/// Implementations must be deterministic for identical input within a
/// session; cross-session drift is tolerated but untested.
pub trait Embedder {
    /// Dimensionality of every vector this provider produces.
    fn dim(&self) -> usize;

    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts. The default maps [`Embedder::embed`] over
    /// the slice; providers with real batching should override.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Outcome of an embedding sweep over the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncStats {
    /// Documents embedded (new or changed content).
    pub embedded: usize,
    /// Documents skipped because their content hash was unchanged.
    pub skipped: usize,
}

/// Embed every document whose content changed since the last sweep.
///
/// # Errors
///
/// Returns an error if the provider fails, returns a wrong-dimension
/// vector, or the database cannot be read/written.
pub fn sync_embeddings<E: Embedder + ?Sized>(conn: &Connection, embedder: &E) -> Result<SyncStats> {
    let docs = all_documents(conn).context("load documents for embedding sweep")?;

    let mut stats = SyncStats::default();
    let mut pending: Vec<(String, String, String)> = Vec::new();

    for (doc_id, body) in docs {
        let hash = content_hash_hex(&body);
        if has_same_hash(conn, &doc_id, &hash)? {
            stats.skipped += 1;
            continue;
        }
        pending.push((doc_id, hash, body));
    }

    if pending.is_empty() {
        return Ok(stats);
    }

    let texts: Vec<&str> = pending.iter().map(|(_, _, body)| body.as_str()).collect();
    let embeddings = embedder
        .embed_batch(&texts)
        .context("batch embedding inference failed")?;

    if embeddings.len() != pending.len() {
        bail!(
            "embedding batch length mismatch: expected {}, got {}",
            pending.len(),
            embeddings.len()
        );
    }

    for ((doc_id, hash, _), embedding) in pending.iter().zip(&embeddings) {
        if embedding.len() != embedder.dim() {
            bail!(
                "invalid embedding dimension for document {doc_id}: expected {}, got {}",
                embedder.dim(),
                embedding.len()
            );
        }
        upsert_embedding(conn, doc_id, hash, embedding)?;
        stats.embedded += 1;
    }

    debug!(
        embedded = stats.embedded,
        skipped = stats.skipped,
        "embedding sweep complete"
    );
    Ok(stats)
}

fn has_same_hash(conn: &Connection, doc_id: &str, content_hash: &str) -> Result<bool> {
    let existing = conn
        .query_row(
            "SELECT content_hash FROM doc_embeddings WHERE doc_id = ?1",
            params![doc_id],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .with_context(|| format!("query content hash for document {doc_id}"))?;

    Ok(existing.as_deref() == Some(content_hash))
}

fn upsert_embedding(
    conn: &Connection,
    doc_id: &str,
    content_hash: &str,
    embedding: &[f32],
) -> Result<()> {
    conn.execute(
        "INSERT INTO doc_embeddings (doc_id, content_hash, embedding_json)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(doc_id) DO UPDATE
         SET content_hash = excluded.content_hash,
             embedding_json = excluded.embedding_json",
        params![doc_id, content_hash, encode_embedding_json(embedding)],
    )
    .with_context(|| format!("upsert embedding for document {doc_id}"))?;
    Ok(())
}

fn content_hash_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn encode_embedding_json(embedding: &[f32]) -> String {
    let mut encoded = String::from("[");
    for (idx, value) in embedding.iter().enumerate() {
        if idx != 0 {
            encoded.push(',');
        }
        encoded.push_str(&value.to_string());
    }
    encoded.push(']');
    encoded
}
