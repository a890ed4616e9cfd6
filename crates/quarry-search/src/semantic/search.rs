//! Semantic KNN search over stored document embeddings.
//!
//! Uses sqlite-vec's `vec_distance_cosine` when the extension is loaded,
//! otherwise an exhaustive pure-Rust cosine scan. Both paths normalize to
//! a similarity in `[0, 1]` so "better" always sorts first, and both
//! tolerate unusable embedding rows: the scan skips them one by one, while
//! the vec path defers the whole query to the scan when a row cannot be
//! evaluated.

#![allow(clippy::module_name_repetitions)]

use crate::error::{SearchError, SearchResult};
use crate::rank::{RankedList, SearchMethod};
use crate::semantic::embed::{Embedder, encode_embedding_json};
use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use std::cmp::Ordering;
use tracing::debug;

/// Embed the query and return at most `top_k` nearest documents ordered by
/// descending similarity.
///
/// # Errors
///
/// - [`SearchError::InvalidQuery`] when the query is empty after trimming
/// - [`SearchError::InvalidParameters`] when `top_k` is zero
/// - [`SearchError::EmbeddingFailure`] when the provider errors or returns
///   a vector of unexpected dimensionality
/// - [`SearchError::IndexUnavailable`] when the vector index cannot be
///   queried
pub fn search_semantic<E: Embedder + ?Sized>(
    conn: &Connection,
    embedder: &E,
    query: &str,
    top_k: usize,
) -> SearchResult<RankedList> {
    if top_k == 0 {
        return Err(SearchError::invalid_parameters("top_k must be >= 1"));
    }
    if query.trim().is_empty() {
        return Err(SearchError::invalid_query("query is empty after trimming"));
    }

    let embedding = embedder.embed(query).map_err(SearchError::embedding)?;
    if embedding.len() != embedder.dim() {
        return Err(SearchError::embedding(anyhow!(
            "query embedding dimension mismatch: expected {}, got {}",
            embedder.dim(),
            embedding.len()
        )));
    }

    let scored = knn_scored(conn, &embedding, top_k).map_err(SearchError::index)?;
    debug!(hits = scored.len(), top_k, "semantic search complete");

    Ok(RankedList::from_scored(SearchMethod::Semantic, scored))
}

/// Nearest neighbors as `(doc_id, similarity)` pairs, best first.
fn knn_scored(
    conn: &Connection,
    query_embedding: &[f32],
    limit: usize,
) -> Result<Vec<(String, f64)>> {
    if let Some(scored) = try_knn_sqlite_vec(conn, query_embedding, limit)? {
        return Ok(scored);
    }
    knn_cosine_scan(conn, query_embedding, limit)
}

fn try_knn_sqlite_vec(
    conn: &Connection,
    query_embedding: &[f32],
    limit: usize,
) -> Result<Option<Vec<(String, f64)>>> {
    let vec_available = conn
        .query_row("SELECT vec_version()", [], |row| row.get::<_, String>(0))
        .is_ok();
    if !vec_available {
        return Ok(None);
    }

    let query_json = encode_embedding_json(query_embedding);
    // No SQL LIMIT: NULL distances (sqlite-vec surfaces NaN as NULL) sort
    // first under ASC and must not use up result slots, so the limit is
    // applied after filtering. Iteration stops as soon as it is reached.
    let mut stmt = match conn.prepare(
        "SELECT doc_id,
                vec_distance_cosine(vec_f32(embedding_json), vec_f32(?1)) AS distance
         FROM doc_embeddings
         ORDER BY distance ASC, doc_id ASC",
    ) {
        Ok(stmt) => stmt,
        Err(err) => {
            debug!("sqlite-vec KNN unavailable, falling back to cosine scan: {err}");
            return Ok(None);
        }
    };

    let rows = match stmt.query_map(rusqlite::params![query_json], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, Option<f64>>(1)?))
    }) {
        Ok(rows) => rows,
        Err(err) => {
            debug!("sqlite-vec KNN query failed, falling back to cosine scan: {err}");
            return Ok(None);
        }
    };

    let mut scored = Vec::new();
    for row in rows {
        let (doc_id, distance) = match row {
            Ok(pair) => pair,
            Err(err) => {
                // vec_f32 rejects malformed embedding rows mid-statement;
                // the scan path skips such rows individually.
                debug!("sqlite-vec KNN row failed, falling back to cosine scan: {err}");
                return Ok(None);
            }
        };
        let Some(distance) = distance else {
            debug!("skipping null distance for {doc_id}");
            continue;
        };
        if !distance.is_finite() {
            debug!("skipping non-finite distance for {doc_id}");
            continue;
        }
        // Cosine distance lies in [0, 2]; map to similarity in [0, 1].
        let similarity = (1.0 - distance / 2.0).clamp(0.0, 1.0);
        scored.push((doc_id, similarity));
        if scored.len() == limit {
            break;
        }
    }

    Ok(Some(scored))
}

/// Exhaustive fallback scan used when sqlite-vec is not registered.
fn knn_cosine_scan(
    conn: &Connection,
    query_embedding: &[f32],
    limit: usize,
) -> Result<Vec<(String, f64)>> {
    let mut stmt = conn
        .prepare("SELECT doc_id, embedding_json FROM doc_embeddings")
        .context("prepare semantic KNN query (embedding table missing?)")?;

    let rows = stmt
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .context("execute semantic KNN query")?;

    let mut scored = Vec::new();
    for row in rows {
        let (doc_id, embedding_json) = row.context("read semantic KNN row")?;
        let embedding: Vec<f32> = match serde_json::from_str(&embedding_json) {
            Ok(value) => value,
            Err(err) => {
                debug!("skipping malformed embedding row for {doc_id}: {err}");
                continue;
            }
        };

        if embedding.len() != query_embedding.len() {
            debug!(
                "skipping embedding row for {doc_id} with dimension {}",
                embedding.len()
            );
            continue;
        }

        let Some(cosine) = cosine_similarity(query_embedding, &embedding) else {
            continue;
        };
        // Cosine in [-1, 1]; the same [0, 1] mapping as the sqlite-vec path.
        let similarity = f64::from((cosine + 1.0) * 0.5).clamp(0.0, 1.0);
        scored.push((doc_id, similarity));
    }

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(limit);

    Ok(scored)
}

fn cosine_similarity(left: &[f32], right: &[f32]) -> Option<f32> {
    if left.len() != right.len() || left.is_empty() {
        return None;
    }

    let mut dot = 0.0_f32;
    let mut left_norm_sq = 0.0_f32;
    let mut right_norm_sq = 0.0_f32;

    for (a, b) in left.iter().zip(right.iter()) {
        dot += a * b;
        left_norm_sq += a * a;
        right_norm_sq += b * b;
    }

    let denom = left_norm_sq.sqrt() * right_norm_sq.sqrt();
    if denom <= f32::EPSILON {
        return None;
    }

    Some((dot / denom).clamp(-1.0, 1.0))
}
