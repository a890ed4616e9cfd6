//! Hybrid retrieval: over-fetch both methods, fuse with RRF, truncate.
//!
//! Failures in either sub-retrieval propagate unchanged — a broken
//! semantic path is never papered over with lexical-only results, so a
//! partial answer is never presented as complete.

#![allow(clippy::module_name_repetitions)]

use crate::error::{SearchError, SearchResult};
use crate::fusion::rrf::{FusedHit, rrf_fuse};
use crate::lexical::search_bm25;
use crate::semantic::{Embedder, search_semantic};
use rusqlite::Connection;
use tracing::debug;

/// Run hybrid retrieval for `query`.
///
/// Both methods are over-fetched to `prefetch_k` (which must be at least
/// `top_k`) so fusion can surface documents that are strong in one method
/// without being top-`top_k` in it alone. The fused union is truncated to
/// `top_k`.
///
/// `prefetch_k < top_k` is rejected rather than clamped; the precondition
/// is part of the contract and silent clamping would hide caller bugs.
///
/// # Errors
///
/// - [`SearchError::InvalidQuery`] when the query is empty after trimming
/// - [`SearchError::InvalidParameters`] when `top_k` is zero or
///   `prefetch_k < top_k`
/// - any failure of the underlying lexical or semantic retrieval,
///   propagated unchanged
pub fn hybrid_rrf<E: Embedder + ?Sized>(
    conn: &Connection,
    embedder: &E,
    query: &str,
    prefetch_k: usize,
    top_k: usize,
    rrf_k: usize,
) -> SearchResult<Vec<FusedHit>> {
    if top_k == 0 {
        return Err(SearchError::invalid_parameters("top_k must be >= 1"));
    }
    if prefetch_k < top_k {
        return Err(SearchError::invalid_parameters(format!(
            "prefetch_k ({prefetch_k}) must be >= top_k ({top_k})"
        )));
    }

    // No data dependency between the two retrievals; each sees a read-only
    // snapshot. Both lists are fully materialized before fusion.
    let lexical = search_bm25(conn, query, prefetch_k)?;
    let semantic = search_semantic(conn, embedder, query, prefetch_k)?;

    let mut fused = rrf_fuse(&lexical, &semantic, rrf_k);
    fused.truncate(top_k);

    debug!(
        lexical = lexical.len(),
        semantic = semantic.len(),
        fused = fused.len(),
        prefetch_k,
        top_k,
        "hybrid retrieval complete"
    );

    Ok(fused)
}
