//! Lexical search over the FTS5 index with BM25 ranking.
//!
//! Scoring is delegated entirely to SQLite's FTS5 `bm25()` (term frequency,
//! inverse document frequency, length normalization); this module does not
//! re-derive the formula. FTS5 reports lower-is-better values, so scores
//! are negated before ranking to keep "higher is better" uniform across
//! methods.
//!
//! User queries are tokenized and each token quoted before reaching MATCH,
//! so raw input can neither inject FTS5 operators (`NEAR`, `NOT`, column
//! filters) nor trip FTS5 syntax errors.

use crate::error::{SearchError, SearchResult};
use crate::rank::{RankedList, SearchMethod};
use anyhow::Context;
use rusqlite::{Connection, params};
use tracing::debug;

/// Execute a BM25 query, returning at most `top_k` hits ordered by
/// descending relevance.
///
/// # Errors
///
/// - [`SearchError::InvalidQuery`] when the query is empty after trimming
/// - [`SearchError::InvalidParameters`] when `top_k` is zero
/// - [`SearchError::IndexUnavailable`] when the FTS index cannot be queried
pub fn search_bm25(conn: &Connection, query: &str, top_k: usize) -> SearchResult<RankedList> {
    let match_expr = validate_and_quote(query, top_k)?;

    let scored = run_bm25(conn, &match_expr, top_k).map_err(SearchError::index)?;
    debug!(hits = scored.len(), top_k, "bm25 search complete");

    Ok(RankedList::from_scored(SearchMethod::FtsBm25, scored))
}

fn run_bm25(conn: &Connection, match_expr: &str, top_k: usize) -> anyhow::Result<Vec<(String, f64)>> {
    let sql = "SELECT doc_id, -bm25(documents_fts) AS score \
               FROM documents_fts \
               WHERE documents_fts MATCH ?1 \
               ORDER BY score DESC, doc_id ASC \
               LIMIT ?2";

    let mut stmt = conn.prepare(sql).context("prepare FTS5 BM25 query")?;

    let rows = stmt
        .query_map(params![match_expr, top_k as i64], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })
        .with_context(|| format!("execute FTS5 search for '{match_expr}'"))?;

    let mut scored = Vec::new();
    for row in rows {
        scored.push(row.context("read FTS5 search hit")?);
    }
    Ok(scored)
}

/// Validate query/parameters and build a sanitized FTS5 MATCH expression.
pub(crate) fn validate_and_quote(query: &str, top_k: usize) -> SearchResult<String> {
    if top_k == 0 {
        return Err(SearchError::invalid_parameters("top_k must be >= 1"));
    }

    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(SearchError::invalid_query("query is empty after trimming"));
    }

    let match_expr = fts_match_expression(trimmed);
    if match_expr.is_empty() {
        return Err(SearchError::invalid_query(
            "query contains no searchable tokens",
        ));
    }

    Ok(match_expr)
}

/// Quote each whitespace-separated token as an FTS5 string literal and
/// join with OR.
///
/// OR keeps BM25's any-term scoring: a document matching more query terms
/// accumulates more weight without excluding single-term matches (FTS5's
/// implicit AND would drop them). Quote characters are stripped from
/// tokens; an all-quotes query ends up empty and is rejected by the
/// caller.
fn fts_match_expression(query: &str) -> String {
    let mut expr = String::new();
    for token in query.split_whitespace() {
        let cleaned: String = token.chars().filter(|c| *c != '"').collect();
        if cleaned.is_empty() {
            continue;
        }
        if !expr.is_empty() {
            expr.push_str(" OR ");
        }
        expr.push('"');
        expr.push_str(&cleaned);
        expr.push('"');
    }
    expr
}
