//! Result rendering.
//!
//! Output formats only govern presentation; they never re-sort, filter, or
//! drop fields. Search semantics are decided long before a hit reaches
//! this module.

#![allow(clippy::module_name_repetitions)]

use crate::fusion::FusedHit;
use crate::rank::{RankedList, SearchMethod};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use tracing::error;

/// How results are rendered for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Aligned plain-text table.
    Table,
    /// JSON array of per-hit records.
    Records,
    /// Newline-delimited JSON, one record per hit.
    Jsonl,
}

#[derive(Debug, Serialize)]
struct RankedRecord<'a> {
    search_method: &'static str,
    doc_id: &'a str,
    rank: usize,
    score: f64,
}

#[derive(Debug, Serialize)]
struct FusedRecord<'a> {
    search_method: &'static str,
    doc_id: &'a str,
    rank: usize,
    score: f64,
    lexical_rank: Option<usize>,
    semantic_rank: Option<usize>,
}

/// Render a single-method result list.
#[must_use]
pub fn render_ranked(list: &RankedList, format: OutputFormat) -> String {
    let records: Vec<RankedRecord<'_>> = list
        .hits()
        .iter()
        .map(|hit| RankedRecord {
            search_method: list.method().as_str(),
            doc_id: &hit.doc_id,
            rank: hit.rank,
            score: hit.score,
        })
        .collect();

    match format {
        OutputFormat::Table => {
            let rows = records
                .iter()
                .map(|r| {
                    [
                        r.search_method.to_string(),
                        r.doc_id.to_string(),
                        r.rank.to_string(),
                        format_score(r.score),
                    ]
                })
                .collect::<Vec<_>>();
            render_table(&["search_method", "doc_id", "rank", "score"], &rows)
        }
        OutputFormat::Records => json_array(&records),
        OutputFormat::Jsonl => json_lines(&records),
    }
}

/// Render a fused result list. The `rank` column is the final fused
/// position; per-source ranks ride along for explainability.
#[must_use]
pub fn render_fused(hits: &[FusedHit], format: OutputFormat) -> String {
    let records: Vec<FusedRecord<'_>> = hits
        .iter()
        .enumerate()
        .map(|(idx, hit)| FusedRecord {
            search_method: SearchMethod::HybridRrf.as_str(),
            doc_id: &hit.doc_id,
            rank: idx + 1,
            score: hit.score,
            lexical_rank: hit.lexical_rank,
            semantic_rank: hit.semantic_rank,
        })
        .collect();

    match format {
        OutputFormat::Table => {
            let rows = records
                .iter()
                .map(|r| {
                    [
                        r.search_method.to_string(),
                        r.doc_id.to_string(),
                        r.rank.to_string(),
                        format_score(r.score),
                        opt_rank(r.lexical_rank),
                        opt_rank(r.semantic_rank),
                    ]
                })
                .collect::<Vec<_>>();
            render_table(
                &[
                    "search_method",
                    "doc_id",
                    "rank",
                    "score",
                    "lexical_rank",
                    "semantic_rank",
                ],
                &rows,
            )
        }
        OutputFormat::Records => json_array(&records),
        OutputFormat::Jsonl => json_lines(&records),
    }
}

fn opt_rank(rank: Option<usize>) -> String {
    rank.map_or_else(|| "-".to_string(), |r| r.to_string())
}

fn format_score(score: f64) -> String {
    format!("{score:.6}")
}

fn render_table<const N: usize>(headers: &[&str; N], rows: &[[String; N]]) -> String {
    let mut widths: [usize; N] = [0; N];
    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = header.len();
    }
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.len());
        }
    }

    let mut out = String::new();
    for (idx, header) in headers.iter().enumerate() {
        if idx > 0 {
            out.push_str("  ");
        }
        let _ = write!(out, "{header:<width$}", width = widths[idx]);
    }
    out.push('\n');

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            if idx > 0 {
                out.push_str("  ");
            }
            let _ = write!(out, "{cell:<width$}", width = widths[idx]);
        }
        out.push('\n');
    }
    out
}

fn json_array<T: Serialize>(records: &[T]) -> String {
    serde_json::to_string_pretty(records).unwrap_or_else(|err| {
        error!("failed to serialize result records: {err}");
        String::from("[]")
    })
}

fn json_lines<T: Serialize>(records: &[T]) -> String {
    let mut out = String::new();
    for record in records {
        match serde_json::to_string(record) {
            Ok(line) => {
                out.push_str(&line);
                out.push('\n');
            }
            Err(err) => error!("failed to serialize result record: {err}"),
        }
    }
    out
}
