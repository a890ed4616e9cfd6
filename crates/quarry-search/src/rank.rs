//! Single-method ranked results.
//!
//! A [`RankedList`] is what each search method hands to fusion: hits ordered
//! by descending native score with deterministic tie-breaking, ranks
//! assigned contiguously from 1. Native scores are method-local (negated
//! BM25 weight, cosine similarity) and are never compared across methods;
//! fusion only consumes the ranks.

use serde::Serialize;
use std::cmp::Ordering;

/// Which search method produced a hit or list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMethod {
    FtsBm25,
    Semantic,
    HybridRrf,
}

impl SearchMethod {
    /// Stable tag used in rendered output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FtsBm25 => "fts_bm25",
            Self::Semantic => "semantic",
            Self::HybridRrf => "hybrid_rrf",
        }
    }
}

/// A single hit within one method's result list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedHit {
    /// Stable document identifier.
    pub doc_id: String,
    /// 1-based position within this list.
    pub rank: usize,
    /// The method's native score; higher is better. Not comparable across
    /// methods.
    pub score: f64,
}

/// An ordered result list produced by exactly one search method.
///
/// Invariants enforced by construction:
/// - hits ordered by descending score, ties broken by `doc_id` ascending
/// - ranks are contiguous integers starting at 1
/// - each `doc_id` appears at most once
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedList {
    method: SearchMethod,
    hits: Vec<RankedHit>,
}

impl RankedList {
    /// Build a ranked list from raw `(doc_id, score)` pairs.
    ///
    /// Sorting and rank assignment happen here so engines only have to
    /// produce scored pairs. Duplicate ids keep their best-scoring entry.
    #[must_use]
    pub fn from_scored(method: SearchMethod, mut scored: Vec<(String, f64)>) -> Self {
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        // First occurrence after sorting is the best-scoring one.
        let mut seen = std::collections::HashSet::new();
        let mut hits = Vec::with_capacity(scored.len());
        for (doc_id, score) in scored {
            if !seen.insert(doc_id.clone()) {
                continue;
            }
            hits.push(RankedHit {
                doc_id,
                rank: hits.len() + 1,
                score,
            });
        }

        Self { method, hits }
    }

    #[must_use]
    pub const fn method(&self) -> SearchMethod {
        self.method
    }

    #[must_use]
    pub fn hits(&self) -> &[RankedHit] {
        &self.hits
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// 1-based rank of `doc_id`, or `None` when absent from this list.
    #[must_use]
    pub fn rank_of(&self, doc_id: &str) -> Option<usize> {
        self.hits
            .iter()
            .find(|hit| hit.doc_id == doc_id)
            .map(|hit| hit.rank)
    }
}
