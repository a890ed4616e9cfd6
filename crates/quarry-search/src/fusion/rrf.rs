//! Reciprocal Rank Fusion scoring.
//!
//! RRF merges ranked lists without calibrating their heterogeneous native
//! scores: each document scores the sum of `1 / (k + rank)` over the lists
//! it appears in. A document absent from a list contributes nothing for
//! that list — absence is never back-filled with a fabricated worst rank,
//! which would penalize documents strong in only one method.
//!
//! The smoothing constant `k` (conventionally 60) damps the gap between
//! adjacent high ranks.

#![allow(clippy::module_name_repetitions)]

use crate::rank::RankedList;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Default RRF smoothing constant.
pub const DEFAULT_RRF_K: usize = 60;

/// A document after fusion, carrying its per-source ranks for
/// explainability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FusedHit {
    /// Stable document identifier.
    pub doc_id: String,
    /// RRF aggregate score.
    pub score: f64,
    /// 1-based rank in the lexical list; `None` when absent from it.
    pub lexical_rank: Option<usize>,
    /// 1-based rank in the semantic list; `None` when absent from it.
    pub semantic_rank: Option<usize>,
}

/// Fuse a lexical and a semantic ranked list with RRF.
///
/// Returns the union of both lists ordered by descending fused score, ties
/// broken by `doc_id` ascending. The result is a pure function of the two
/// lists and `k`: no I/O, no hidden state.
#[must_use]
pub fn rrf_fuse(lexical: &RankedList, semantic: &RankedList, k: usize) -> Vec<FusedHit> {
    let mut ranks: BTreeMap<&str, (Option<usize>, Option<usize>)> = BTreeMap::new();

    for hit in lexical.hits() {
        ranks.entry(hit.doc_id.as_str()).or_default().0 = Some(hit.rank);
    }
    for hit in semantic.hits() {
        ranks.entry(hit.doc_id.as_str()).or_default().1 = Some(hit.rank);
    }

    let mut fused: Vec<FusedHit> = ranks
        .into_iter()
        .map(|(doc_id, (lexical_rank, semantic_rank))| FusedHit {
            doc_id: doc_id.to_string(),
            score: rrf_contribution(lexical_rank, k) + rrf_contribution(semantic_rank, k),
            lexical_rank,
            semantic_rank,
        })
        .collect();

    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });

    fused
}

/// `1 / (k + rank)` for a present document, 0 for an absent one.
fn rrf_contribution(rank: Option<usize>, k: usize) -> f64 {
    rank.map_or(0.0, |r| 1.0 / (k as f64 + r as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::SearchMethod;

    fn ranked(method: SearchMethod, ids: &[&str]) -> RankedList {
        // Descending synthetic scores preserve the given order.
        let scored = ids
            .iter()
            .enumerate()
            .map(|(idx, id)| ((*id).to_string(), 1000.0 - idx as f64))
            .collect();
        RankedList::from_scored(method, scored)
    }

    fn lex(ids: &[&str]) -> RankedList {
        ranked(SearchMethod::FtsBm25, ids)
    }

    fn sem(ids: &[&str]) -> RankedList {
        ranked(SearchMethod::Semantic, ids)
    }

    #[test]
    fn both_lists_empty_fuses_to_empty() {
        let fused = rrf_fuse(&lex(&[]), &sem(&[]), DEFAULT_RRF_K);
        assert!(fused.is_empty());
    }

    #[test]
    fn worked_scenario_orders_b_a_d_c() {
        // lex = [A, B, C], sem = [B, D, A], k = 60:
        //   B: 1/62 + 1/61 = 0.03278...
        //   A: 1/61 + 1/63 = 0.03227...
        //   D: 1/62       = 0.01613...
        //   C: 1/63       = 0.01587...
        let fused = rrf_fuse(&lex(&["A", "B", "C"]), &sem(&["B", "D", "A"]), 60);

        let ids: Vec<&str> = fused.iter().map(|h| h.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A", "D", "C"]);

        assert!((fused[0].score - (1.0 / 62.0 + 1.0 / 61.0)).abs() < 1e-12);
        assert!((fused[1].score - (1.0 / 61.0 + 1.0 / 63.0)).abs() < 1e-12);
        assert!((fused[2].score - 1.0 / 62.0).abs() < 1e-12);
        assert!((fused[3].score - 1.0 / 63.0).abs() < 1e-12);
    }

    #[test]
    fn carries_contributing_ranks() {
        let fused = rrf_fuse(&lex(&["A", "B"]), &sem(&["B"]), 60);

        let a = fused.iter().find(|h| h.doc_id == "A").expect("A fused");
        assert_eq!(a.lexical_rank, Some(1));
        assert_eq!(a.semantic_rank, None);

        let b = fused.iter().find(|h| h.doc_id == "B").expect("B fused");
        assert_eq!(b.lexical_rank, Some(2));
        assert_eq!(b.semantic_rank, Some(1));
    }

    #[test]
    fn absence_contributes_zero_not_worst_rank() {
        // "only" appears at rank 1 in one long lexical list; if absence were
        // back-filled with a worst rank its score would shift with the other
        // list's length. It must be exactly 1/(k+1).
        let fused = rrf_fuse(
            &lex(&["only"]),
            &sem(&["x1", "x2", "x3", "x4", "x5", "x6", "x7", "x8"]),
            60,
        );

        let only = fused.iter().find(|h| h.doc_id == "only").expect("fused");
        assert!((only.score - 1.0 / 61.0).abs() < 1e-12);
    }

    #[test]
    fn agreement_beats_single_list_rank_one() {
        // A document at rank 1 in both lists must strictly outscore one at
        // rank 1 in a single list: 2/(k+1) > 1/(k+1).
        let agreed = rrf_fuse(&lex(&["both"]), &sem(&["both"]), 60);
        let alone = rrf_fuse(&lex(&["solo"]), &sem(&[]), 60);

        assert!((agreed[0].score - 2.0 / 61.0).abs() < 1e-12);
        assert!((alone[0].score - 1.0 / 61.0).abs() < 1e-12);
        assert!(agreed[0].score > alone[0].score);
    }

    #[test]
    fn disjoint_lists_tie_break_by_doc_id() {
        let fused = rrf_fuse(&lex(&["zed"]), &sem(&["alpha"]), 60);

        // Both score 1/61; alpha wins the tie lexicographically.
        assert_eq!(fused[0].doc_id, "alpha");
        assert_eq!(fused[1].doc_id, "zed");
        assert!((fused[0].score - fused[1].score).abs() < 1e-15);
    }

    #[test]
    fn commutative_over_source_order() {
        let a = lex(&["A", "B", "C"]);
        let b = sem(&["B", "D", "A"]);

        let forward = rrf_fuse(&a, &b, 60);
        let swapped = rrf_fuse(&lex(&["B", "D", "A"]), &sem(&["A", "B", "C"]), 60);

        let forward_ids: Vec<&str> = forward.iter().map(|h| h.doc_id.as_str()).collect();
        let swapped_ids: Vec<&str> = swapped.iter().map(|h| h.doc_id.as_str()).collect();
        assert_eq!(forward_ids, swapped_ids);

        for (f, s) in forward.iter().zip(&swapped) {
            assert!((f.score - s.score).abs() < 1e-15);
            assert_eq!(f.lexical_rank, s.semantic_rank);
            assert_eq!(f.semantic_rank, s.lexical_rank);
        }
    }

    #[test]
    fn lower_k_amplifies_rank_impact() {
        let k10 = rrf_fuse(&lex(&["A"]), &sem(&[]), 10);
        let k60 = rrf_fuse(&lex(&["A"]), &sem(&[]), 60);
        assert!(k10[0].score > k60[0].score);
    }
}
