//! Property tests for RRF fusion.

use proptest::prelude::*;
use quarry_search::{RankedList, SearchMethod, rrf_fuse};
use std::collections::BTreeSet;

/// A ranked list over a small id vocabulary: any subset, any order.
fn arb_id_order() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(0..16_u8, 0..12).prop_map(|raw| {
        let mut seen = BTreeSet::new();
        raw.into_iter()
            .filter(|id| seen.insert(*id))
            .map(|id| format!("doc-{id:02}"))
            .collect()
    })
}

fn ranked(method: SearchMethod, ids: &[String]) -> RankedList {
    let scored = ids
        .iter()
        .enumerate()
        .map(|(idx, id)| (id.clone(), 1000.0 - idx as f64))
        .collect();
    RankedList::from_scored(method, scored)
}

proptest! {
    #[test]
    fn fusion_is_commutative_over_source_lists(a in arb_id_order(), b in arb_id_order()) {
        let forward = rrf_fuse(
            &ranked(SearchMethod::FtsBm25, &a),
            &ranked(SearchMethod::Semantic, &b),
            60,
        );
        let swapped = rrf_fuse(
            &ranked(SearchMethod::FtsBm25, &b),
            &ranked(SearchMethod::Semantic, &a),
            60,
        );

        prop_assert_eq!(forward.len(), swapped.len());
        for (f, s) in forward.iter().zip(&swapped) {
            prop_assert_eq!(&f.doc_id, &s.doc_id);
            prop_assert!((f.score - s.score).abs() < 1e-12);
            prop_assert_eq!(f.lexical_rank, s.semantic_rank);
            prop_assert_eq!(f.semantic_rank, s.lexical_rank);
        }
    }

    #[test]
    fn fused_output_is_exactly_the_union(a in arb_id_order(), b in arb_id_order()) {
        let fused = rrf_fuse(
            &ranked(SearchMethod::FtsBm25, &a),
            &ranked(SearchMethod::Semantic, &b),
            60,
        );

        let union: BTreeSet<&str> = a.iter().chain(b.iter()).map(String::as_str).collect();
        let fused_ids: BTreeSet<&str> = fused.iter().map(|h| h.doc_id.as_str()).collect();

        prop_assert_eq!(fused_ids, union);
        prop_assert_eq!(fused.len(), fused.iter().map(|h| &h.doc_id).collect::<BTreeSet<_>>().len());
    }

    #[test]
    fn fused_scores_match_contributing_ranks(a in arb_id_order(), b in arb_id_order()) {
        let lex = ranked(SearchMethod::FtsBm25, &a);
        let sem = ranked(SearchMethod::Semantic, &b);
        let fused = rrf_fuse(&lex, &sem, 60);

        for hit in &fused {
            prop_assert_eq!(hit.lexical_rank, lex.rank_of(&hit.doc_id));
            prop_assert_eq!(hit.semantic_rank, sem.rank_of(&hit.doc_id));

            let expected = hit.lexical_rank.map_or(0.0, |r| 1.0 / (60.0 + r as f64))
                + hit.semantic_rank.map_or(0.0, |r| 1.0 / (60.0 + r as f64));
            prop_assert!((hit.score - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn fused_output_is_sorted_desc_with_id_tiebreak(a in arb_id_order(), b in arb_id_order()) {
        let fused = rrf_fuse(
            &ranked(SearchMethod::FtsBm25, &a),
            &ranked(SearchMethod::Semantic, &b),
            60,
        );

        for window in fused.windows(2) {
            let ordered = window[0].score > window[1].score
                || ((window[0].score - window[1].score).abs() < f64::EPSILON
                    && window[0].doc_id < window[1].doc_id);
            prop_assert!(ordered, "unsorted pair: {:?} then {:?}", window[0], window[1]);
        }
    }

    #[test]
    fn ranked_list_ranks_are_contiguous(a in arb_id_order()) {
        let list = ranked(SearchMethod::FtsBm25, &a);
        for (idx, hit) in list.hits().iter().enumerate() {
            prop_assert_eq!(hit.rank, idx + 1);
        }
    }
}
