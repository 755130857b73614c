//! The HybridMerger combines the outputs of multiple strategies.
//!
//! ## Algorithm
//! 1. Fold all input lists in order, keying each candidate by its
//!    `OfferingRef` (kind + id)
//! 2. First occurrence of a key is kept as-is, originating strategy intact
//! 3. A repeat key replaces the stored score with the arithmetic mean of
//!    existing and incoming, appends the incoming reasons, and relabels
//!    the entry `hybrid`
//! 4. Sort descending by score and truncate to the cap
//!
//! The sort is stable and no secondary key is applied, so candidates with
//! equal scores keep their first-seen order. Given the same input lists in
//! the same order the merger always produces the same output: it is the
//! single deterministic join point after the parallel strategy fan-out.

use std::collections::HashMap;
use strategies::{ScoredCandidate, StrategyKind};
use catalog::OfferingRef;
use tracing::debug;

/// Maximum entries a merged list may contain
pub const DEFAULT_MERGE_CAP: usize = 50;

/// Merges ranked lists from independent strategies into one
pub struct HybridMerger {
    cap: usize,
}

impl HybridMerger {
    pub fn new() -> Self {
        Self {
            cap: DEFAULT_MERGE_CAP,
        }
    }

    /// Configure the output cap (default: 50)
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    /// Merge the strategy outputs into one ranked, deduplicated list
    pub fn merge(&self, lists: Vec<Vec<ScoredCandidate>>) -> Vec<ScoredCandidate> {
        let input_count: usize = lists.iter().map(|l| l.len()).sum();

        // Entries stay in first-seen order; the map points into the Vec
        let mut merged: Vec<ScoredCandidate> = Vec::new();
        let mut index_of: HashMap<OfferingRef, usize> = HashMap::new();

        for list in lists {
            for candidate in list {
                match index_of.get(&candidate.offering) {
                    Some(&at) => {
                        let existing = &mut merged[at];
                        existing.score = (existing.score + candidate.score) / 2.0;
                        existing.reasons.extend(candidate.reasons);
                        existing.strategy = StrategyKind::Hybrid;
                    }
                    None => {
                        index_of.insert(candidate.offering, merged.len());
                        merged.push(candidate);
                    }
                }
            }
        }

        // Stable sort: equal scores keep first-seen order
        merged.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        merged.truncate(self.cap);

        debug!(
            "merged {} scored candidates into {} entries",
            input_count,
            merged.len()
        );
        merged
    }
}

impl Default for HybridMerger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strategies::Reason;

    fn candidate(
        offering: OfferingRef,
        strategy: StrategyKind,
        score: f32,
        reason: &str,
    ) -> ScoredCandidate {
        let mut c = ScoredCandidate::new(offering, strategy, score);
        c.reasons.push(Reason::new(reason, score));
        c
    }

    #[test]
    fn conflicting_entries_average_to_a_hybrid() {
        let exam = OfferingRef::examination(1);
        let lists = vec![
            vec![candidate(exam, StrategyKind::RuleBased, 0.8, "rules")],
            vec![candidate(exam, StrategyKind::ContentBased, 0.6, "content")],
        ];

        let merged = HybridMerger::new().merge(lists);
        assert_eq!(merged.len(), 1);
        assert!((merged[0].score - 0.7).abs() < 1e-6);
        assert_eq!(merged[0].strategy, StrategyKind::Hybrid);
        assert_eq!(merged[0].reasons.len(), 2);
    }

    #[test]
    fn unique_entries_keep_their_strategy_and_reasons() {
        let lists = vec![
            vec![candidate(
                OfferingRef::examination(1),
                StrategyKind::RuleBased,
                0.9,
                "rules",
            )],
            vec![candidate(
                OfferingRef::opportunity(2),
                StrategyKind::Collaborative,
                0.8,
                "neighbors",
            )],
        ];

        let merged = HybridMerger::new().merge(lists);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].strategy, StrategyKind::RuleBased);
        assert_eq!(merged[1].strategy, StrategyKind::Collaborative);
    }

    #[test]
    fn same_numeric_id_across_kinds_does_not_collide() {
        let lists = vec![
            vec![candidate(
                OfferingRef::examination(7),
                StrategyKind::RuleBased,
                0.9,
                "rules",
            )],
            vec![candidate(
                OfferingRef::opportunity(7),
                StrategyKind::RuleBased,
                0.8,
                "rules",
            )],
        ];

        let merged = HybridMerger::new().merge(lists);
        assert_eq!(merged.len(), 2, "kind is part of the key");
    }

    #[test]
    fn equal_scores_preserve_first_seen_order() {
        let lists = vec![vec![
            candidate(OfferingRef::examination(3), StrategyKind::RuleBased, 0.8, "a"),
            candidate(OfferingRef::examination(1), StrategyKind::RuleBased, 0.8, "b"),
            candidate(OfferingRef::examination(2), StrategyKind::RuleBased, 0.8, "c"),
        ]];

        let merged = HybridMerger::new().merge(lists);
        let ids: Vec<u32> = merged.iter().map(|c| c.offering.id).collect();
        assert_eq!(ids, vec![3, 1, 2], "no secondary sort key");
    }

    #[test]
    fn merge_is_deterministic_for_identical_inputs() {
        let make_lists = || {
            vec![
                vec![
                    candidate(OfferingRef::examination(1), StrategyKind::RuleBased, 0.8, "a"),
                    candidate(OfferingRef::examination(2), StrategyKind::RuleBased, 0.7, "b"),
                ],
                vec![
                    candidate(OfferingRef::examination(2), StrategyKind::ContentBased, 0.9, "c"),
                    candidate(OfferingRef::opportunity(3), StrategyKind::ContentBased, 0.7, "d"),
                ],
            ]
        };

        let merger = HybridMerger::new();
        let first = merger.merge(make_lists());
        let second = merger.merge(make_lists());

        let flatten = |out: &[ScoredCandidate]| {
            out.iter()
                .map(|c| (c.offering, c.score, c.strategy))
                .collect::<Vec<_>>()
        };
        assert_eq!(flatten(&first), flatten(&second));
    }

    #[test]
    fn output_is_truncated_to_the_cap() {
        let list: Vec<ScoredCandidate> = (0..10)
            .map(|id| {
                candidate(
                    OfferingRef::examination(id),
                    StrategyKind::RuleBased,
                    0.9 - id as f32 * 0.01,
                    "r",
                )
            })
            .collect();

        let merged = HybridMerger::new().with_cap(3).merge(vec![list]);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].offering, OfferingRef::examination(0));
    }

    #[test]
    fn empty_input_merges_to_empty() {
        let merged = HybridMerger::new().merge(vec![vec![], vec![]]);
        assert!(merged.is_empty());
    }
}
