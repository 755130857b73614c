//! Neighbor-Based (Collaborative) Scorer
//!
//! "Learners with your interests also saved these":
//!
//! ## Algorithm
//! 1. Find up to 20 other learners whose declared interests intersect the
//!    profile's interests (the learner itself is excluded)
//! 2. Count, per offering, how many of those neighbors saved it, skipping
//!    offerings the learner already saved
//! 3. Keep offerings saved by at least 2 neighbors and score them
//!    `min(neighbor_count / neighbor_set_size, 1.0)`
//!
//! This is the only strategy whose candidate universe is other learners'
//! saved items rather than the active catalog: it can never surface an
//! offering no neighbor has chosen. An empty neighbor set yields an empty
//! result, not an error.

use crate::profile::Profile;
use crate::traits::Strategy;
use crate::types::{CandidatePool, Reason, ScoredCandidate, StrategyKind};
use anyhow::Result;
use catalog::{CatalogIndex, OfferingRef};
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Most neighbors considered per run
pub const DEFAULT_MAX_NEIGHBORS: usize = 20;

/// Minimum neighbors that must have saved an offering
pub const DEFAULT_MIN_CO_OCCURRENCE: u32 = 2;

/// Collaborative strategy: co-occurrence among interest neighbors
pub struct CollaborativeStrategy {
    catalog: Arc<CatalogIndex>,
    max_neighbors: usize,
    min_co_occurrence: u32,
}

impl CollaborativeStrategy {
    pub fn new(catalog: Arc<CatalogIndex>) -> Self {
        Self {
            catalog,
            max_neighbors: DEFAULT_MAX_NEIGHBORS,
            min_co_occurrence: DEFAULT_MIN_CO_OCCURRENCE,
        }
    }

    /// Configure the neighbor cap (default: 20)
    pub fn with_max_neighbors(mut self, max: usize) -> Self {
        self.max_neighbors = max;
        self
    }

    /// Configure the co-occurrence minimum (default: 2)
    pub fn with_min_co_occurrence(mut self, min: u32) -> Self {
        self.min_co_occurrence = min;
        self
    }
}

impl Strategy for CollaborativeStrategy {
    fn name(&self) -> &'static str {
        "collaborative"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Collaborative
    }

    #[instrument(skip(self, profile, _pool), fields(learner_id = profile.learner_id))]
    fn score(&self, profile: &Profile, _pool: &CandidatePool) -> Result<Vec<ScoredCandidate>> {
        let neighbors = self.catalog.learners_with_overlapping_interests(
            &profile.interests,
            profile.learner_id,
            self.max_neighbors,
        );
        if neighbors.is_empty() {
            debug!("no interest neighbors found");
            return Ok(Vec::new());
        }
        let neighbor_count = neighbors.len();
        debug!("found {neighbor_count} interest neighbors");

        // Count saves per offering across the neighbor set
        let counts: HashMap<OfferingRef, u32> = neighbors
            .par_iter()
            .fold(HashMap::new, |mut local, neighbor| {
                for offering in neighbor.saved_refs() {
                    if !profile.has_saved(offering) {
                        *local.entry(offering).or_insert(0) += 1;
                    }
                }
                local
            })
            .reduce(HashMap::new, |mut acc, local| {
                for (offering, count) in local {
                    *acc.entry(offering).or_insert(0) += count;
                }
                acc
            });

        let mut candidates: Vec<ScoredCandidate> = counts
            .into_iter()
            .filter(|&(_, count)| count >= self.min_co_occurrence)
            .map(|(offering, count)| {
                let score = (count as f32 / neighbor_count as f32).min(1.0);
                let mut candidate =
                    ScoredCandidate::new(offering, StrategyKind::Collaborative, score);
                candidate.reasons.push(Reason::new(
                    format!("saved by {count} of {neighbor_count} learners with shared interests"),
                    score,
                ));
                candidate
            })
            .collect();

        // HashMap order is arbitrary; fix it so identical inputs always
        // produce identical output
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.offering.cmp(&b.offering))
        });

        debug!("collaborative emitted {} candidates", candidates.len());
        Ok(candidates)
    }
}
