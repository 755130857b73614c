//! In-memory catalog index.
//!
//! `CatalogIndex` stands in for the external collaborators the engine
//! consumes: the offering catalog (read candidate offerings) and the
//! learner directory (lookup by id, find learners by overlapping
//! interests). The engine only ever reads through it.

use crate::types::{
    Examination, Learner, LearnerId, OfferingId, OfferingKind, OfferingRef, Opportunity, Timestamp,
};
use std::collections::HashMap;

/// Read-only view of learners and currently known offerings.
///
/// Fetch methods return clones of the matching records: the caller gets a
/// snapshot it can hand to scorers running on other threads without
/// holding any reference into the index.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    learners: HashMap<LearnerId, Learner>,
    examinations: HashMap<OfferingId, Examination>,
    opportunities: HashMap<OfferingId, Opportunity>,
}

impl CatalogIndex {
    /// Creates a new, empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    // Getters

    /// Get a learner by id
    pub fn learner(&self, id: LearnerId) -> Option<&Learner> {
        self.learners.get(&id)
    }

    /// Get an examination by id
    pub fn examination(&self, id: OfferingId) -> Option<&Examination> {
        self.examinations.get(&id)
    }

    /// Get an opportunity by id
    pub fn opportunity(&self, id: OfferingId) -> Option<&Opportunity> {
        self.opportunities.get(&id)
    }

    /// Display name for an offering of either kind
    pub fn offering_name(&self, offering: OfferingRef) -> Option<&str> {
        match offering.kind {
            OfferingKind::Examination => {
                self.examination(offering.id).map(|e| e.name.as_str())
            }
            OfferingKind::Opportunity => {
                self.opportunity(offering.id).map(|o| o.title.as_str())
            }
        }
    }

    /// Fetch up to `limit` active examinations whose deadline has not
    /// passed, in ascending id order.
    ///
    /// A short or empty result is a normal outcome, not an error.
    pub fn active_examinations(&self, now: Timestamp, limit: usize) -> Vec<Examination> {
        let mut exams: Vec<Examination> = self
            .examinations
            .values()
            .filter(|e| e.active && e.deadline > now)
            .cloned()
            .collect();
        exams.sort_by_key(|e| e.id);
        exams.truncate(limit);
        exams
    }

    /// Fetch up to `limit` active opportunities whose deadline has not
    /// passed, in ascending id order.
    pub fn active_opportunities(&self, now: Timestamp, limit: usize) -> Vec<Opportunity> {
        let mut opps: Vec<Opportunity> = self
            .opportunities
            .values()
            .filter(|o| o.active && o.deadline > now)
            .cloned()
            .collect();
        opps.sort_by_key(|o| o.id);
        opps.truncate(limit);
        opps
    }

    /// Find up to `cap` learners whose declared interests intersect the
    /// given interests (case-insensitive), excluding `exclude`.
    ///
    /// Results are in ascending learner-id order so callers see a
    /// deterministic neighbor set.
    pub fn learners_with_overlapping_interests(
        &self,
        interests: &[String],
        exclude: LearnerId,
        cap: usize,
    ) -> Vec<&Learner> {
        if interests.is_empty() {
            return Vec::new();
        }

        let wanted: Vec<String> = interests.iter().map(|i| i.to_lowercase()).collect();

        let mut neighbors: Vec<&Learner> = self
            .learners
            .values()
            .filter(|l| l.id != exclude)
            .filter(|l| {
                l.interests
                    .iter()
                    .any(|i| wanted.contains(&i.to_lowercase()))
            })
            .collect();
        neighbors.sort_by_key(|l| l.id);
        neighbors.truncate(cap);
        neighbors
    }

    /// All known learner ids in ascending order
    pub fn learner_ids(&self) -> Vec<LearnerId> {
        let mut ids: Vec<LearnerId> = self.learners.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    // Mutators - used while seeding the catalog

    /// Insert a learner into the catalog
    pub fn insert_learner(&mut self, learner: Learner) {
        self.learners.insert(learner.id, learner);
    }

    /// Insert an examination into the catalog
    pub fn insert_examination(&mut self, examination: Examination) {
        self.examinations.insert(examination.id, examination);
    }

    /// Insert an opportunity into the catalog
    pub fn insert_opportunity(&mut self, opportunity: Opportunity) {
        self.opportunities.insert(opportunity.id, opportunity);
    }

    /// Get counts for debugging/validation
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.learners.len(),
            self.examinations.len(),
            self.opportunities.len(),
        )
    }
}
