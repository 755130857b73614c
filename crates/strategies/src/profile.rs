//! Preference-profile extraction.
//!
//! Builds the normalized [`Profile`] every strategy scores against from a
//! learner snapshot. Extraction is a pure function: no catalog queries, no
//! failure cases. A learner with no interests and nothing saved gets a
//! profile with empty sets, which downstream scorers treat as "no boost",
//! never as a veto.

use catalog::{Learner, LearnerId, OfferingRef, Stage};
use std::collections::HashSet;

/// Normalized view of a learner used by all scoring strategies
#[derive(Debug, Clone)]
pub struct Profile {
    pub learner_id: LearnerId,
    pub stage: Stage,
    /// Declared interests as the learner wrote them; matching lowercases
    pub interests: Vec<String>,
    /// Everything the learner has saved, across both offering kinds
    pub saved: HashSet<OfferingRef>,
}

impl Profile {
    pub fn has_saved(&self, offering: OfferingRef) -> bool {
        self.saved.contains(&offering)
    }
}

/// Build a [`Profile`] from a learner snapshot
pub fn extract_profile(learner: &Learner) -> Profile {
    Profile {
        learner_id: learner.id,
        stage: learner.stage.clone(),
        interests: learner.interests.clone(),
        saved: learner.saved_refs().into_iter().collect(),
    }
}
