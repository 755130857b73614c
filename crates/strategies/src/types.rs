//! Shared types produced and consumed by scoring strategies.

use catalog::{Examination, OfferingRef, Opportunity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which algorithm produced a scored candidate.
///
/// `Hybrid` only ever appears after the merger combines entries from two
/// or more strategies for the same offering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    RuleBased,
    ContentBased,
    Collaborative,
    Hybrid,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::RuleBased => write!(f, "rule_based"),
            StrategyKind::ContentBased => write!(f, "content_based"),
            StrategyKind::Collaborative => write!(f, "collaborative"),
            StrategyKind::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// One human-readable contribution to a candidate's score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reason {
    pub text: String,
    pub weight: f32,
}

impl Reason {
    pub fn new(text: impl Into<String>, weight: f32) -> Self {
        Self {
            text: text.into(),
            weight,
        }
    }
}

/// A candidate offering with the score a strategy assigned it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub offering: OfferingRef,
    /// Always within [0, 1]; the constructor clamps
    pub score: f32,
    pub reasons: Vec<Reason>,
    pub strategy: StrategyKind,
}

impl ScoredCandidate {
    pub fn new(offering: OfferingRef, strategy: StrategyKind, score: f32) -> Self {
        Self {
            offering,
            score: score.clamp(0.0, 1.0),
            reasons: Vec::new(),
            strategy,
        }
    }
}

/// Snapshot of the currently eligible offerings, fetched once per
/// generation run and shared read-only across all strategies
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    pub examinations: Vec<Examination>,
    pub opportunities: Vec<Opportunity>,
}

impl CandidatePool {
    pub fn len(&self) -> usize {
        self.examinations.len() + self.opportunities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examinations.is_empty() && self.opportunities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scored_candidate_clamps_into_unit_interval() {
        let over = ScoredCandidate::new(OfferingRef::examination(1), StrategyKind::RuleBased, 1.1);
        assert_eq!(over.score, 1.0);

        let under =
            ScoredCandidate::new(OfferingRef::opportunity(2), StrategyKind::Collaborative, -0.2);
        assert_eq!(under.score, 0.0);
    }
}
