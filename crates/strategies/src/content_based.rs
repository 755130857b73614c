//! Content-Based Scorer
//!
//! "More like what you already saved": aggregates the facets of a
//! learner's saved offerings into preference sets, then scores every
//! unseen candidate by weighted facet overlap.
//!
//! ## Algorithm
//! 1. Scan saved offerings and collect frequency-free sets of subjects,
//!    skills, domains, tags, organizers, and companies
//! 2. For each candidate the learner has not saved, compute per-facet
//!    overlap `|candidate ∩ preferences| / |candidate|`
//! 3. A facet the candidate does not carry is excluded from both the
//!    weighted sum and the weight denominator
//! 4. similarity = weighted sum / sum of weights actually used
//! 5. Emit candidates whose similarity strictly exceeds the threshold
//!
//! A learner with nothing saved legitimately gets an empty result: the
//! cold-start gap belongs to the other strategies.

use crate::profile::Profile;
use crate::traits::Strategy;
use crate::types::{CandidatePool, Reason, ScoredCandidate, StrategyKind};
use anyhow::Result;
use catalog::{CatalogIndex, Examination, OfferingKind, Opportunity};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Similarity a candidate must strictly exceed to be emitted
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.7;

/// Per-facet weights for the similarity average
#[derive(Debug, Clone)]
pub struct FacetWeights {
    /// Subject overlap for examinations
    pub subjects: f32,
    /// Skill overlap for opportunities
    pub skills: f32,
    pub domain: f32,
    pub tags: f32,
    /// Exact organizer/company match
    pub organization: f32,
}

impl Default for FacetWeights {
    fn default() -> Self {
        Self {
            subjects: 0.4,
            skills: 0.3,
            domain: 0.2,
            tags: 0.2,
            organization: 0.1,
        }
    }
}

/// Facet sets aggregated from a learner's saved offerings, lowercased.
/// Membership only; how often a facet value occurred is deliberately
/// not tracked.
#[derive(Debug, Default)]
struct PreferenceSets {
    subjects: HashSet<String>,
    skills: HashSet<String>,
    domains: HashSet<String>,
    tags: HashSet<String>,
    organizers: HashSet<String>,
    companies: HashSet<String>,
}

/// Content-based strategy: facet similarity to saved offerings
pub struct ContentBasedStrategy {
    catalog: Arc<CatalogIndex>,
    similarity_threshold: f32,
    weights: FacetWeights,
}

impl ContentBasedStrategy {
    pub fn new(catalog: Arc<CatalogIndex>) -> Self {
        Self {
            catalog,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            weights: FacetWeights::default(),
        }
    }

    /// Configure the similarity threshold (default: 0.7)
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Configure the facet weights
    pub fn with_weights(mut self, weights: FacetWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Aggregate the facets of everything the learner has saved
    fn analyze_preferences(&self, profile: &Profile) -> PreferenceSets {
        let mut prefs = PreferenceSets::default();

        for offering in &profile.saved {
            match offering.kind {
                OfferingKind::Examination => {
                    if let Some(exam) = self.catalog.examination(offering.id) {
                        prefs
                            .subjects
                            .extend(exam.subjects.iter().map(|s| s.to_lowercase()));
                        prefs.tags.extend(exam.tags.iter().map(|t| t.to_lowercase()));
                        if let Some(domain) = &exam.domain {
                            prefs.domains.insert(domain.to_lowercase());
                        }
                        if let Some(organizer) = &exam.conducted_by {
                            prefs.organizers.insert(organizer.to_lowercase());
                        }
                    }
                }
                OfferingKind::Opportunity => {
                    if let Some(opportunity) = self.catalog.opportunity(offering.id) {
                        prefs
                            .skills
                            .extend(opportunity.skills.iter().map(|s| s.to_lowercase()));
                        prefs
                            .tags
                            .extend(opportunity.tags.iter().map(|t| t.to_lowercase()));
                        if let Some(domain) = &opportunity.domain {
                            prefs.domains.insert(domain.to_lowercase());
                        }
                        if let Some(company) = &opportunity.company {
                            prefs.companies.insert(company.to_lowercase());
                        }
                    }
                }
            }
        }

        prefs
    }

    fn examination_similarity(&self, prefs: &PreferenceSets, exam: &Examination) -> f32 {
        let mut facets = FacetAccumulator::default();
        facets.add_overlap(&exam.subjects, &prefs.subjects, self.weights.subjects);
        facets.add_exact(exam.domain.as_deref(), &prefs.domains, self.weights.domain);
        facets.add_overlap(&exam.tags, &prefs.tags, self.weights.tags);
        facets.add_exact(
            exam.conducted_by.as_deref(),
            &prefs.organizers,
            self.weights.organization,
        );
        facets.similarity()
    }

    fn opportunity_similarity(&self, prefs: &PreferenceSets, opportunity: &Opportunity) -> f32 {
        let mut facets = FacetAccumulator::default();
        facets.add_overlap(&opportunity.skills, &prefs.skills, self.weights.skills);
        facets.add_exact(
            opportunity.domain.as_deref(),
            &prefs.domains,
            self.weights.domain,
        );
        facets.add_overlap(&opportunity.tags, &prefs.tags, self.weights.tags);
        facets.add_exact(
            opportunity.company.as_deref(),
            &prefs.companies,
            self.weights.organization,
        );
        facets.similarity()
    }

    fn emit(&self, offering: catalog::OfferingRef, similarity: f32) -> Option<ScoredCandidate> {
        if similarity > self.similarity_threshold {
            let mut candidate =
                ScoredCandidate::new(offering, StrategyKind::ContentBased, similarity);
            candidate.reasons.push(Reason::new(
                format!(
                    "{:.0}% similar to offerings you saved",
                    similarity * 100.0
                ),
                similarity,
            ));
            Some(candidate)
        } else {
            None
        }
    }
}

impl Strategy for ContentBasedStrategy {
    fn name(&self) -> &'static str {
        "content-based"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::ContentBased
    }

    #[instrument(skip(self, profile, pool), fields(learner_id = profile.learner_id))]
    fn score(&self, profile: &Profile, pool: &CandidatePool) -> Result<Vec<ScoredCandidate>> {
        if profile.saved.is_empty() {
            debug!("nothing saved yet; content-based has no signal");
            return Ok(Vec::new());
        }

        let prefs = self.analyze_preferences(profile);

        let mut candidates: Vec<ScoredCandidate> = pool
            .examinations
            .iter()
            .filter(|exam| !profile.has_saved(exam.offering_ref()))
            .filter_map(|exam| {
                self.emit(
                    exam.offering_ref(),
                    self.examination_similarity(&prefs, exam),
                )
            })
            .chain(
                pool.opportunities
                    .iter()
                    .filter(|opportunity| !profile.has_saved(opportunity.offering_ref()))
                    .filter_map(|opportunity| {
                        self.emit(
                            opportunity.offering_ref(),
                            self.opportunity_similarity(&prefs, opportunity),
                        )
                    }),
            )
            .collect();

        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(
            "content-based emitted {} of {} pool candidates",
            candidates.len(),
            pool.len()
        );
        Ok(candidates)
    }
}

/// Running weighted average over the facets a candidate actually carries
#[derive(Default)]
struct FacetAccumulator {
    weighted_sum: f32,
    weight_total: f32,
}

impl FacetAccumulator {
    /// Overlap facet: `|candidate ∩ preferences| / |candidate|`.
    /// Skipped when the candidate has no values for the facet.
    fn add_overlap(&mut self, candidate: &[String], prefs: &HashSet<String>, weight: f32) {
        if candidate.is_empty() {
            return;
        }
        let matched = candidate
            .iter()
            .filter(|value| prefs.contains(&value.to_lowercase()))
            .count();
        self.weighted_sum += (matched as f32 / candidate.len() as f32) * weight;
        self.weight_total += weight;
    }

    /// Exact-match facet: 1.0 when the candidate's value is in the
    /// preference set. Skipped when the candidate has no value.
    fn add_exact(&mut self, candidate: Option<&str>, prefs: &HashSet<String>, weight: f32) {
        let Some(value) = candidate else {
            return;
        };
        if prefs.contains(&value.to_lowercase()) {
            self.weighted_sum += weight;
        }
        self.weight_total += weight;
    }

    /// Weighted average over the facets seen; 0.0 when none applied
    fn similarity(&self) -> f32 {
        if self.weight_total == 0.0 {
            0.0
        } else {
            self.weighted_sum / self.weight_total
        }
    }
}
