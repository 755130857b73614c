//! Rule-Based Scorer
//!
//! Scores every candidate in the pool with additive, capped bonuses on
//! top of a fixed base:
//!
//! 1. Base score 0.5 for every candidate
//! 2. Stage alignment: pre-tertiary stream matching examination subjects
//!    (+0.3), or tertiary program/year matching opportunity eligibility
//!    (+0.2)
//! 3. Interest overlap: fraction of declared interests found in the
//!    candidate's text, scaled by a per-kind weight
//! 4. Popularity: flat +0.1 above a popularity threshold
//!
//! The sum is clamped to 1.0 and a candidate is emitted only when its
//! score strictly exceeds the emit threshold. The comparison is `>`, not
//! `>=`: a candidate sitting exactly on the threshold is dropped.
//!
//! All weights, the thresholds, and the stream-to-subjects alignment table
//! are configuration with documented defaults.

use crate::profile::Profile;
use crate::traits::Strategy;
use crate::types::{CandidatePool, Reason, ScoredCandidate, StrategyKind};
use anyhow::Result;
use catalog::{Examination, Opportunity, Stage};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Popularity counter above which the flat popularity bonus applies
pub const DEFAULT_POPULARITY_THRESHOLD: u32 = 100;

/// Minimum score a candidate must strictly exceed to be emitted
pub const DEFAULT_EMIT_THRESHOLD: f32 = 0.6;

const BASE_SCORE: f32 = 0.5;

/// Bonus weights for the rule-based scorer
#[derive(Debug, Clone)]
pub struct RuleWeights {
    /// Stream/subject alignment bonus for examinations
    pub exam_alignment: f32,
    /// Program/year eligibility alignment bonus for opportunities
    pub opportunity_alignment: f32,
    /// Interest-overlap scale for examinations
    pub exam_interest: f32,
    /// Interest-overlap scale for opportunities
    pub opportunity_interest: f32,
    /// Flat bonus above the popularity threshold
    pub popularity: f32,
}

impl Default for RuleWeights {
    fn default() -> Self {
        Self {
            exam_alignment: 0.3,
            opportunity_alignment: 0.2,
            exam_interest: 0.2,
            opportunity_interest: 0.3,
            popularity: 0.1,
        }
    }
}

/// Default stream-to-core-subjects alignment table, lowercased
fn default_stream_subjects() -> HashMap<String, Vec<String>> {
    let table = [
        (
            "science",
            vec!["physics", "chemistry", "biology", "mathematics"],
        ),
        (
            "commerce",
            vec![
                "accountancy",
                "economics",
                "business studies",
                "mathematics",
            ],
        ),
        (
            "humanities",
            vec![
                "history",
                "geography",
                "political science",
                "psychology",
                "sociology",
            ],
        ),
        (
            "arts",
            vec![
                "history",
                "geography",
                "political science",
                "psychology",
                "sociology",
            ],
        ),
    ];

    table
        .into_iter()
        .map(|(stream, subjects)| {
            (
                stream.to_string(),
                subjects.into_iter().map(|s| s.to_string()).collect(),
            )
        })
        .collect()
}

/// Rule-based strategy: deterministic additive heuristics
pub struct RuleBasedStrategy {
    weights: RuleWeights,
    popularity_threshold: u32,
    emit_threshold: f32,
    /// Lowercased stream name to the subjects considered core for it
    stream_subjects: HashMap<String, Vec<String>>,
}

impl RuleBasedStrategy {
    pub fn new() -> Self {
        Self {
            weights: RuleWeights::default(),
            popularity_threshold: DEFAULT_POPULARITY_THRESHOLD,
            emit_threshold: DEFAULT_EMIT_THRESHOLD,
            stream_subjects: default_stream_subjects(),
        }
    }

    /// Configure the popularity threshold (default: 100)
    pub fn with_popularity_threshold(mut self, threshold: u32) -> Self {
        self.popularity_threshold = threshold;
        self
    }

    /// Configure the emit threshold (default: 0.6)
    pub fn with_emit_threshold(mut self, threshold: f32) -> Self {
        self.emit_threshold = threshold;
        self
    }

    /// Configure the bonus weights
    pub fn with_weights(mut self, weights: RuleWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Replace the stream-to-subjects alignment table; keys and values are
    /// lowercased on the way in
    pub fn with_stream_subjects(mut self, table: HashMap<String, Vec<String>>) -> Self {
        self.stream_subjects = table
            .into_iter()
            .map(|(stream, subjects)| {
                (
                    stream.to_lowercase(),
                    subjects.into_iter().map(|s| s.to_lowercase()).collect(),
                )
            })
            .collect();
        self
    }

    fn score_examination(&self, profile: &Profile, exam: &Examination) -> Option<ScoredCandidate> {
        let mut score = BASE_SCORE;
        let mut reasons = Vec::new();

        if let Some(stream) = self.aligned_stream(profile, exam) {
            score += self.weights.exam_alignment;
            reasons.push(Reason::new(
                format!("{stream} stream aligns with the exam's subjects"),
                self.weights.exam_alignment,
            ));
        }

        if let Some((matched, total)) = interest_overlap(&profile.interests, &exam_text(exam)) {
            let bonus = (matched as f32 / total as f32) * self.weights.exam_interest;
            score += bonus;
            reasons.push(Reason::new(
                format!("matches {matched} of {total} declared interests"),
                bonus,
            ));
        }

        if exam.popularity > self.popularity_threshold {
            score += self.weights.popularity;
            reasons.push(Reason::new(
                "widely taken by other learners",
                self.weights.popularity,
            ));
        }

        self.emit(exam.offering_ref(), score, reasons)
    }

    fn score_opportunity(
        &self,
        profile: &Profile,
        opportunity: &Opportunity,
    ) -> Option<ScoredCandidate> {
        let mut score = BASE_SCORE;
        let mut reasons = Vec::new();

        if let Some(why) = eligibility_alignment(profile, opportunity) {
            score += self.weights.opportunity_alignment;
            reasons.push(Reason::new(why, self.weights.opportunity_alignment));
        }

        if let Some((matched, total)) =
            interest_overlap(&profile.interests, &opportunity_text(opportunity))
        {
            let bonus = (matched as f32 / total as f32) * self.weights.opportunity_interest;
            score += bonus;
            reasons.push(Reason::new(
                format!("matches {matched} of {total} declared interests"),
                bonus,
            ));
        }

        if opportunity.popularity > self.popularity_threshold {
            score += self.weights.popularity;
            reasons.push(Reason::new(
                "popular with other learners",
                self.weights.popularity,
            ));
        }

        self.emit(opportunity.offering_ref(), score, reasons)
    }

    /// Stream whose core subjects intersect the exam's subjects, if any.
    /// An exam that lists the learner's stream as eligible counts too.
    fn aligned_stream<'a>(&self, profile: &'a Profile, exam: &Examination) -> Option<&'a str> {
        let Stage::PreTertiary {
            stream: Some(stream),
        } = &profile.stage
        else {
            return None;
        };

        let stream_lower = stream.to_lowercase();
        if exam
            .eligible_streams
            .iter()
            .any(|s| s.to_lowercase() == stream_lower)
        {
            return Some(stream.as_str());
        }

        let core = self.stream_subjects.get(&stream_lower)?;
        exam.subjects
            .iter()
            .any(|subject| core.contains(&subject.to_lowercase()))
            .then_some(stream.as_str())
    }

    fn emit(
        &self,
        offering: catalog::OfferingRef,
        score: f32,
        reasons: Vec<Reason>,
    ) -> Option<ScoredCandidate> {
        let score = score.min(1.0);
        // Strict comparison: a candidate at exactly the threshold is dropped
        if score > self.emit_threshold {
            let mut candidate = ScoredCandidate::new(offering, StrategyKind::RuleBased, score);
            candidate.reasons = reasons;
            Some(candidate)
        } else {
            None
        }
    }
}

impl Default for RuleBasedStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for RuleBasedStrategy {
    fn name(&self) -> &'static str {
        "rule-based"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::RuleBased
    }

    #[instrument(skip(self, profile, pool), fields(learner_id = profile.learner_id))]
    fn score(&self, profile: &Profile, pool: &CandidatePool) -> Result<Vec<ScoredCandidate>> {
        let mut candidates: Vec<ScoredCandidate> = pool
            .examinations
            .iter()
            .filter_map(|exam| self.score_examination(profile, exam))
            .chain(
                pool.opportunities
                    .iter()
                    .filter_map(|opportunity| self.score_opportunity(profile, opportunity)),
            )
            .collect();

        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(
            "rule-based emitted {} of {} pool candidates",
            candidates.len(),
            pool.len()
        );
        Ok(candidates)
    }
}

/// Number of declared interests found (case-insensitive substring) in the
/// candidate's text fields, with the total declared.
///
/// Returns `None` when the learner declared no interests, so the caller
/// skips the term entirely and never divides by zero.
fn interest_overlap(interests: &[String], text: &[String]) -> Option<(usize, usize)> {
    if interests.is_empty() {
        return None;
    }

    let matched = interests
        .iter()
        .filter(|interest| {
            let needle = interest.to_lowercase();
            text.iter().any(|hay| hay.contains(&needle))
        })
        .count();
    Some((matched, interests.len()))
}

fn exam_text(exam: &Examination) -> Vec<String> {
    let mut text = vec![exam.name.to_lowercase()];
    text.extend(exam.subjects.iter().map(|s| s.to_lowercase()));
    text.extend(exam.tags.iter().map(|t| t.to_lowercase()));
    if let Some(domain) = &exam.domain {
        text.push(domain.to_lowercase());
    }
    text
}

fn opportunity_text(opportunity: &Opportunity) -> Vec<String> {
    let mut text = vec![opportunity.title.to_lowercase()];
    text.extend(opportunity.skills.iter().map(|s| s.to_lowercase()));
    text.extend(opportunity.tags.iter().map(|t| t.to_lowercase()));
    if let Some(domain) = &opportunity.domain {
        text.push(domain.to_lowercase());
    }
    text
}

/// Eligibility-based alignment for tertiary learners: declared program or
/// study year appearing in the opportunity's eligibility lists
fn eligibility_alignment(profile: &Profile, opportunity: &Opportunity) -> Option<String> {
    let Stage::Tertiary { program, year } = &profile.stage else {
        return None;
    };

    if let Some(program) = program {
        let program_matches = opportunity
            .eligible_programs
            .iter()
            .any(|p| p.eq_ignore_ascii_case(program));
        if program_matches {
            return Some(format!("open to {program} students"));
        }
    }

    if let Some(year) = year {
        if !opportunity.eligible_years.is_empty() && opportunity.eligible_years.contains(year) {
            return Some(format!("open to year-{year} students"));
        }
    }

    None
}
