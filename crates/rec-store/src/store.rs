//! In-memory recommendation store.
//!
//! Holds every learner's recommendation records behind one `RwLock`.
//! `replace_all` performs the retire-and-insert swap under a single write
//! guard, so readers either see the full old set or the full new set,
//! never the gap between them.

use crate::error::{Result, StoreError};
use crate::record::{
    InteractionKind, InteractionState, RecommendationRecord, RecordId, RECOMMENDATION_TTL_SECS,
};
use catalog::{LearnerId, OfferingKind, OfferingRef, Timestamp};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::RwLock;
use strategies::{ScoredCandidate, StrategyKind};
use tracing::debug;

/// Aggregate serving-set statistics for one strategy
#[derive(Debug, Clone, Serialize)]
pub struct StrategyMetrics {
    pub strategy: StrategyKind,
    pub active_records: usize,
    pub avg_score: f32,
    pub viewed: usize,
    pub saved: usize,
    pub applied: usize,
}

#[derive(Default)]
struct StoreInner {
    records: HashMap<RecordId, RecommendationRecord>,
    by_learner: HashMap<LearnerId, Vec<RecordId>>,
    next_id: RecordId,
}

/// Thread-safe store of recommendation records
#[derive(Default)]
pub struct RecommendationStore {
    inner: RwLock<StoreInner>,
}

impl RecommendationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace a learner's recommendation set.
    ///
    /// Every currently-active record for the learner is retired and the
    /// new batch is inserted as active with a fresh expiry, under one
    /// write guard. Incoming duplicates for the same offering keep the
    /// first (highest-ranked) entry, preserving the uniqueness of
    /// (learner, offering) among active records.
    ///
    /// Returns the number of records inserted.
    pub fn replace_all(
        &self,
        learner_id: LearnerId,
        candidates: Vec<ScoredCandidate>,
        now: Timestamp,
    ) -> Result<usize> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;

        let mut seen: HashSet<OfferingRef> = HashSet::new();
        let mut fresh_ids: Vec<RecordId> = Vec::new();
        let mut fresh_records: Vec<RecommendationRecord> = Vec::new();
        for candidate in candidates {
            if !seen.insert(candidate.offering) {
                continue;
            }
            let id = inner.next_id;
            inner.next_id += 1;
            fresh_ids.push(id);
            fresh_records.push(RecommendationRecord {
                id,
                learner_id,
                offering: candidate.offering,
                score: candidate.score.clamp(0.0, 1.0),
                strategy: candidate.strategy,
                reasons: candidate.reasons,
                interaction: InteractionState::default(),
                created_at: now,
                expires_at: now + RECOMMENDATION_TTL_SECS,
                is_active: true,
            });
        }

        // Retire the superseded set
        let mut retired = 0usize;
        if let Some(existing_ids) = inner.by_learner.get(&learner_id).cloned() {
            for id in existing_ids {
                if let Some(record) = inner.records.get_mut(&id) {
                    if record.is_active {
                        record.is_active = false;
                        retired += 1;
                    }
                }
            }
        }

        let inserted = fresh_records.len();
        for record in fresh_records {
            inner.records.insert(record.id, record);
        }
        inner
            .by_learner
            .entry(learner_id)
            .or_default()
            .extend(fresh_ids);

        debug!(
            "replaced recommendations for learner {learner_id}: retired {retired}, inserted {inserted}"
        );
        Ok(inserted)
    }

    /// Active, unexpired records for a learner, best first (score
    /// descending, then creation time descending), optionally filtered to
    /// one offering kind.
    pub fn list(
        &self,
        learner_id: LearnerId,
        kind: Option<OfferingKind>,
        limit: usize,
        now: Timestamp,
    ) -> Result<Vec<RecommendationRecord>> {
        self.collect(learner_id, kind, limit, now, |_| true)
    }

    /// Same as [`list`](Self::list), restricted to records the learner has
    /// not viewed yet.
    pub fn list_unseen_top(
        &self,
        learner_id: LearnerId,
        limit: usize,
        now: Timestamp,
    ) -> Result<Vec<RecommendationRecord>> {
        self.collect(learner_id, None, limit, now, |record| {
            !record.interaction.viewed
        })
    }

    fn collect(
        &self,
        learner_id: LearnerId,
        kind: Option<OfferingKind>,
        limit: usize,
        now: Timestamp,
        keep: impl Fn(&RecommendationRecord) -> bool,
    ) -> Result<Vec<RecommendationRecord>> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;

        let mut records: Vec<RecommendationRecord> = inner
            .by_learner
            .get(&learner_id)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.records.get(id))
            .filter(|record| record.is_servable(now))
            .filter(|record| kind.is_none() || kind == Some(record.offering.kind))
            .filter(|record| keep(record))
            .cloned()
            .collect();

        records.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.created_at.cmp(&a.created_at))
                // Within one batch insertion order is merge rank
                .then_with(|| a.id.cmp(&b.id))
        });
        records.truncate(limit);
        Ok(records)
    }

    /// Record one interaction on an active record.
    ///
    /// Flags transition false to true only; a repeat of an already-set
    /// kind keeps the original timestamp. Unknown or retired record ids
    /// fail with [`StoreError::NotFound`].
    pub fn record_interaction(
        &self,
        record_id: RecordId,
        kind: InteractionKind,
        now: Timestamp,
    ) -> Result<RecommendationRecord> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;

        let record = inner
            .records
            .get_mut(&record_id)
            .filter(|record| record.is_active)
            .ok_or(StoreError::NotFound(record_id))?;

        record.interaction.record(kind, now);
        Ok(record.clone())
    }

    /// Aggregate statistics per strategy over the active serving set.
    ///
    /// An explicit group-by fold; retired records drop out of the
    /// averages.
    pub fn metrics(&self) -> Result<Vec<StrategyMetrics>> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;

        struct Bucket {
            count: usize,
            score_sum: f32,
            viewed: usize,
            saved: usize,
            applied: usize,
        }

        let mut buckets: BTreeMap<StrategyKind, Bucket> = BTreeMap::new();
        for record in inner.records.values().filter(|r| r.is_active) {
            let bucket = buckets.entry(record.strategy).or_insert(Bucket {
                count: 0,
                score_sum: 0.0,
                viewed: 0,
                saved: 0,
                applied: 0,
            });
            bucket.count += 1;
            bucket.score_sum += record.score;
            bucket.viewed += record.interaction.viewed as usize;
            bucket.saved += record.interaction.saved as usize;
            bucket.applied += record.interaction.applied as usize;
        }

        Ok(buckets
            .into_iter()
            .map(|(strategy, bucket)| StrategyMetrics {
                strategy,
                active_records: bucket.count,
                avg_score: bucket.score_sum / bucket.count as f32,
                viewed: bucket.viewed,
                saved: bucket.saved,
                applied: bucket.applied,
            })
            .collect())
    }
}
