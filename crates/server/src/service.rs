//! # Recommendation Service
//!
//! This module coordinates the entire recommendation pipeline:
//! 1. Look up the learner and extract a profile
//! 2. Fetch the candidate pool from the catalog
//! 3. Fan out all strategies in parallel on blocking threads
//! 4. Join deterministically and merge into one ranked list
//! 5. Atomically replace the learner's stored recommendation set
//!
//! A strategy that errors, panics, or exceeds its timeout contributes an
//! empty list and generation completes with the remaining strategies.
//! Zero surviving candidates is a successful run that yields zero
//! recommendations.
//!
//! Generation is serialized per learner through a per-learner mutex held
//! across the whole extract-score-merge-replace sequence; runs for
//! different learners never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{info, warn};

use catalog::{now_unix, CatalogIndex, LearnerId, OfferingKind};
use ranking::{trending, HybridMerger, TrendingOffering};
use rec_store::{InteractionKind, RecommendationRecord, RecommendationStore, RecordId, StrategyMetrics};
use strategies::{
    extract_profile, CandidatePool, CollaborativeStrategy, ContentBasedStrategy, Profile,
    RuleBasedStrategy, ScoredCandidate, Strategy,
};

use crate::error::ServiceError;

/// Tunables for the service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Candidates fetched per offering kind for each generation run
    pub candidate_limit: usize,
    /// Largest limit a read request may ask for
    pub max_list_limit: usize,
    /// Budget per strategy before its contribution is abandoned
    pub strategy_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            candidate_limit: 200,
            max_list_limit: 100,
            strategy_timeout: Duration::from_secs(5),
        }
    }
}

/// Main service coordinating strategies, merger, and store
pub struct RecommendationService {
    catalog: Arc<CatalogIndex>,
    store: RecommendationStore,
    strategies: Vec<Arc<dyn Strategy>>,
    merger: HybridMerger,
    config: ServiceConfig,
    generation_locks: Mutex<HashMap<LearnerId, Arc<Mutex<()>>>>,
}

impl RecommendationService {
    /// Create a service with the default strategy lineup: rule-based,
    /// content-based, collaborative, in that order.
    pub fn new(catalog: Arc<CatalogIndex>) -> Self {
        let strategies: Vec<Arc<dyn Strategy>> = vec![
            Arc::new(RuleBasedStrategy::new()),
            Arc::new(ContentBasedStrategy::new(catalog.clone())),
            Arc::new(CollaborativeStrategy::new(catalog.clone())),
        ];
        Self {
            catalog,
            store: RecommendationStore::new(),
            strategies,
            merger: HybridMerger::new(),
            config: ServiceConfig::default(),
            generation_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the strategy lineup; order determines join order and
    /// therefore first-seen precedence in the merger
    pub fn with_strategies(mut self, strategies: Vec<Arc<dyn Strategy>>) -> Self {
        self.strategies = strategies;
        self
    }

    /// Override the default configuration
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Run a full generation for one learner and replace their stored
    /// recommendation set. Returns the number of records generated.
    pub async fn generate(&self, learner_id: LearnerId) -> Result<usize, ServiceError> {
        let lock = self.generation_lock(learner_id).await;
        let _guard = lock.lock().await;

        let start = Instant::now();
        let learner = self
            .catalog
            .learner(learner_id)
            .ok_or(ServiceError::LearnerNotFound(learner_id))?
            .clone();
        let profile = extract_profile(&learner);

        let now = now_unix();
        let pool = CandidatePool {
            examinations: self
                .catalog
                .active_examinations(now, self.config.candidate_limit),
            opportunities: self
                .catalog
                .active_opportunities(now, self.config.candidate_limit),
        };
        info!(
            "generation for learner {learner_id}: pool of {} candidates, {} strategies",
            pool.len(),
            self.strategies.len()
        );

        let lists = self.run_strategies(&profile, &pool).await;
        let merged = self.merger.merge(lists);
        let generated = self.store.replace_all(learner_id, merged, now)?;

        info!(
            "generated {generated} recommendations for learner {learner_id} in {:.2?}",
            start.elapsed()
        );
        Ok(generated)
    }

    /// Fan the strategies out on blocking threads and join them in order.
    ///
    /// Failures are absorbed here: a strategy that errors, panics, or
    /// times out yields an empty list so the run proceeds with the rest.
    /// A timed-out task is abandoned rather than cancelled; the
    /// per-learner lock keeps whatever it was doing from racing a later
    /// run's store write.
    async fn run_strategies(
        &self,
        profile: &Profile,
        pool: &CandidatePool,
    ) -> Vec<Vec<ScoredCandidate>> {
        let tasks: Vec<_> = self
            .strategies
            .iter()
            .map(|strategy| {
                let name = strategy.name();
                let strategy = Arc::clone(strategy);
                let profile = profile.clone();
                let pool = pool.clone();
                let handle =
                    tokio::task::spawn_blocking(move || strategy.score(&profile, &pool));
                (name, handle)
            })
            .collect();

        let mut lists = Vec::with_capacity(tasks.len());
        for (name, handle) in tasks {
            let list = match tokio::time::timeout(self.config.strategy_timeout, handle).await {
                Ok(Ok(Ok(list))) => list,
                Ok(Ok(Err(err))) => {
                    warn!("strategy {name} failed; contributing nothing: {err:#}");
                    Vec::new()
                }
                Ok(Err(join_err)) => {
                    warn!("strategy {name} panicked; contributing nothing: {join_err}");
                    Vec::new()
                }
                Err(_) => {
                    warn!(
                        "strategy {name} exceeded {:?}; contributing nothing",
                        self.config.strategy_timeout
                    );
                    Vec::new()
                }
            };
            lists.push(list);
        }
        lists
    }

    /// Active, unexpired recommendations for a learner, best first
    pub fn list(
        &self,
        learner_id: LearnerId,
        kind: Option<OfferingKind>,
        limit: usize,
    ) -> Result<Vec<RecommendationRecord>, ServiceError> {
        self.validate_limit(limit)?;
        self.require_learner(learner_id)?;
        Ok(self.store.list(learner_id, kind, limit, now_unix())?)
    }

    /// Top recommendations the learner has not viewed yet
    pub fn top_unseen(
        &self,
        learner_id: LearnerId,
        limit: usize,
    ) -> Result<Vec<RecommendationRecord>, ServiceError> {
        self.validate_limit(limit)?;
        self.require_learner(learner_id)?;
        Ok(self.store.list_unseen_top(learner_id, limit, now_unix())?)
    }

    /// Record a learner interaction on one recommendation record
    pub fn record_interaction(
        &self,
        record_id: RecordId,
        kind: InteractionKind,
    ) -> Result<RecommendationRecord, ServiceError> {
        Ok(self.store.record_interaction(record_id, kind, now_unix())?)
    }

    /// Most popular active offerings, independent of any learner profile
    pub fn trending(
        &self,
        kind: Option<OfferingKind>,
        limit: usize,
    ) -> Result<Vec<TrendingOffering>, ServiceError> {
        self.validate_limit(limit)?;
        Ok(trending(&self.catalog, kind, limit, now_unix()))
    }

    /// Aggregate per-strategy statistics over the active serving set
    pub fn metrics(&self) -> Result<Vec<StrategyMetrics>, ServiceError> {
        Ok(self.store.metrics()?)
    }

    fn validate_limit(&self, limit: usize) -> Result<(), ServiceError> {
        if limit == 0 || limit > self.config.max_list_limit {
            return Err(ServiceError::InvalidArgument(format!(
                "limit must be between 1 and {}, got {limit}",
                self.config.max_list_limit
            )));
        }
        Ok(())
    }

    fn require_learner(&self, learner_id: LearnerId) -> Result<(), ServiceError> {
        self.catalog
            .learner(learner_id)
            .map(|_| ())
            .ok_or(ServiceError::LearnerNotFound(learner_id))
    }

    async fn generation_lock(&self, learner_id: LearnerId) -> Arc<Mutex<()>> {
        let mut locks = self.generation_locks.lock().await;
        locks.entry(learner_id).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use catalog::{Examination, Learner, OfferingRef, Opportunity, OpportunityCategory, Stage};
    use strategies::StrategyKind;

    // ========================================================================
    // Test Fixtures
    // ========================================================================

    /// One Science-stream learner, one aligned examination, one neighbor
    /// pair sharing an interest, and one popular opportunity
    fn build_test_catalog() -> Arc<CatalogIndex> {
        let mut catalog = CatalogIndex::new();

        catalog.insert_examination(Examination {
            id: 1,
            name: "National Physics Olympiad".to_string(),
            subjects: vec!["Physics".to_string(), "Chemistry".to_string()],
            domain: Some("Science".to_string()),
            tags: vec![],
            conducted_by: Some("Science Board".to_string()),
            eligible_streams: vec![],
            deadline: i64::MAX,
            popularity: 150,
            active: true,
        });
        catalog.insert_opportunity(Opportunity {
            id: 2,
            title: "Physics Modelling Hackathon".to_string(),
            category: OpportunityCategory::Hackathon,
            skills: vec!["Physics".to_string(), "Python".to_string()],
            domain: Some("Science".to_string()),
            tags: vec![],
            company: Some("SimuLabs".to_string()),
            eligible_programs: vec![],
            eligible_years: vec![],
            deadline: i64::MAX,
            popularity: 300,
            active: true,
        });

        catalog.insert_learner(Learner {
            id: 1,
            name: "Asha".to_string(),
            stage: Stage::PreTertiary {
                stream: Some("Science".to_string()),
            },
            interests: vec!["Physics".to_string()],
            saved_examinations: vec![],
            saved_opportunities: vec![],
        });
        for id in [2, 3] {
            catalog.insert_learner(Learner {
                id,
                name: format!("Neighbor {id}"),
                stage: Stage::PreTertiary {
                    stream: Some("Science".to_string()),
                },
                interests: vec!["Physics".to_string()],
                saved_examinations: vec![],
                saved_opportunities: vec![2],
            });
        }

        Arc::new(catalog)
    }

    /// Strategy that always fails, for absorption tests
    struct FailingStrategy;

    impl Strategy for FailingStrategy {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn kind(&self) -> StrategyKind {
            StrategyKind::RuleBased
        }

        fn score(
            &self,
            _profile: &Profile,
            _pool: &CandidatePool,
        ) -> anyhow::Result<Vec<ScoredCandidate>> {
            Err(anyhow!("upstream lookup timed out"))
        }
    }

    // ========================================================================
    // Generation
    // ========================================================================

    #[tokio::test]
    async fn generation_scores_the_aligned_exam_at_the_clamp() {
        // base 0.5 + stream alignment 0.3 + full interest overlap 0.2 +
        // popularity 0.1 = 1.1, clamped to 1.0
        let service = RecommendationService::new(build_test_catalog());

        let generated = service.generate(1).await.unwrap();
        assert!(generated >= 1);

        let records = service.list(1, None, 10).unwrap();
        let exam = records
            .iter()
            .find(|r| r.offering == OfferingRef::examination(1))
            .expect("aligned exam should be recommended");
        assert_eq!(exam.score, 1.0);
        assert!(!exam.reasons.is_empty());
    }

    #[tokio::test]
    async fn all_generated_scores_stay_in_the_unit_interval() {
        let service = RecommendationService::new(build_test_catalog());
        service.generate(1).await.unwrap();

        for record in service.list(1, None, 100).unwrap() {
            assert!(
                (0.0..=1.0).contains(&record.score),
                "score {} out of range",
                record.score
            );
        }
    }

    #[tokio::test]
    async fn consecutive_generations_never_duplicate_active_pairs() {
        let service = RecommendationService::new(build_test_catalog());
        service.generate(1).await.unwrap();
        service.generate(1).await.unwrap();

        let records = service.list(1, None, 100).unwrap();
        let mut pairs = std::collections::HashSet::new();
        for record in &records {
            assert!(
                pairs.insert((record.learner_id, record.offering)),
                "duplicate active pair {:?}",
                record.offering
            );
        }
    }

    #[tokio::test]
    async fn neighbor_saves_surface_through_the_collaborative_path() {
        let service = RecommendationService::new(build_test_catalog());
        service.generate(1).await.unwrap();

        // Opportunity 2 is reachable both through rules (interest +
        // popularity) and through the two neighbors who saved it, so the
        // merged record is a hybrid
        let records = service.list(1, Some(OfferingKind::Opportunity), 10).unwrap();
        let hackathon = records
            .iter()
            .find(|r| r.offering == OfferingRef::opportunity(2))
            .expect("hackathon should be recommended");
        assert_eq!(hackathon.strategy, StrategyKind::Hybrid);
        assert!(hackathon.reasons.len() >= 2);
    }

    #[tokio::test]
    async fn unknown_learner_is_not_found() {
        let service = RecommendationService::new(build_test_catalog());
        assert!(matches!(
            service.generate(99).await,
            Err(ServiceError::LearnerNotFound(99))
        ));
    }

    #[tokio::test]
    async fn failing_strategy_is_absorbed() {
        let catalog = build_test_catalog();
        let service = RecommendationService::new(catalog.clone()).with_strategies(vec![
            Arc::new(FailingStrategy),
            Arc::new(RuleBasedStrategy::new()),
        ]);

        let generated = service.generate(1).await.unwrap();
        assert!(generated >= 1, "the healthy strategy still contributes");
    }

    #[tokio::test]
    async fn total_strategy_failure_yields_zero_not_an_error() {
        let service = RecommendationService::new(build_test_catalog())
            .with_strategies(vec![Arc::new(FailingStrategy), Arc::new(FailingStrategy)]);

        let generated = service.generate(1).await.unwrap();
        assert_eq!(generated, 0);
        assert!(service.list(1, None, 10).unwrap().is_empty());
    }

    // ========================================================================
    // Read surface and interactions
    // ========================================================================

    #[tokio::test]
    async fn list_rejects_malformed_limits() {
        let service = RecommendationService::new(build_test_catalog());
        assert!(matches!(
            service.list(1, None, 0),
            Err(ServiceError::InvalidArgument(_))
        ));
        assert!(matches!(
            service.list(1, None, 101),
            Err(ServiceError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn viewed_records_leave_the_unseen_top() {
        let service = RecommendationService::new(build_test_catalog());
        service.generate(1).await.unwrap();

        let top = service.top_unseen(1, 10).unwrap();
        assert!(!top.is_empty());
        let first_id = top[0].id;

        let updated = service
            .record_interaction(first_id, InteractionKind::Viewed)
            .unwrap();
        assert!(updated.interaction.viewed);

        let remaining = service.top_unseen(1, 10).unwrap();
        assert!(remaining.iter().all(|r| r.id != first_id));
    }

    #[tokio::test]
    async fn interaction_on_unknown_record_is_not_found() {
        let service = RecommendationService::new(build_test_catalog());
        assert!(matches!(
            service.record_interaction(424242, InteractionKind::Saved),
            Err(ServiceError::RecordNotFound(424242))
        ));
    }

    #[tokio::test]
    async fn trending_ranks_by_popularity_without_a_profile() {
        let service = RecommendationService::new(build_test_catalog());

        let entries = service.trending(None, 10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].offering, OfferingRef::opportunity(2));
        assert!(entries[0].popularity >= entries[1].popularity);
    }

    #[tokio::test]
    async fn metrics_reflect_the_active_serving_set() {
        let service = RecommendationService::new(build_test_catalog());
        service.generate(1).await.unwrap();

        let metrics = service.metrics().unwrap();
        assert!(!metrics.is_empty());
        let total: usize = metrics.iter().map(|m| m.active_records).sum();
        assert_eq!(total, service.list(1, None, 100).unwrap().len());
        for m in &metrics {
            assert!((0.0..=1.0).contains(&m.avg_score));
        }
    }

    // ========================================================================
    // Concurrency
    // ========================================================================

    #[tokio::test]
    async fn concurrent_generations_for_one_learner_leave_a_consistent_set() {
        let service = Arc::new(RecommendationService::new(build_test_catalog()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let service = service.clone();
            handles.push(tokio::spawn(async move { service.generate(1).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let records = service.list(1, None, 100).unwrap();
        let mut pairs = std::collections::HashSet::new();
        for record in &records {
            assert!(pairs.insert(record.offering), "duplicate after racing runs");
        }
        assert!(!records.is_empty());
    }
}
