//! Integration test: strategies feeding the merger end to end.

use catalog::{
    CatalogIndex, Examination, Learner, OfferingRef, Opportunity, OpportunityCategory, Stage,
};
use ranking::HybridMerger;
use std::sync::Arc;
use strategies::{
    extract_profile, CandidatePool, CollaborativeStrategy, ContentBasedStrategy,
    RuleBasedStrategy, Strategy, StrategyKind,
};

fn seeded_catalog() -> Arc<CatalogIndex> {
    let mut catalog = CatalogIndex::new();

    catalog.insert_examination(Examination {
        id: 1,
        name: "National Physics Olympiad".to_string(),
        subjects: vec!["Physics".to_string(), "Mathematics".to_string()],
        domain: Some("Science".to_string()),
        tags: vec!["olympiad".to_string()],
        conducted_by: Some("Science Board".to_string()),
        eligible_streams: vec!["Science".to_string()],
        deadline: i64::MAX,
        popularity: 500,
        active: true,
    });
    catalog.insert_examination(Examination {
        id: 2,
        name: "Astronomy Challenge".to_string(),
        subjects: vec!["Physics".to_string()],
        domain: Some("Science".to_string()),
        tags: vec!["olympiad".to_string()],
        conducted_by: Some("Science Board".to_string()),
        deadline: i64::MAX,
        eligible_streams: vec![],
        popularity: 50,
        active: true,
    });
    catalog.insert_opportunity(Opportunity {
        id: 3,
        title: "Physics Simulation Hackathon".to_string(),
        category: OpportunityCategory::Hackathon,
        skills: vec!["Physics".to_string(), "Python".to_string()],
        domain: Some("Science".to_string()),
        tags: vec![],
        company: None,
        eligible_programs: vec![],
        eligible_years: vec![],
        deadline: i64::MAX,
        popularity: 300,
        active: true,
    });

    // The subject learner saved exam 2; two neighbors share an interest
    // and both saved opportunity 3
    catalog.insert_learner(Learner {
        id: 1,
        name: "Asha".to_string(),
        stage: Stage::PreTertiary {
            stream: Some("Science".to_string()),
        },
        interests: vec!["Physics".to_string()],
        saved_examinations: vec![2],
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
            saved_opportunities: vec![3],
        });
    }

    Arc::new(catalog)
}

#[test]
fn strategies_merge_into_one_deduplicated_ranking() {
    let catalog = seeded_catalog();
    let profile = extract_profile(catalog.learner(1).unwrap());
    let pool = CandidatePool {
        examinations: catalog.active_examinations(0, 100),
        opportunities: catalog.active_opportunities(0, 100),
    };

    let strategies: Vec<Box<dyn Strategy>> = vec![
        Box::new(RuleBasedStrategy::new()),
        Box::new(ContentBasedStrategy::new(catalog.clone())),
        Box::new(CollaborativeStrategy::new(catalog.clone())),
    ];

    let lists: Vec<_> = strategies
        .iter()
        .map(|s| s.score(&profile, &pool).unwrap())
        .collect();

    // The hackathon is reachable two ways: rule-based (interest +
    // popularity) and collaborative (both neighbors saved it)
    assert!(lists[0]
        .iter()
        .any(|c| c.offering == OfferingRef::opportunity(3)));
    assert!(lists[2]
        .iter()
        .any(|c| c.offering == OfferingRef::opportunity(3)));

    let merged = HybridMerger::new().merge(lists);

    // No duplicate offerings after the merge
    let mut seen = std::collections::HashSet::new();
    for candidate in &merged {
        assert!(seen.insert(candidate.offering), "duplicate {:?}", candidate.offering);
        assert!((0.0..=1.0).contains(&candidate.score));
    }

    // The doubly-sourced hackathon is a hybrid with both reason sets
    let hackathon = merged
        .iter()
        .find(|c| c.offering == OfferingRef::opportunity(3))
        .expect("hackathon should survive the merge");
    assert_eq!(hackathon.strategy, StrategyKind::Hybrid);
    assert!(hackathon.reasons.len() >= 2);

    // The saved exam never re-surfaces through content-based scoring
    // alone at full similarity against itself; it was excluded outright
    assert!(merged
        .iter()
        .all(|c| c.offering != OfferingRef::examination(2)
            || c.strategy == StrategyKind::RuleBased
            || c.strategy == StrategyKind::Hybrid));
}
