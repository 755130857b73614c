//! Simple test harness for the recommendation service.
//!
//! Seeds a catalog from the data directory, runs a full generation for
//! one learner, and prints the resulting recommendation set.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use catalog::load_catalog;
use server::RecommendationService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("info,server=debug,strategies=debug,ranking=debug")
        .init();

    info!("Starting EduRecs service harness");

    let data_dir = std::env::args().nth(1).unwrap_or_else(|| "data".to_string());
    let catalog = Arc::new(
        load_catalog(Path::new(&data_dir))
            .with_context(|| format!("failed to load seed catalog from {data_dir}"))?,
    );
    let (learners, exams, opportunities) = catalog.counts();
    info!("Catalog loaded: {learners} learners, {exams} examinations, {opportunities} opportunities");

    let service = RecommendationService::new(catalog.clone());

    let learner_id = 1;
    let generated = service.generate(learner_id).await?;
    info!("Generated {generated} recommendations for learner {learner_id}");

    for (i, record) in service.list(learner_id, None, 20)?.iter().enumerate() {
        let name = catalog
            .offering_name(record.offering)
            .unwrap_or("<unknown offering>");
        info!(
            "{}. {} [{}] - score {:.2} via {}",
            i + 1,
            name,
            record.offering.kind,
            record.score,
            record.strategy
        );
        for reason in &record.reasons {
            info!("   - {} ({:+.2})", reason.text, reason.weight);
        }
    }

    Ok(())
}
