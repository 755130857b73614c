use anyhow::{anyhow, Context, Result};
use catalog::{load_catalog, CatalogIndex, LearnerId, OfferingKind, Stage};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rec_store::{InteractionKind, RecommendationRecord, RecordId};
use server::RecommendationService;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// EduRecs - Educational Offering Recommendation Engine
#[derive(Parser)]
#[command(name = "edu-recs")]
#[command(about = "Recommends examinations and opportunities to learners", long_about = None)]
struct Cli {
    /// Path to the seed data directory
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full generation for a learner and show the new set
    Generate {
        /// Learner ID to generate recommendations for
        #[arg(long)]
        learner_id: LearnerId,
    },

    /// List a learner's active recommendations
    List {
        /// Learner ID to list recommendations for
        #[arg(long)]
        learner_id: LearnerId,

        /// Restrict to one offering kind (examination | opportunity)
        #[arg(long)]
        kind: Option<OfferingKind>,

        /// Number of recommendations to return
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Show scoring reasons for each recommendation
        #[arg(long)]
        explain: bool,
    },

    /// Show the top recommendations the learner has not viewed yet
    Top {
        /// Learner ID
        #[arg(long)]
        learner_id: LearnerId,

        /// Number of recommendations to return
        #[arg(long, default_value = "5")]
        limit: usize,
    },

    /// Record an interaction with one recommendation record
    Interact {
        /// Recommendation record ID
        #[arg(long)]
        record_id: RecordId,

        /// Interaction kind (viewed | saved | applied)
        #[arg(long)]
        kind: InteractionKind,
    },

    /// Show the most popular active offerings, no profile involved
    Trending {
        /// Restrict to one offering kind (examination | opportunity)
        #[arg(long)]
        kind: Option<OfferingKind>,

        /// Number of offerings to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Show aggregate per-strategy statistics
    Metrics,

    /// Show a learner's profile and saved offerings
    Learner {
        /// Learner ID to display
        #[arg(long)]
        learner_id: LearnerId,
    },

    /// Run a concurrent generation benchmark
    Benchmark {
        /// Number of generation requests to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    // Load the seed catalog
    println!("Loading catalog from {}...", cli.data_dir.display());
    let start = Instant::now();
    let catalog = Arc::new(load_catalog(&cli.data_dir).context("Failed to load seed catalog")?);
    let (learners, exams, opportunities) = catalog.counts();
    println!(
        "{} Loaded {} learners, {} examinations, {} opportunities in {:?}",
        "✓".green(),
        learners,
        exams,
        opportunities,
        start.elapsed()
    );

    let service = Arc::new(RecommendationService::new(catalog.clone()));

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Generate { learner_id } => handle_generate(&catalog, &service, learner_id).await?,
        Commands::List {
            learner_id,
            kind,
            limit,
            explain,
        } => {
            let records = service.list(learner_id, kind, limit)?;
            println!(
                "{}",
                format!("Recommendations for learner {learner_id}:").bold().blue()
            );
            print_records(&catalog, &records, explain);
        }
        Commands::Top { learner_id, limit } => {
            let records = service.top_unseen(learner_id, limit)?;
            println!(
                "{}",
                format!("Unseen top for learner {learner_id}:").bold().blue()
            );
            print_records(&catalog, &records, false);
        }
        Commands::Interact { record_id, kind } => {
            let record = service.record_interaction(record_id, kind)?;
            println!(
                "{} Recorded '{}' on record {} ({})",
                "✓".green(),
                kind,
                record.id,
                catalog
                    .offering_name(record.offering)
                    .unwrap_or("<unknown offering>")
            );
        }
        Commands::Trending { kind, limit } => {
            let entries = service.trending(kind, limit)?;
            println!("{}", "Trending offerings:".bold().blue());
            for (i, entry) in entries.iter().enumerate() {
                println!(
                    "{}. {} [{}] - popularity {}",
                    (i + 1).to_string().green(),
                    entry.name,
                    entry.offering.kind,
                    entry.popularity
                );
            }
        }
        Commands::Metrics => {
            let metrics = service.metrics()?;
            println!("{}", "Strategy metrics (active records):".bold().blue());
            if metrics.is_empty() {
                println!("  (no active recommendations; run generate first)");
            }
            for m in metrics {
                println!(
                    "  {:<14} count {:>4}  avg score {:.3}  viewed {}  saved {}  applied {}",
                    m.strategy.to_string(),
                    m.active_records,
                    m.avg_score,
                    m.viewed,
                    m.saved,
                    m.applied
                );
            }
        }
        Commands::Learner { learner_id } => handle_learner(&catalog, learner_id)?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(&catalog, service.clone(), requests, concurrent).await?,
    }

    Ok(())
}

/// Handle the 'generate' command
async fn handle_generate(
    catalog: &Arc<CatalogIndex>,
    service: &Arc<RecommendationService>,
    learner_id: LearnerId,
) -> Result<()> {
    let start = Instant::now();
    let generated = service.generate(learner_id).await?;
    println!(
        "{} Generated {} recommendations for learner {} in {:?}",
        "✓".green(),
        generated,
        learner_id,
        start.elapsed()
    );

    let records = service.list(learner_id, None, 20)?;
    print_records(catalog, &records, false);
    Ok(())
}

/// Handle the 'learner' command
fn handle_learner(catalog: &Arc<CatalogIndex>, learner_id: LearnerId) -> Result<()> {
    let learner = catalog
        .learner(learner_id)
        .ok_or_else(|| anyhow!("Learner {} not found", learner_id))?;

    println!(
        "{}",
        format!("Learner {}: {}", learner.id, learner.name).bold().blue()
    );
    match &learner.stage {
        Stage::PreTertiary { stream } => {
            println!("{}Stage: pre-tertiary", "• ".green());
            println!(
                "{}Stream: {}",
                "• ".green(),
                stream.as_deref().unwrap_or("(undeclared)")
            );
        }
        Stage::Tertiary { program, year } => {
            println!("{}Stage: tertiary", "• ".green());
            println!(
                "{}Program: {}",
                "• ".green(),
                program.as_deref().unwrap_or("(undeclared)")
            );
            match year {
                Some(year) => println!("{}Year: {}", "• ".green(), year),
                None => println!("{}Year: (undeclared)", "• ".green()),
            }
        }
    }
    println!(
        "{}Interests: {}",
        "• ".cyan(),
        if learner.interests.is_empty() {
            "(none)".to_string()
        } else {
            learner.interests.join(", ")
        }
    );

    println!("Saved offerings:");
    for offering in learner.saved_refs() {
        let name = catalog
            .offering_name(offering)
            .unwrap_or("<unknown offering>");
        println!("  - {} [{}]", name, offering.kind);
    }
    if learner.saved_examinations.is_empty() && learner.saved_opportunities.is_empty() {
        println!("  (nothing saved yet)");
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    catalog: &Arc<CatalogIndex>,
    service: Arc<RecommendationService>,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    let learner_ids = catalog.learner_ids();
    if learner_ids.is_empty() {
        return Err(anyhow!("catalog has no learners to benchmark with"));
    }

    // Pick random learners from the catalog
    let targets: Vec<LearnerId> = (0..requests)
        .map(|_| learner_ids[rand::random::<u32>() as usize % learner_ids.len()])
        .collect();

    let semaphore = Arc::new(tokio::sync::Semaphore::new(concurrent.max(1)));
    let mut handles = vec![];
    for learner_id in targets {
        let service = service.clone();
        let semaphore = semaphore.clone();
        let handle = tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let start = Instant::now();
            service.generate(learner_id).await?;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    // Wait for all tasks to complete and collect timings
    let mut timings = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }

    let total_time: std::time::Duration = timings.iter().sum();
    let avg_latency = total_time / (timings.len() as u32);
    timings.sort();
    let p50 = timings[timings.len() / 2];
    let p95 = timings[(timings.len() as f32 * 0.95) as usize];
    let p99 = timings[(timings.len() as f32 * 0.99) as usize];
    let throughput = requests as f32 / total_time.as_secs_f32();

    println!("Benchmark results:");
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Helper function to format and print recommendation records
fn print_records(catalog: &Arc<CatalogIndex>, records: &[RecommendationRecord], explain: bool) {
    if records.is_empty() {
        println!("  (no active recommendations)");
        return;
    }
    for (rank, record) in records.iter().enumerate() {
        let name = catalog
            .offering_name(record.offering)
            .unwrap_or("<unknown offering>");
        let mut flags = String::new();
        if record.interaction.viewed {
            flags.push('v');
        }
        if record.interaction.saved {
            flags.push('s');
        }
        if record.interaction.applied {
            flags.push('a');
        }
        println!(
            "{}. #{} {} [{}] - score {:.2} via {} {}",
            (rank + 1).to_string().green(),
            record.id,
            name,
            record.offering.kind,
            record.score,
            record.strategy,
            if flags.is_empty() {
                String::new()
            } else {
                format!("({flags})")
            }
        );
        if explain {
            for reason in &record.reasons {
                println!("   - {} ({:+.2})", reason.text, reason.weight);
            }
        }
    }
}
