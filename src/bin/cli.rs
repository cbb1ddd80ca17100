//! Job Scout CLI
//!
//! Local execution entry point.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use jobscout::{
    classifier::{Classifier, KeywordSet, fields_by_keyword},
    error::{AppError, Result},
    models::{Config, JobStatus, Posting},
    pipeline,
    services::{self, GeminiScorer, ScoringOracle},
    storage::{JobStore, LocalStorage},
};

/// Job Scout - junior job posting collector
#[derive(Parser, Debug)]
#[command(
    name = "jobscout",
    version,
    about = "Collects junior-level job postings and scores them against your profile"
)]
struct Cli {
    /// Path to storage directory containing config.toml and jobs.json
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch postings from every source and store the accepted ones
    Scrape,

    /// Score unscored jobs with the language model
    Score {
        /// Jobs per request (default: scorer.batch_size)
        #[arg(long)]
        batch_size: Option<usize>,

        /// Maximum number of requests (default: scorer.max_batches)
        #[arg(long)]
        max_batches: Option<usize>,
    },

    /// Run full pipeline: Scrape → Score → Cleanup
    Pipeline {
        /// Skip the scoring step
        #[arg(long)]
        skip_score: bool,
    },

    /// Delete old and low-scored jobs
    Cleanup {
        /// Maximum job age in days (default: cleanup.max_age_days)
        #[arg(long)]
        days: Option<i64>,

        /// Minimum score to keep (default: cleanup.min_score)
        #[arg(long)]
        min_score: Option<u8>,
    },

    /// Export new jobs to a JSON file
    Export {
        #[arg(short, long, default_value = "jobs_export.json")]
        output: PathBuf,

        #[arg(short, long, default_value_t = 100)]
        limit: usize,
    },

    /// Show the best scored jobs
    Top {
        #[arg(long, default_value_t = 70)]
        min_score: u8,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Set the review status of a job
    Mark {
        id: u64,

        /// new, interested, applied or archived
        status: JobStatus,
    },

    /// Show job counts and score distribution
    Stats,

    /// Classify postings from a JSON file and print the decision trail
    Classify {
        /// File holding one posting object or an array of them
        postings: PathBuf,
    },

    /// Validate configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Read one posting or an array of postings.
fn read_postings(path: &Path) -> Result<Vec<Posting>> {
    let content = std::fs::read_to_string(path)?;
    if content.trim_start().starts_with('[') {
        Ok(serde_json::from_str::<Vec<Posting>>(&content)?)
    } else {
        Ok(vec![serde_json::from_str::<Posting>(&content)?])
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path);
    log::debug!("Loaded configuration from {}", config_path.display());

    let store = LocalStorage::with_description_limit(
        &cli.storage_dir,
        config.storage.description_chars,
    );

    match cli.command {
        Command::Scrape => {
            config.validate()?;
            let sources = services::build_sources(&config)?;
            pipeline::run_scraper(&config, &sources, &store).await?;
        }

        Command::Score {
            batch_size,
            max_batches,
        } => {
            let scorer = GeminiScorer::new(&config.scorer)?;
            pipeline::run_scorer(
                &store,
                &scorer,
                &config.profile,
                batch_size.unwrap_or(config.scorer.batch_size),
                max_batches.unwrap_or(config.scorer.max_batches),
            )
            .await?;
            print_json(&pipeline::score_statistics(&store).await?)?;
        }

        Command::Pipeline { skip_score } => {
            config.validate()?;
            let sources = services::build_sources(&config)?;
            let scorer = if skip_score {
                None
            } else {
                match GeminiScorer::new(&config.scorer) {
                    Ok(scorer) => Some(scorer),
                    Err(e) => {
                        log::warn!("Scoring disabled: {}", e);
                        None
                    }
                }
            };
            let oracle = scorer.as_ref().map(|s| s as &dyn ScoringOracle);
            pipeline::run_pipeline(&config, &sources, &store, oracle).await?;
        }

        Command::Cleanup { days, min_score } => {
            pipeline::run_cleanup(
                &store,
                days.unwrap_or(config.cleanup.max_age_days),
                min_score.unwrap_or(config.cleanup.min_score),
            )
            .await?;
        }

        Command::Export { output, limit } => {
            pipeline::export_json(&store, &output, limit).await?;
        }

        Command::Top { min_score, limit } => {
            let jobs = store.jobs_by_score(min_score, limit).await?;
            if jobs.is_empty() {
                log::info!("No jobs scored {} or higher", min_score);
            }
            for job in jobs {
                println!(
                    "[{}] {} - {} ({})",
                    job.ai_score.unwrap_or_default(),
                    job.title,
                    job.company,
                    job.url
                );
                if let Some(analysis) = &job.ai_analysis {
                    println!("      {}", analysis);
                }
            }
        }

        Command::Mark { id, status } => {
            store.update_status(id, status).await?;
            log::info!("Job {} marked as {}", id, status);
        }

        Command::Stats => {
            print_json(&store.stats().await?)?;
            print_json(&pipeline::score_statistics(&store).await?)?;
        }

        Command::Classify { postings } => {
            let classifier = Classifier::new(
                KeywordSet::new(&config.classifier.keywords),
                config.classifier.options(),
            );
            for posting in read_postings(&postings)? {
                let result = classifier.classify(&posting);
                print_json(&serde_json::json!({
                    "title": posting.title,
                    "company": posting.company,
                    "accepted": result.accepted,
                    "reasons": result.reason_tags(),
                    "signals": result.signals,
                    "skill_fields": fields_by_keyword(&result.skill_matches),
                    "level_fields": fields_by_keyword(&result.level_matches),
                }))?;
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            let config = Config::load(&config_path).map_err(|e| {
                AppError::config(format!("{}: {}", config_path.display(), e))
            })?;
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            services::build_sources(&config)?;
            for source in &config.sources {
                log::info!(
                    "  - {} (classifier {})",
                    source.name(),
                    if source.classify() { "on" } else { "off" }
                );
            }
            log::info!(
                "✓ Config OK ({} sources, {} keywords)",
                config.sources.len(),
                config.classifier.keywords.len()
            );
        }
    }

    Ok(())
}
