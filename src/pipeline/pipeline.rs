// src/pipeline/pipeline.rs

use crate::error::Result;
use crate::models::Config;
use crate::services::{PostingSource, ScoringOracle};
use crate::storage::JobStore;

use super::maintain::run_cleanup;
use super::score::run_scorer;
use super::scrape::run_scraper;

/// Run the full pipeline: scrape, score, clean up.
///
/// Scoring is skipped when no oracle is available.
pub async fn run_pipeline(
    config: &Config,
    sources: &[Box<dyn PostingSource>],
    store: &dyn JobStore,
    oracle: Option<&dyn ScoringOracle>,
) -> Result<()> {
    log::info!("Pipeline starting");

    log::info!("[1/3] Scrape - Fetching and classifying postings");
    run_scraper(config, sources, store).await?;

    log::info!("[2/3] Score - Rating new jobs");
    match oracle {
        Some(oracle) => {
            run_scorer(
                store,
                oracle,
                &config.profile,
                config.scorer.batch_size,
                config.scorer.max_batches,
            )
            .await?;
        }
        None => log::warn!("No scoring oracle configured, skipping"),
    }

    log::info!("[3/3] Cleanup - Removing stale jobs");
    run_cleanup(store, config.cleanup.max_age_days, config.cleanup.min_score).await?;

    log::info!("Pipeline complete");
    Ok(())
}
