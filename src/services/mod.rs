//! Service layer for the job scout application.
//!
//! This module contains the outward-facing collaborators:
//! - Posting sources (`RemoteOkSource`, `BoardSource`)
//! - The scoring oracle (`GeminiScorer`)

mod board;
mod remoteok;
mod scorer;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::Result;
use crate::models::{Config, Posting, SourceConfig};

pub use board::{BoardSource, parse_listing, search_url};
pub use remoteok::{RemoteOkSource, parse_response};
pub use scorer::{GeminiScorer, JobScore, ScoringOracle, build_prompt, parse_scores};

/// Anything that can produce raw postings for the classifier.
#[async_trait]
pub trait PostingSource: Send + Sync {
    /// Label used in logs and stored as the posting source.
    fn name(&self) -> &str;

    /// Whether postings from this source go through the classifier.
    fn classify(&self) -> bool {
        true
    }

    async fn fetch(&self, client: &Client) -> Result<Vec<Posting>>;
}

/// Instantiate every configured source.
///
/// Board selectors are checked here so a typo fails before any request.
pub fn build_sources(config: &Config) -> Result<Vec<Box<dyn PostingSource>>> {
    config
        .sources
        .iter()
        .map(|source| -> Result<Box<dyn PostingSource>> {
            match source {
                SourceConfig::RemoteOk(c) => Ok(Box::new(RemoteOkSource::new(c.clone()))),
                SourceConfig::HtmlBoard(c) => {
                    Ok(Box::new(BoardSource::new(c.clone(), &config.scraper)?))
                }
            }
        })
        .collect()
}
