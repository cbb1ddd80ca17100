//! Pipeline entry points for job scout operations.
//!
//! - `run_scraper`: Fetch postings, classify them, store the accepted ones
//! - `run_scorer`: Rate unscored jobs against the candidate profile
//! - `run_cleanup`: Drop stale and irrelevant jobs
//! - `run_pipeline`: All three in order

pub mod maintain;
#[allow(clippy::module_inception)]
pub mod pipeline;
pub mod score;
pub mod scrape;

pub use maintain::{export_json, run_cleanup};
pub use pipeline::run_pipeline;
pub use score::{ScoreStatistics, ScoringReport, run_scorer, score_statistics};
pub use scrape::{ScrapeReport, Screening, run_scraper, screen_postings};
