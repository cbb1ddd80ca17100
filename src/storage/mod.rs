//! Storage abstractions for job persistence.
//!
//! Jobs are keyed by a content hash of (title, company, url); saving a job
//! whose hash is already stored counts as a duplicate and changes nothing.
//!
//! ## Directory Structure
//!
//! ```text
//! storage/
//! ├── config.toml           # Configuration
//! └── jobs.json             # Every stored job plus the id counter
//! ```

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::models::{AcceptedPosting, JobRecord, JobStats, JobStatus, SaveSummary};
use crate::utils::truncate_graphemes;

// Re-export for convenience
pub use local::LocalStorage;

/// Stable identity of a posting: SHA-256 hex of title, company and url.
pub fn job_hash(title: &str, company: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(company.as_bytes());
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Build the stored form of an accepted posting.
pub fn new_record(
    id: u64,
    accepted: &AcceptedPosting,
    created_at: DateTime<Utc>,
    description_chars: usize,
) -> JobRecord {
    let p = &accepted.posting;
    JobRecord {
        id,
        job_hash: job_hash(&p.title, &p.company, &p.url),
        title: p.title.clone(),
        company: p.company.clone(),
        location: p.location.clone(),
        url: p.url.clone(),
        salary: p.salary.clone(),
        description: truncate_graphemes(&p.description, description_chars),
        date_posted: p.date_posted.clone(),
        tags: p.tags.clone(),
        source: p.source.clone(),
        search_keyword: p.search_keyword.clone(),
        skill_matches: accepted.skill_matches.clone(),
        level_matches: accepted.level_matches.clone(),
        scraped_at: accepted.scraped_at,
        created_at,
        status: JobStatus::New,
        ai_score: None,
        ai_analysis: None,
    }
}

/// Trait for job storage backends.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert accepted postings, skipping any whose hash is already stored.
    async fn save_jobs(&self, jobs: &[AcceptedPosting]) -> Result<SaveSummary>;

    /// Jobs with the given status, newest first.
    async fn list_jobs(&self, status: JobStatus, limit: usize) -> Result<Vec<JobRecord>>;

    /// New jobs that have not been scored yet, newest first.
    async fn unscored_jobs(&self, limit: usize) -> Result<Vec<JobRecord>>;

    async fn update_score(&self, id: u64, score: u8, analysis: &str) -> Result<()>;

    async fn update_status(&self, id: u64, status: JobStatus) -> Result<()>;

    /// Jobs scored at least `min_score`, best first, then newest first.
    async fn jobs_by_score(&self, min_score: u8, limit: usize) -> Result<Vec<JobRecord>>;

    async fn stats(&self) -> Result<JobStats>;

    /// Delete jobs created before `cutoff` or scored below `min_score`.
    ///
    /// Returns the number of deleted jobs.
    async fn cleanup(&self, cutoff: DateTime<Utc>, min_score: u8) -> Result<usize>;
}
