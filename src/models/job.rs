//! Stored job records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::Posting;

/// Review status of a stored job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    New,
    Interested,
    Applied,
    Archived,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::New => "new",
            JobStatus::Interested => "interested",
            JobStatus::Applied => "applied",
            JobStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(JobStatus::New),
            "interested" => Ok(JobStatus::Interested),
            "applied" => Ok(JobStatus::Applied),
            "archived" => Ok(JobStatus::Archived),
            other => Err(AppError::validation(format!("unknown job status '{other}'"))),
        }
    }
}

/// A posting that passed classification, ready for the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AcceptedPosting {
    pub posting: Posting,
    /// Sorted, deduplicated skill keywords that matched
    pub skill_matches: Vec<String>,
    /// Sorted, deduplicated level keywords that matched
    pub level_matches: Vec<String>,
    pub scraped_at: DateTime<Utc>,
}

/// A job as persisted by a [`crate::storage::JobStore`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobRecord {
    pub id: u64,
    pub job_hash: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub url: String,
    pub salary: String,
    pub description: String,
    pub date_posted: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub source: String,
    #[serde(default)]
    pub search_keyword: String,
    #[serde(default)]
    pub skill_matches: Vec<String>,
    #[serde(default)]
    pub level_matches: Vec<String>,
    pub scraped_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub ai_score: Option<u8>,
    #[serde(default)]
    pub ai_analysis: Option<String>,
}

impl JobRecord {
    pub fn is_scored(&self) -> bool {
        self.ai_score.is_some()
    }
}

/// Outcome of saving a batch of accepted postings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveSummary {
    pub new: usize,
    pub duplicates: usize,
}

/// Job counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JobStats {
    pub total: usize,
    pub new: usize,
    pub interested: usize,
    pub applied: usize,
}
