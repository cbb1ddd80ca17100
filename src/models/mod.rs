// src/models/mod.rs

//! Domain models for the job scout application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod job;
mod posting;
mod profile;

// Re-export all public types
pub use config::{
    BoardConfig, ClassifierConfig, CleanupConfig, Config, RemoteOkConfig, ScorerConfig,
    ScraperConfig, SourceConfig, StorageConfig,
};
pub use job::{AcceptedPosting, JobRecord, JobStats, JobStatus, SaveSummary};
pub use posting::{DEFAULT_LOCATION, DEFAULT_SALARY, Posting};
pub use profile::CandidateProfile;
