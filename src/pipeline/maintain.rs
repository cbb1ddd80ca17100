// src/pipeline/maintain.rs

//! Store maintenance: cleanup and export.

use std::path::Path;

use chrono::{TimeDelta, Utc};

use crate::error::{AppError, Result};
use crate::models::JobStatus;
use crate::storage::JobStore;

/// Delete jobs older than `max_age_days` or scored below `min_score`.
pub async fn run_cleanup(store: &dyn JobStore, max_age_days: i64, min_score: u8) -> Result<usize> {
    let cutoff = TimeDelta::try_days(max_age_days.max(0))
        .and_then(|age| Utc::now().checked_sub_signed(age))
        .ok_or_else(|| AppError::validation("cleanup.max_age_days out of range"))?;
    log::info!(
        "Cleaning up jobs created before {} or scored below {}",
        cutoff.format("%Y-%m-%d"),
        min_score
    );

    let deleted = store.cleanup(cutoff, min_score).await?;
    let stats = store.stats().await?;
    log::info!("Deleted {} jobs, {} remain", deleted, stats.total);
    Ok(deleted)
}

/// Write up to `limit` new jobs to `path` as pretty JSON.
pub async fn export_json(store: &dyn JobStore, path: &Path, limit: usize) -> Result<usize> {
    let jobs = store.list_jobs(JobStatus::New, limit).await?;
    let json = serde_json::to_string_pretty(&jobs)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, json).await?;

    log::info!("Exported {} jobs to {}", jobs.len(), path.display());
    Ok(jobs.len())
}
