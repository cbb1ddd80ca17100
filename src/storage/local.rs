//! Local filesystem storage implementation.
//!
//! All jobs live in a single `jobs.json` document under the root directory.
//! Every mutation is a read-modify-write cycle held under an async mutex and
//! finished with an atomic replace (write temp file, then rename).

use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::{AcceptedPosting, JobRecord, JobStats, JobStatus, SaveSummary};
use crate::storage::{JobStore, new_record};

const JOBS_KEY: &str = "jobs.json";
const DEFAULT_DESCRIPTION_CHARS: usize = 500;

/// On-disk document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct JobsFile {
    next_id: u64,
    updated_at: Option<DateTime<Utc>>,
    jobs: Vec<JobRecord>,
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    root_dir: PathBuf,
    description_chars: usize,
    lock: Mutex<()>,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self::with_description_limit(root_dir, DEFAULT_DESCRIPTION_CHARS)
    }

    /// Create a LocalStorage that cuts stored descriptions to `description_chars`.
    pub fn with_description_limit(root_dir: impl Into<PathBuf>, description_chars: usize) -> Self {
        Self {
            root_dir: root_dir.into(),
            description_chars,
            lock: Mutex::new(()),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn load(&self) -> Result<JobsFile> {
        Ok(self.read_json(JOBS_KEY).await?.unwrap_or_default())
    }

    async fn store(&self, mut file: JobsFile) -> Result<()> {
        file.updated_at = Some(Utc::now());
        self.write_json(JOBS_KEY, &file).await
    }

    /// Apply `change` to the record with `id` and persist.
    async fn modify<F>(&self, id: u64, change: F) -> Result<()>
    where
        F: FnOnce(&mut JobRecord) + Send,
    {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;
        let record = file
            .jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or(AppError::NotFound(id))?;
        change(record);
        self.store(file).await
    }

    /// Newest first, ties broken by higher id.
    fn sort_newest_first(jobs: &mut [JobRecord]) {
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    }
}

#[async_trait]
impl JobStore for LocalStorage {
    async fn save_jobs(&self, jobs: &[AcceptedPosting]) -> Result<SaveSummary> {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;
        let mut known: HashSet<String> = file.jobs.iter().map(|j| j.job_hash.clone()).collect();
        let mut summary = SaveSummary::default();
        let total = jobs.len();

        for (i, accepted) in jobs.iter().enumerate() {
            let record = new_record(
                file.next_id + 1,
                accepted,
                Utc::now(),
                self.description_chars,
            );
            if known.insert(record.job_hash.clone()) {
                log::debug!("Job {}/{}: {}", i + 1, total, record.title);
                file.next_id = record.id;
                file.jobs.push(record);
                summary.new += 1;
            } else {
                log::debug!("Job {}/{}: Duplicate - {}", i + 1, total, record.title);
                summary.duplicates += 1;
            }
        }

        if summary.new > 0 {
            self.store(file).await?;
        }
        log::info!(
            "Saved {} new jobs, skipped {} duplicates",
            summary.new,
            summary.duplicates
        );
        Ok(summary)
    }

    async fn list_jobs(&self, status: JobStatus, limit: usize) -> Result<Vec<JobRecord>> {
        let file = self.load().await?;
        let mut jobs: Vec<JobRecord> = file.jobs.into_iter().filter(|j| j.status == status).collect();
        Self::sort_newest_first(&mut jobs);
        jobs.truncate(limit);
        Ok(jobs)
    }

    async fn unscored_jobs(&self, limit: usize) -> Result<Vec<JobRecord>> {
        let file = self.load().await?;
        let mut jobs: Vec<JobRecord> = file
            .jobs
            .into_iter()
            .filter(|j| j.status == JobStatus::New && !j.is_scored())
            .collect();
        Self::sort_newest_first(&mut jobs);
        jobs.truncate(limit);
        Ok(jobs)
    }

    async fn update_score(&self, id: u64, score: u8, analysis: &str) -> Result<()> {
        let analysis = analysis.to_string();
        self.modify(id, move |job| {
            job.ai_score = Some(score.min(100));
            job.ai_analysis = Some(analysis);
        })
        .await
    }

    async fn update_status(&self, id: u64, status: JobStatus) -> Result<()> {
        self.modify(id, move |job| job.status = status).await
    }

    async fn jobs_by_score(&self, min_score: u8, limit: usize) -> Result<Vec<JobRecord>> {
        let file = self.load().await?;
        let mut jobs: Vec<JobRecord> = file
            .jobs
            .into_iter()
            .filter(|j| j.ai_score.is_some_and(|s| s >= min_score))
            .collect();
        jobs.sort_by(|a, b| {
            b.ai_score
                .cmp(&a.ai_score)
                .then(b.created_at.cmp(&a.created_at))
                .then(b.id.cmp(&a.id))
        });
        jobs.truncate(limit);
        Ok(jobs)
    }

    async fn stats(&self) -> Result<JobStats> {
        let file = self.load().await?;
        let count = |status: JobStatus| file.jobs.iter().filter(|j| j.status == status).count();
        Ok(JobStats {
            total: file.jobs.len(),
            new: count(JobStatus::New),
            interested: count(JobStatus::Interested),
            applied: count(JobStatus::Applied),
        })
    }

    async fn cleanup(&self, cutoff: DateTime<Utc>, min_score: u8) -> Result<usize> {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;
        let before = file.jobs.len();
        file.jobs.retain(|j| {
            let expired = j.created_at < cutoff;
            let low_score = j.ai_score.is_some_and(|s| s < min_score);
            !(expired || low_score)
        });
        let deleted = before - file.jobs.len();
        if deleted > 0 {
            self.store(file).await?;
        }
        Ok(deleted)
    }
}
