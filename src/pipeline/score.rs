// src/pipeline/score.rs

//! Scoring pipeline: rate unscored jobs in batches.

use serde::Serialize;

use crate::error::Result;
use crate::models::{CandidateProfile, JobStatus};
use crate::services::ScoringOracle;
use crate::storage::JobStore;

/// Summary of a scoring run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoringReport {
    /// Batches sent to the oracle, failed ones included
    pub batches: usize,
    pub failed_batches: usize,
    pub scored: usize,
}

/// Score distribution over every scored job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreStatistics {
    pub total_scored: usize,
    /// 70 and up
    pub high: usize,
    /// 40 to 69
    pub medium: usize,
    /// Below 40
    pub low: usize,
    pub average: f64,
}

/// Score unscored jobs until none remain or `max_batches` is reached.
///
/// A batch that fails is logged and skipped; its jobs stay unscored, so the
/// loop stops rather than asking for the same batch again.
pub async fn run_scorer(
    store: &dyn JobStore,
    oracle: &dyn ScoringOracle,
    profile: &CandidateProfile,
    batch_size: usize,
    max_batches: usize,
) -> Result<ScoringReport> {
    let mut report = ScoringReport::default();
    let batch_size = batch_size.max(1);

    while report.batches < max_batches {
        let jobs = store.unscored_jobs(batch_size).await?;
        if jobs.is_empty() {
            log::info!("No unscored jobs left");
            break;
        }

        report.batches += 1;
        log::info!("Batch {}: scoring {} jobs", report.batches, jobs.len());

        let scores = match oracle.score_batch(&jobs, profile).await {
            Ok(scores) => scores,
            Err(error) => {
                report.failed_batches += 1;
                log::warn!("Batch {} failed: {}", report.batches, error);
                break;
            }
        };

        let mut saved = 0usize;
        for score in scores {
            if !jobs.iter().any(|j| j.id == score.id) {
                log::debug!("Ignoring score for job {} outside the batch", score.id);
                continue;
            }
            store
                .update_score(score.id, score.score, &score.analysis)
                .await?;
            saved += 1;
        }
        report.scored += saved;

        if saved == 0 {
            log::warn!("Batch {} produced no usable scores", report.batches);
            break;
        }
    }

    log::info!(
        "Scoring complete: {} jobs scored in {} batches",
        report.scored,
        report.batches
    );
    Ok(report)
}

/// Score distribution of the store.
pub async fn score_statistics(store: &dyn JobStore) -> Result<ScoreStatistics> {
    let mut stats = ScoreStatistics::default();
    let mut sum = 0u64;

    for status in [
        JobStatus::New,
        JobStatus::Interested,
        JobStatus::Applied,
        JobStatus::Archived,
    ] {
        for job in store.list_jobs(status, usize::MAX).await? {
            let Some(score) = job.ai_score else {
                continue;
            };
            stats.total_scored += 1;
            sum += u64::from(score);
            match score {
                70.. => stats.high += 1,
                40..=69 => stats.medium += 1,
                _ => stats.low += 1,
            }
        }
    }

    if stats.total_scored > 0 {
        stats.average = sum as f64 / stats.total_scored as f64;
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::{AcceptedPosting, JobRecord, Posting};
    use crate::services::JobScore;
    use crate::storage::LocalStorage;
    use async_trait::async_trait;
    use chrono::Utc;
    use tempfile::TempDir;

    /// Scores every job by id: 100 - 10 * id.
    struct FakeOracle;

    #[async_trait]
    impl ScoringOracle for FakeOracle {
        async fn score_batch(
            &self,
            jobs: &[JobRecord],
            _profile: &CandidateProfile,
        ) -> Result<Vec<JobScore>> {
            Ok(jobs
                .iter()
                .map(|j| JobScore {
                    id: j.id,
                    score: 100u8.saturating_sub(10 * j.id as u8),
                    analysis: format!("job {}", j.id),
                })
                .collect())
        }
    }

    struct FailingOracle;

    #[async_trait]
    impl ScoringOracle for FailingOracle {
        async fn score_batch(
            &self,
            _jobs: &[JobRecord],
            _profile: &CandidateProfile,
        ) -> Result<Vec<JobScore>> {
            Err(AppError::scoring("model unavailable"))
        }
    }

    async fn seeded_store(tmp: &TempDir, count: usize) -> LocalStorage {
        let store = LocalStorage::new(tmp.path());
        let accepted: Vec<AcceptedPosting> = (1..=count)
            .map(|i| AcceptedPosting {
                posting: Posting {
                    title: format!("Intern {i}"),
                    company: "Acme".into(),
                    url: format!("https://example.com/{i}"),
                    ..Posting::default()
                },
                skill_matches: vec![],
                level_matches: vec!["intern".into()],
                scraped_at: Utc::now(),
            })
            .collect();
        store.save_jobs(&accepted).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_scores_all_jobs_in_batches() {
        let tmp = TempDir::new().unwrap();
        let store = seeded_store(&tmp, 5).await;

        let report = run_scorer(&store, &FakeOracle, &CandidateProfile::default(), 2, 20)
            .await
            .unwrap();
        assert_eq!(report.batches, 3);
        assert_eq!(report.scored, 5);
        assert!(store.unscored_jobs(10).await.unwrap().is_empty());

        let stats = score_statistics(&store).await.unwrap();
        assert_eq!(stats.total_scored, 5);
        // scores 90, 80, 70, 60, 50
        assert_eq!(stats.high, 3);
        assert_eq!(stats.medium, 2);
        assert_eq!(stats.low, 0);
        assert!((stats.average - 70.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_respects_max_batches() {
        let tmp = TempDir::new().unwrap();
        let store = seeded_store(&tmp, 5).await;

        let report = run_scorer(&store, &FakeOracle, &CandidateProfile::default(), 2, 1)
            .await
            .unwrap();
        assert_eq!(report.batches, 1);
        assert_eq!(report.scored, 2);
        assert_eq!(store.unscored_jobs(10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_failed_batch_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let store = seeded_store(&tmp, 3).await;

        let report = run_scorer(&store, &FailingOracle, &CandidateProfile::default(), 10, 20)
            .await
            .unwrap();
        assert_eq!(report.batches, 1);
        assert_eq!(report.failed_batches, 1);
        assert_eq!(report.scored, 0);
        assert_eq!(store.unscored_jobs(10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_statistics_of_empty_store() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStorage::new(tmp.path());
        assert_eq!(score_statistics(&store).await.unwrap(), ScoreStatistics::default());
    }
}
