// src/pipeline/scrape.rs

//! Scraping pipeline: fetch, classify, store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::classifier::{Classifier, KeywordSet};
use crate::error::Result;
use crate::models::{AcceptedPosting, Config, Posting, SaveSummary};
use crate::services::PostingSource;
use crate::storage::JobStore;
use crate::utils::http::create_async_client;

/// Summary of a scrape run.
#[derive(Debug, Default)]
pub struct ScrapeReport {
    /// Postings returned by all sources
    pub fetched: usize,
    pub accepted: usize,
    pub rejected: usize,
    /// Sources that failed outright
    pub source_failures: usize,
    pub saved: SaveSummary,
    /// Final rejection reason codes and how often each occurred
    pub rejection_reasons: BTreeMap<&'static str, usize>,
}

/// Postings of one source split into kept and dropped.
#[derive(Debug, Default)]
pub struct Screening {
    pub accepted: Vec<AcceptedPosting>,
    pub rejected: usize,
    pub rejection_reasons: BTreeMap<&'static str, usize>,
}

/// Run postings through the classifier, or accept them all when `classify`
/// is off for their source.
pub fn screen_postings(
    classifier: &Classifier,
    postings: Vec<Posting>,
    classify: bool,
    scraped_at: DateTime<Utc>,
) -> Screening {
    let mut screening = Screening::default();

    for posting in postings {
        if !classify {
            screening.accepted.push(AcceptedPosting {
                posting,
                skill_matches: Vec::new(),
                level_matches: Vec::new(),
                scraped_at,
            });
            continue;
        }

        let result = classifier.classify(&posting);
        if result.accepted {
            log::debug!(
                "Accepted '{}' at {}: {}",
                posting.title,
                posting.company,
                result.reason_tags().join(" -> ")
            );
            screening.accepted.push(AcceptedPosting {
                skill_matches: result.skill_keywords(),
                level_matches: result.level_keywords(),
                posting,
                scraped_at,
            });
        } else {
            log::debug!(
                "Rejected '{}' at {}: {}",
                posting.title,
                posting.company,
                result.reason_tags().join(" -> ")
            );
            screening.rejected += 1;
            if let Some(reason) = result.final_reason() {
                *screening.rejection_reasons.entry(reason.code()).or_default() += 1;
            }
        }
    }

    screening
}

/// Run the scraper over every source and store what passes.
pub async fn run_scraper(
    config: &Config,
    sources: &[Box<dyn PostingSource>],
    store: &dyn JobStore,
) -> Result<ScrapeReport> {
    log::info!("Scraper starting with {} sources", sources.len());

    let classifier = Classifier::new(
        KeywordSet::new(&config.classifier.keywords),
        config.classifier.options(),
    );
    let keywords = classifier.keywords();
    log::info!(
        "Classifier: {} keywords (skills: [{}], levels: [{}]), junior_only={}",
        keywords.len(),
        keywords.skill_keywords().collect::<Vec<_>>().join(", "),
        keywords.level_keywords().collect::<Vec<_>>().join(", "),
        classifier.options().junior_only
    );
    let client = create_async_client(&config.scraper)?;
    let mut report = ScrapeReport::default();
    let mut accepted = Vec::new();

    for source in sources {
        let postings = match source.fetch(&client).await {
            Ok(postings) => postings,
            Err(error) => {
                report.source_failures += 1;
                log::warn!("Source {} failed: {}", source.name(), error);
                continue;
            }
        };

        report.fetched += postings.len();
        let screening = screen_postings(&classifier, postings, source.classify(), Utc::now());
        log::info!(
            "{}: kept {} postings, rejected {}",
            source.name(),
            screening.accepted.len(),
            screening.rejected
        );

        report.rejected += screening.rejected;
        for (reason, count) in screening.rejection_reasons {
            *report.rejection_reasons.entry(reason).or_default() += count;
        }
        accepted.extend(screening.accepted);
    }

    report.accepted = accepted.len();
    report.saved = store.save_jobs(&accepted).await?;

    for (reason, count) in &report.rejection_reasons {
        log::debug!("Rejected {count} postings: {reason}");
    }

    let stats = store.stats().await?;
    log::info!(
        "Scrape complete: fetched {}, accepted {}, saved {} new ({} duplicates)",
        report.fetched,
        report.accepted,
        report.saved.new,
        report.saved.duplicates
    );
    log::info!(
        "Store: {} total, {} new, {} interested, {} applied",
        stats.total,
        stats.new,
        stats.interested,
        stats.applied
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::JobStatus;
    use crate::storage::LocalStorage;
    use async_trait::async_trait;
    use reqwest::Client;
    use tempfile::TempDir;

    struct FixedSource {
        name: &'static str,
        classify: bool,
        postings: Vec<Posting>,
    }

    #[async_trait]
    impl PostingSource for FixedSource {
        fn name(&self) -> &str {
            self.name
        }

        fn classify(&self) -> bool {
            self.classify
        }

        async fn fetch(&self, _client: &Client) -> Result<Vec<Posting>> {
            Ok(self.postings.clone())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl PostingSource for BrokenSource {
        fn name(&self) -> &str {
            "Broken"
        }

        async fn fetch(&self, _client: &Client) -> Result<Vec<Posting>> {
            Err(AppError::source_failed("Broken", "status 503"))
        }
    }

    fn posting(title: &str, tags: &[&str]) -> Posting {
        Posting {
            title: title.to_string(),
            company: "Acme".to_string(),
            url: format!("https://example.com/{}", title.replace(' ', "-")),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Posting::default()
        }
    }

    #[test]
    fn test_screen_postings_records_matches_and_reasons() {
        let classifier = Classifier::new(KeywordSet::new(["python", "junior"]), Default::default());
        let screening = screen_postings(
            &classifier,
            vec![
                posting("Junior Python Developer", &[]),
                posting("Senior Python Engineer", &[]),
                posting("Software Engineer", &["python"]),
            ],
            true,
            Utc::now(),
        );

        assert_eq!(screening.accepted.len(), 1);
        assert_eq!(screening.accepted[0].skill_matches, vec!["python"]);
        assert_eq!(screening.accepted[0].level_matches, vec!["junior"]);
        assert_eq!(screening.rejected, 2);
        assert_eq!(
            screening.rejection_reasons.get("senior_in_title_or_desc_and_no_strong_level"),
            Some(&1)
        );
        assert_eq!(screening.rejection_reasons.get("no_level_signal"), Some(&1));
    }

    #[test]
    fn test_screen_postings_bypass() {
        let classifier = Classifier::new(KeywordSet::new(["python"]), Default::default());
        let screening = screen_postings(
            &classifier,
            vec![posting("Senior Staff Engineer", &[])],
            false,
            Utc::now(),
        );
        assert_eq!(screening.accepted.len(), 1);
        assert!(screening.accepted[0].skill_matches.is_empty());
        assert_eq!(screening.rejected, 0);
    }

    #[tokio::test]
    async fn test_run_scraper_skips_failing_source() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStorage::new(tmp.path());
        let sources: Vec<Box<dyn PostingSource>> = vec![
            Box::new(BrokenSource),
            Box::new(FixedSource {
                name: "Fixed",
                classify: true,
                postings: vec![
                    posting("AI Engineer Intern", &[]),
                    posting("AI Engineer Intern", &[]),
                    posting("Engineering Manager", &[]),
                ],
            }),
        ];

        let report = run_scraper(&Config::default(), &sources, &store)
            .await
            .unwrap();
        assert_eq!(report.source_failures, 1);
        assert_eq!(report.fetched, 3);
        assert_eq!(report.accepted, 2);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.saved, SaveSummary { new: 1, duplicates: 1 });

        let jobs = store.list_jobs(JobStatus::New, 10).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].level_matches, vec!["intern"]);
        assert_eq!(jobs[0].skill_matches, vec!["ai engineer"]);
    }
}
