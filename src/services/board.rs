//! HTML job board source.
//!
//! Fetches one search-result page per configured keyword and extracts
//! postings using the board's CSS selectors.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{BoardConfig, Posting, ScraperConfig};
use crate::services::PostingSource;
use crate::utils::http::fetch_text;
use crate::utils::{normalize_whitespace, resolve_url};

const UNKNOWN: &str = "Unknown";

/// Compiled selectors of one board.
struct BoardSelectors {
    row: Selector,
    title: Selector,
    link: Option<Selector>,
    company: Option<Selector>,
    location: Option<Selector>,
    description: Option<Selector>,
    date: Option<Selector>,
    salary: Option<Selector>,
    tag: Option<Selector>,
}

impl BoardSelectors {
    fn compile(config: &BoardConfig) -> Result<Self> {
        let optional = |s: &Option<String>| s.as_deref().map(parse_selector).transpose();
        Ok(Self {
            row: parse_selector(&config.row_selector)?,
            title: parse_selector(&config.title_selector)?,
            link: optional(&config.link_selector)?,
            company: optional(&config.company_selector)?,
            location: optional(&config.location_selector)?,
            description: optional(&config.description_selector)?,
            date: optional(&config.date_selector)?,
            salary: optional(&config.salary_selector)?,
            tag: optional(&config.tag_selector)?,
        })
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Whitespace-normalized text of the first match, empty when absent.
fn first_text(row: &ElementRef, selector: Option<&Selector>) -> String {
    selector
        .and_then(|sel| row.select(sel).next())
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .unwrap_or_default()
}

fn or_default(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

/// Search URL for a keyword; spaces become `+`.
pub fn search_url(template: &str, keyword: &str) -> String {
    template.replace("{keyword}", &keyword.trim().replace(' ', "+"))
}

/// Extract postings from one search-result page.
///
/// Rows without a title are skipped. Links are resolved against `page_url`.
pub fn parse_listing(
    config: &BoardConfig,
    html: &str,
    page_url: &str,
    keyword: &str,
) -> Result<Vec<Posting>> {
    let selectors = BoardSelectors::compile(config)?;
    let base_url = Url::parse(page_url)?;
    let document = Html::parse_document(html);

    let mut postings = Vec::new();
    for row in document.select(&selectors.row) {
        let Some(title_elem) = row.select(&selectors.title).next() else {
            continue;
        };
        let title = normalize_whitespace(&title_elem.text().collect::<String>());
        if title.is_empty() {
            continue;
        }

        let link_elem = selectors
            .link
            .as_ref()
            .and_then(|sel| row.select(sel).next())
            .unwrap_or(title_elem);
        let url = link_elem
            .value()
            .attr(&config.attr_name)
            .map(|href| resolve_url(&base_url, href.trim()))
            .unwrap_or_default();

        let tags = match &selectors.tag {
            Some(sel) => Posting::normalize_tags(
                row.select(sel)
                    .map(|el| normalize_whitespace(&el.text().collect::<String>())),
            ),
            None => Vec::new(),
        };

        postings.push(Posting {
            title,
            company: or_default(first_text(&row, selectors.company.as_ref()), UNKNOWN),
            description: first_text(&row, selectors.description.as_ref()),
            tags,
            location: or_default(
                first_text(&row, selectors.location.as_ref()),
                &config.default_location,
            ),
            url,
            date_posted: or_default(first_text(&row, selectors.date.as_ref()), UNKNOWN),
            source: config.name.clone(),
            salary: or_default(
                first_text(&row, selectors.salary.as_ref()),
                &config.default_salary,
            ),
            search_keyword: keyword.to_string(),
        });
    }

    Ok(postings)
}

/// Source backed by an HTML search page.
pub struct BoardSource {
    config: BoardConfig,
    delay: Duration,
    concurrency: usize,
}

impl BoardSource {
    /// Create a board source, failing on selectors that do not parse.
    pub fn new(config: BoardConfig, scraper: &ScraperConfig) -> Result<Self> {
        BoardSelectors::compile(&config)?;
        Ok(Self {
            config,
            delay: Duration::from_millis(scraper.request_delay_ms),
            concurrency: scraper.max_concurrent.max(1),
        })
    }

    async fn fetch_keyword(&self, client: &Client, keyword: &str) -> Result<Vec<Posting>> {
        let url = search_url(&self.config.search_url, keyword);
        log::debug!("{}: searching '{}' at {}", self.config.name, keyword, url);
        let html = fetch_text(client, &url).await?;
        parse_listing(&self.config, &html, &url, keyword)
    }
}

#[async_trait]
impl PostingSource for BoardSource {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn classify(&self) -> bool {
        self.config.classify
    }

    async fn fetch(&self, client: &Client) -> Result<Vec<Posting>> {
        let searches: Vec<_> = self
            .config
            .keywords
            .iter()
            .map(|keyword| {
                let keyword: &str = keyword.as_str();
                async move { (keyword, self.fetch_keyword(client, keyword).await) }
            })
            .collect();
        let mut results = stream::iter(searches).buffer_unordered(self.concurrency);

        let mut seen = HashSet::new();
        let mut postings = Vec::new();
        let mut failures = 0usize;

        while let Some((keyword, result)) = results.next().await {
            match result {
                Ok(found) => {
                    log::info!(
                        "{}: '{}' returned {} postings",
                        self.config.name,
                        keyword,
                        found.len()
                    );
                    for posting in found {
                        if posting.url.is_empty() || seen.insert(posting.url.clone()) {
                            postings.push(posting);
                        }
                    }
                }
                Err(error) => {
                    failures += 1;
                    log::warn!(
                        "{}: search for '{}' failed: {}",
                        self.config.name,
                        keyword,
                        error
                    );
                }
            }

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        if failures > 0 && failures == self.config.keywords.len() {
            return Err(AppError::source_failed(
                &self.config.name,
                format!("all {failures} keyword searches failed"),
            ));
        }
        Ok(postings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> BoardConfig {
        toml::from_str(
            r#"
            name = "Cake"
            search_url = "https://www.cake.me/jobs/{keyword}?seniority=internship"
            keywords = ["ai engineer", "python"]
            row_selector = "div.job-card"
            title_selector = "a.title"
            company_selector = ".company"
            location_selector = ".location"
            description_selector = ".summary"
            tag_selector = "span.tag"
            default_location = "Taiwan"
            "#,
        )
        .unwrap()
    }

    const PAGE: &str = r#"
        <html><body>
          <div class="job-card">
            <a class="title" href="/companies/acme/jobs/ai-intern">  AI Engineer
              Intern </a>
            <span class="company">Acme</span>
            <span class="summary">Build LLM agents</span>
            <span class="tag">Python</span><span class="tag">LLM</span>
          </div>
          <div class="job-card">
            <a class="title" href="https://other.example/job/2">Backend Intern</a>
            <span class="location">Taipei</span>
          </div>
          <div class="job-card"><span class="company">No title</span></div>
          <div class="job-card"><a class="title" href="/x">   </a></div>
        </body></html>
    "#;

    #[test]
    fn test_search_url_replaces_spaces() {
        assert_eq!(
            search_url("https://example.com/jobs/{keyword}?page=1", " ai engineer "),
            "https://example.com/jobs/ai+engineer?page=1"
        );
    }

    #[test]
    fn test_parse_listing_extracts_rows() {
        let page_url = "https://www.cake.me/jobs/ai+engineer?seniority=internship";
        let postings = parse_listing(&board(), PAGE, page_url, "ai engineer").unwrap();
        assert_eq!(postings.len(), 2);

        let first = &postings[0];
        assert_eq!(first.title, "AI Engineer Intern");
        assert_eq!(first.url, "https://www.cake.me/companies/acme/jobs/ai-intern");
        assert_eq!(first.company, "Acme");
        assert_eq!(first.description, "Build LLM agents");
        assert_eq!(first.tags, vec!["python", "llm"]);
        assert_eq!(first.location, "Taiwan");
        assert_eq!(first.date_posted, "Unknown");
        assert_eq!(first.salary, "Not specified");
        assert_eq!(first.source, "Cake");
        assert_eq!(first.search_keyword, "ai engineer");

        let second = &postings[1];
        assert_eq!(second.url, "https://other.example/job/2");
        assert_eq!(second.company, "Unknown");
        assert_eq!(second.location, "Taipei");
    }

    #[test]
    fn test_parse_listing_rejects_invalid_selector() {
        let mut config = board();
        config.title_selector = "[[invalid".to_string();
        let err = parse_listing(&config, PAGE, "https://www.cake.me/", "x").unwrap_err();
        assert!(matches!(err, AppError::Selector { .. }));
    }

    #[tokio::test]
    async fn test_fetch_fails_when_every_keyword_fails() {
        let mut config = board();
        config.search_url = "http://127.0.0.1:9/jobs/{keyword}".to_string();
        let scraper = ScraperConfig {
            request_delay_ms: 0,
            timeout_secs: 2,
            ..ScraperConfig::default()
        };
        let source = BoardSource::new(config, &scraper).unwrap();

        let err = source.fetch(&Client::new()).await.unwrap_err();
        assert!(matches!(err, AppError::Source { .. }));
    }

    #[tokio::test]
    async fn test_fetch_without_keywords_is_empty() {
        let mut config = board();
        config.keywords.clear();
        let source = BoardSource::new(config, &ScraperConfig::default()).unwrap();

        assert!(source.fetch(&Client::new()).await.unwrap().is_empty());
    }

    #[test]
    fn test_parse_selector_valid() {
        assert!(parse_selector("div.class").is_ok());
        assert!(parse_selector("tr:has(a)").is_ok());
        assert!(parse_selector("[[invalid").is_err());
    }
}
