//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classifier::{ClassifyOptions, KeywordSet};
use crate::error::{AppError, Result};
use crate::models::CandidateProfile;

/// Longest retention accepted for stored jobs (about a century).
const MAX_AGE_DAYS: i64 = 36_500;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP behavior shared by all sources
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Keyword set and decision flags for the posting classifier
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Where postings come from
    #[serde(default = "defaults::sources")]
    pub sources: Vec<SourceConfig>,

    /// Language model scoring settings
    #[serde(default)]
    pub scorer: ScorerConfig,

    /// Candidate the scorer ranks jobs for
    #[serde(default)]
    pub profile: CandidateProfile,

    /// Retention rules
    #[serde(default)]
    pub cleanup: CleanupConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::validation("scraper.timeout_secs must be > 0"));
        }
        if self.scraper.max_concurrent == 0 {
            return Err(AppError::validation("scraper.max_concurrent must be > 0"));
        }
        if KeywordSet::new(&self.classifier.keywords).is_empty() {
            return Err(AppError::validation("classifier.keywords is empty"));
        }
        if self.sources.is_empty() {
            return Err(AppError::validation("No sources defined"));
        }
        for source in &self.sources {
            if let SourceConfig::HtmlBoard(board) = source {
                if !board.search_url.contains("{keyword}") {
                    return Err(AppError::validation(format!(
                        "source '{}': search_url must contain {{keyword}}",
                        board.name
                    )));
                }
                if board.keywords.is_empty() {
                    return Err(AppError::validation(format!(
                        "source '{}': no search keywords",
                        board.name
                    )));
                }
            }
        }
        if self.scorer.batch_size == 0 {
            return Err(AppError::validation("scorer.batch_size must be > 0"));
        }
        if !(0..=MAX_AGE_DAYS).contains(&self.cleanup.max_age_days) {
            return Err(AppError::validation(format!(
                "cleanup.max_age_days must be within 0..={MAX_AGE_DAYS}"
            )));
        }
        if self.profile.min_relevance > 100 || self.cleanup.min_score > 100 {
            return Err(AppError::validation("scores must be within 0..=100"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scraper: ScraperConfig::default(),
            classifier: ClassifierConfig::default(),
            sources: defaults::sources(),
            scorer: ScorerConfig::default(),
            profile: CandidateProfile::default(),
            cleanup: CleanupConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

/// HTTP client and scraping behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum concurrent requests per source
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Classifier keyword set and flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Skill and level keywords, matched case-insensitively
    #[serde(default = "defaults::keywords")]
    pub keywords: Vec<String>,

    #[serde(default = "defaults::min_keyword_matches")]
    pub min_keyword_matches: usize,

    /// Keep only junior/intern level roles
    #[serde(default = "defaults::yes")]
    pub junior_only: bool,

    /// Weak (tag-only) level evidence also needs a skill keyword
    #[serde(default = "defaults::yes")]
    pub require_skill_match: bool,
}

impl ClassifierConfig {
    pub fn options(&self) -> ClassifyOptions {
        ClassifyOptions {
            min_keyword_matches: self.min_keyword_matches,
            junior_only: self.junior_only,
            require_skill_match: self.require_skill_match,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            keywords: defaults::keywords(),
            min_keyword_matches: defaults::min_keyword_matches(),
            junior_only: true,
            require_skill_match: true,
        }
    }
}

/// A posting source, tagged by `kind` in TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    RemoteOk(RemoteOkConfig),
    HtmlBoard(BoardConfig),
}

impl SourceConfig {
    pub fn name(&self) -> &str {
        match self {
            SourceConfig::RemoteOk(_) => "RemoteOK",
            SourceConfig::HtmlBoard(board) => &board.name,
        }
    }

    /// Whether postings from this source go through the classifier.
    pub fn classify(&self) -> bool {
        match self {
            SourceConfig::RemoteOk(c) => c.classify,
            SourceConfig::HtmlBoard(c) => c.classify,
        }
    }
}

/// RemoteOK JSON API source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteOkConfig {
    #[serde(default = "defaults::remote_ok_url")]
    pub url: String,

    #[serde(default = "defaults::yes")]
    pub classify: bool,
}

impl Default for RemoteOkConfig {
    fn default() -> Self {
        Self {
            url: defaults::remote_ok_url(),
            classify: true,
        }
    }
}

/// HTML search-result board scraped with CSS selectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Source label stored with each posting
    pub name: String,

    /// Search URL with a `{keyword}` placeholder
    pub search_url: String,

    /// Search terms, one request each
    pub keywords: Vec<String>,

    /// CSS selector for one posting row/card
    pub row_selector: String,

    /// CSS selector for the title element
    pub title_selector: String,

    /// Optional link selector (if different from title_selector)
    #[serde(default)]
    pub link_selector: Option<String>,

    /// HTML attribute for link extraction
    #[serde(default = "defaults::href")]
    pub attr_name: String,

    #[serde(default)]
    pub company_selector: Option<String>,

    #[serde(default)]
    pub location_selector: Option<String>,

    #[serde(default)]
    pub description_selector: Option<String>,

    #[serde(default)]
    pub date_selector: Option<String>,

    #[serde(default)]
    pub salary_selector: Option<String>,

    /// Every element matching this selector becomes a tag
    #[serde(default)]
    pub tag_selector: Option<String>,

    #[serde(default = "defaults::location")]
    pub default_location: String,

    #[serde(default = "defaults::salary")]
    pub default_salary: String,

    #[serde(default = "defaults::yes")]
    pub classify: bool,
}

/// Language model scoring settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Base URL of the generative language API
    #[serde(default = "defaults::scorer_endpoint")]
    pub endpoint: String,

    #[serde(default = "defaults::scorer_model")]
    pub model: String,

    /// Name of the environment variable holding the API key
    #[serde(default = "defaults::api_key_env")]
    pub api_key_env: String,

    #[serde(default = "defaults::temperature")]
    pub temperature: f32,

    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,

    #[serde(default = "defaults::max_batches")]
    pub max_batches: usize,

    /// Description length (graphemes) sent to the model per job
    #[serde(default = "defaults::prompt_description_chars")]
    pub prompt_description_chars: usize,

    #[serde(default = "defaults::scorer_timeout")]
    pub timeout_secs: u64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::scorer_endpoint(),
            model: defaults::scorer_model(),
            api_key_env: defaults::api_key_env(),
            temperature: defaults::temperature(),
            batch_size: defaults::batch_size(),
            max_batches: defaults::max_batches(),
            prompt_description_chars: defaults::prompt_description_chars(),
            timeout_secs: defaults::scorer_timeout(),
        }
    }
}

/// Retention rules for stored jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupConfig {
    #[serde(default = "defaults::max_age_days")]
    pub max_age_days: i64,

    /// Scored jobs below this are removed
    #[serde(default = "defaults::cleanup_min_score")]
    pub min_score: u8,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            max_age_days: defaults::max_age_days(),
            min_score: defaults::cleanup_min_score(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Stored descriptions are cut to this many graphemes
    #[serde(default = "defaults::description_chars")]
    pub description_chars: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            description_chars: defaults::description_chars(),
        }
    }
}

mod defaults {
    use super::{RemoteOkConfig, SourceConfig};

    pub fn yes() -> bool {
        true
    }

    // Scraper defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into()
    }
    pub fn timeout() -> u64 {
        15
    }
    pub fn request_delay() -> u64 {
        350
    }
    pub fn max_concurrent() -> usize {
        4
    }

    // Classifier defaults
    pub fn keywords() -> Vec<String> {
        [
            "AI Engineer",
            "Frontend",
            "Backend",
            "Machine Learning",
            "Python",
            "React",
            "Junior",
            "intern",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
    pub fn min_keyword_matches() -> usize {
        2
    }

    // Source defaults
    pub fn sources() -> Vec<SourceConfig> {
        vec![SourceConfig::RemoteOk(RemoteOkConfig::default())]
    }
    pub fn remote_ok_url() -> String {
        "https://remoteok.com/api".into()
    }
    pub fn href() -> String {
        "href".into()
    }
    pub fn location() -> String {
        crate::models::DEFAULT_LOCATION.into()
    }
    pub fn salary() -> String {
        crate::models::DEFAULT_SALARY.into()
    }

    // Scorer defaults
    pub fn scorer_endpoint() -> String {
        "https://generativelanguage.googleapis.com/v1beta".into()
    }
    pub fn scorer_model() -> String {
        "gemini-2.0-flash".into()
    }
    pub fn api_key_env() -> String {
        "GOOGLE_API_KEY".into()
    }
    pub fn temperature() -> f32 {
        0.2
    }
    pub fn batch_size() -> usize {
        10
    }
    pub fn max_batches() -> usize {
        20
    }
    pub fn prompt_description_chars() -> usize {
        250
    }
    pub fn scorer_timeout() -> u64 {
        60
    }

    // Retention defaults
    pub fn max_age_days() -> i64 {
        30
    }
    pub fn cleanup_min_score() -> u8 {
        40
    }
    pub fn description_chars() -> usize {
        500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.scraper.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.scraper.max_concurrent = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_keywords() {
        let mut config = Config::default();
        config.classifier.keywords = vec![" ".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_tagged_sources_from_toml() {
        let config: Config = toml::from_str(
            r#"
            [classifier]
            keywords = ["python", "intern"]
            junior_only = false

            [[sources]]
            kind = "remote_ok"

            [[sources]]
            kind = "html_board"
            name = "Board"
            search_url = "https://jobs.example.com/search?q={keyword}"
            keywords = ["backend intern"]
            row_selector = "article.job"
            title_selector = "h2 a"
            classify = false
            "#,
        )
        .unwrap();

        assert_eq!(config.sources.len(), 2);
        assert!(config.sources[0].classify());
        assert_eq!(config.sources[1].name(), "Board");
        assert!(!config.sources[1].classify());
        assert!(!config.classifier.options().junior_only);
        assert_eq!(config.classifier.min_keyword_matches, 2);
        assert!(config.validate().is_ok());

        match &config.sources[1] {
            SourceConfig::HtmlBoard(board) => {
                assert_eq!(board.attr_name, "href");
                assert_eq!(board.default_location, "Remote");
            }
            other => panic!("unexpected source {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_out_of_range_max_age() {
        let mut config = Config::default();
        config.cleanup.max_age_days = i64::MAX / 1000;
        assert!(config.validate().is_err());
        config.cleanup.max_age_days = -1;
        assert!(config.validate().is_err());
        config.cleanup.max_age_days = 36_500;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sample_config_is_valid() {
        let config: Config = toml::from_str(include_str!("../../storage/config.toml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[1].name(), "Cake");
        assert_eq!(config.scorer.batch_size, 10);
    }

    #[test]
    fn validate_rejects_board_without_placeholder() {
        let mut config = Config::default();
        config.sources.push(SourceConfig::HtmlBoard(BoardConfig {
            name: "Board".into(),
            search_url: "https://jobs.example.com/search".into(),
            keywords: vec!["intern".into()],
            row_selector: "li".into(),
            title_selector: "a".into(),
            link_selector: None,
            attr_name: "href".into(),
            company_selector: None,
            location_selector: None,
            description_selector: None,
            date_selector: None,
            salary_selector: None,
            tag_selector: None,
            default_location: "Remote".into(),
            default_salary: "Not specified".into(),
            classify: true,
        }));
        assert!(config.validate().is_err());
    }
}
