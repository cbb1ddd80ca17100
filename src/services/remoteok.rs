//! RemoteOK JSON API source.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::models::{DEFAULT_LOCATION, DEFAULT_SALARY, Posting, RemoteOkConfig};
use crate::services::PostingSource;
use crate::utils::http::fetch_text;

const SOURCE_NAME: &str = "RemoteOK";
const JOB_URL_PREFIX: &str = "https://remoteok.com/remote-jobs/";

/// One entry of the API array. Every field is optional upstream.
#[derive(Debug, Deserialize)]
struct RawJob {
    position: Option<String>,
    title: Option<String>,
    company: Option<String>,
    description: Option<String>,
    tags: Option<Vec<String>>,
    location: Option<String>,
    slug: Option<String>,
    id: Option<Value>,
    date: Option<String>,
    created_at: Option<String>,
    salary_min: Option<Value>,
    salary_max: Option<Value>,
}

impl RawJob {
    fn into_posting(self) -> Option<Posting> {
        let title = self
            .position
            .or(self.title)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())?;

        let slug = self
            .slug
            .filter(|s| !s.is_empty())
            .or_else(|| self.id.as_ref().and_then(value_text))
            .unwrap_or_default();

        Some(Posting {
            title,
            company: self.company.unwrap_or_default().trim().to_string(),
            description: self.description.unwrap_or_default(),
            tags: Posting::normalize_tags(self.tags.unwrap_or_default()),
            location: self
                .location
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            url: format!("{JOB_URL_PREFIX}{slug}"),
            date_posted: self.date.or(self.created_at).unwrap_or_default(),
            source: SOURCE_NAME.to_string(),
            salary: salary_text(self.salary_min.as_ref(), self.salary_max.as_ref()),
            search_keyword: String::new(),
        })
    }
}

/// Render a JSON scalar without quotes; null, zero and empty count as absent.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn salary_text(min: Option<&Value>, max: Option<&Value>) -> String {
    match min.and_then(value_text) {
        Some(min) => {
            let max = max.and_then(value_text).unwrap_or_else(|| "N/A".to_string());
            format!("${min}-${max}")
        }
        None => DEFAULT_SALARY.to_string(),
    }
}

/// Parse an API response body into postings.
///
/// The first array element is a legal notice. A body that is not an array,
/// or holds nothing past the notice, yields no postings.
pub fn parse_response(body: &str) -> Result<Vec<Posting>> {
    let value: Value = serde_json::from_str(body)?;
    let Value::Array(entries) = value else {
        log::warn!("{SOURCE_NAME} response is not an array");
        return Ok(Vec::new());
    };

    let mut postings = Vec::new();
    for (i, entry) in entries.into_iter().enumerate().skip(1) {
        match serde_json::from_value::<RawJob>(entry) {
            Ok(raw) => match raw.into_posting() {
                Some(posting) => postings.push(posting),
                None => log::debug!("{SOURCE_NAME} entry {i} has no title, skipped"),
            },
            Err(e) => log::debug!("{SOURCE_NAME} entry {i} is malformed: {e}"),
        }
    }
    Ok(postings)
}

/// Source backed by the RemoteOK public API.
pub struct RemoteOkSource {
    config: RemoteOkConfig,
}

impl RemoteOkSource {
    pub fn new(config: RemoteOkConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl PostingSource for RemoteOkSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    fn classify(&self) -> bool {
        self.config.classify
    }

    async fn fetch(&self, client: &Client) -> Result<Vec<Posting>> {
        log::info!("Fetching {} from {}", SOURCE_NAME, self.config.url);
        let body = fetch_text(client, &self.config.url).await?;
        let postings = parse_response(&body)?;
        log::info!("{} returned {} postings", SOURCE_NAME, postings.len());
        Ok(postings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"[
        {"legal": "API terms of service"},
        {
            "id": "1093",
            "slug": "ai-engineer-intern-acme-1093",
            "position": "AI Engineer Intern",
            "company": " Acme ",
            "description": "Build agents in Python",
            "tags": ["Python", " AI ", ""],
            "date": "2025-01-02T00:00:00+00:00",
            "salary_min": 40000,
            "salary_max": 60000
        },
        {
            "id": 77,
            "title": "Junior Frontend Developer",
            "company": "Widgets",
            "location": "",
            "created_at": "2025-01-03",
            "salary_min": 30000
        },
        {"id": 78, "company": "No Title Inc"},
        {"id": 79, "position": "Bad Tags", "tags": "python"}
    ]"#;

    #[test]
    fn test_parse_response_maps_fields() {
        let postings = parse_response(BODY).unwrap();
        assert_eq!(postings.len(), 2);

        let first = &postings[0];
        assert_eq!(first.title, "AI Engineer Intern");
        assert_eq!(first.company, "Acme");
        assert_eq!(first.tags, vec!["python", "ai"]);
        assert_eq!(first.location, "Remote");
        assert_eq!(
            first.url,
            "https://remoteok.com/remote-jobs/ai-engineer-intern-acme-1093"
        );
        assert_eq!(first.salary, "$40000-$60000");
        assert_eq!(first.source, "RemoteOK");
        assert_eq!(first.date_posted, "2025-01-02T00:00:00+00:00");
    }

    #[test]
    fn test_parse_response_fallbacks() {
        let postings = parse_response(BODY).unwrap();
        let second = &postings[1];
        assert_eq!(second.title, "Junior Frontend Developer");
        assert_eq!(second.url, "https://remoteok.com/remote-jobs/77");
        assert_eq!(second.location, "Remote");
        assert_eq!(second.date_posted, "2025-01-03");
        assert_eq!(second.salary, "$30000-$N/A");
        assert!(second.tags.is_empty());
    }

    #[test]
    fn test_parse_response_without_salary() {
        let body = r#"[{}, {"position": "Data Intern", "salary_min": 0}]"#;
        let postings = parse_response(body).unwrap();
        assert_eq!(postings[0].salary, "Not specified");
    }

    #[test]
    fn test_parse_response_degenerate_bodies() {
        assert!(parse_response(r#"[{"legal": "only"}]"#).unwrap().is_empty());
        assert!(parse_response("[]").unwrap().is_empty());
        assert!(parse_response(r#"{"error": "rate limited"}"#).unwrap().is_empty());
        assert!(parse_response("<html>").is_err());
    }
}
