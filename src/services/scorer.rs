//! Language model scoring oracle.
//!
//! Jobs are scored in batches: one prompt lists the candidate profile and
//! several jobs, the model answers with a JSON array of `{id, score, analysis}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{CandidateProfile, JobRecord, ScorerConfig};
use crate::utils::truncate_graphemes;

const SYSTEM_INSTRUCTION: &str = "You are a job scoring assistant. Return only valid JSON.";
const PROMPT_TAGS: usize = 5;

/// Relevance verdict for one stored job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobScore {
    pub id: u64,
    /// 0 to 100
    pub score: u8,
    pub analysis: String,
}

/// Anything that can rate stored jobs against a candidate profile.
#[async_trait]
pub trait ScoringOracle: Send + Sync {
    async fn score_batch(
        &self,
        jobs: &[JobRecord],
        profile: &CandidateProfile,
    ) -> Result<Vec<JobScore>>;
}

/// Job as shown to the model.
#[derive(Serialize)]
struct PromptJob<'a> {
    id: u64,
    title: &'a str,
    company: &'a str,
    description: String,
    tags: &'a [String],
}

/// Build the batch scoring prompt.
pub fn build_prompt(
    jobs: &[JobRecord],
    profile: &CandidateProfile,
    description_chars: usize,
) -> Result<String> {
    let prompt_jobs: Vec<PromptJob> = jobs
        .iter()
        .map(|job| PromptJob {
            id: job.id,
            title: &job.title,
            company: &job.company,
            description: truncate_graphemes(&job.description, description_chars),
            tags: &job.tags[..job.tags.len().min(PROMPT_TAGS)],
        })
        .collect();
    let jobs_json = serde_json::to_string(&prompt_jobs)?;
    let n = jobs.len();

    Ok(format!(
        "Score these {n} jobs for this candidate:

CANDIDATE SKILLS: {skills}
JOB TYPE: {job_type}
LOCATION: {locations}

JOBS TO SCORE:
{jobs_json}

SCORING SCALE:
- 90-100: Perfect match (key skills match, relevant tech role)
- 70-89: Strong match (most skills match)
- 50-69: Decent match (some skills match)
- 30-49: Weak match (few skills match)
- 0-29: Not relevant (retail, sales, non-tech)

RETURN ONLY THIS JSON (no markdown, no explanation):
[
  {{\"id\": 1, \"score\": 85, \"analysis\": \"Strong Python/ML match\"}},
  {{\"id\": 2, \"score\": 30, \"analysis\": \"Retail job, not relevant\"}}
]

Keep each analysis under 50 words. Return JSON for ALL {n} jobs.",
        skills = profile.skills.join(", "),
        job_type = profile.job_type,
        locations = profile.locations.join(", "),
    ))
}

#[derive(Deserialize)]
struct RawScore {
    id: u64,
    score: f64,
    #[serde(default)]
    analysis: String,
}

/// Strip a leading markdown code fence, with or without a `json` label.
fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(rest) => rest.split("```").next().unwrap_or(rest).trim(),
        None => text,
    }
}

/// Parse the model's answer. Scores are clamped to 0..=100.
pub fn parse_scores(text: &str) -> Result<Vec<JobScore>> {
    let body = strip_fences(text);
    let raw: Vec<RawScore> = serde_json::from_str(body).map_err(|e| {
        let preview = truncate_graphemes(body, 200);
        AppError::scoring(format!("unparseable answer ({e}): {preview}"))
    })?;

    Ok(raw
        .into_iter()
        .map(|r| JobScore {
            id: r.id,
            score: r.score.round().clamp(0.0, 100.0) as u8,
            analysis: r.analysis.trim().to_string(),
        })
        .collect())
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .find_map(|p| p.text)
    }
}

/// Scoring oracle backed by the Gemini `generateContent` API.
pub struct GeminiScorer {
    client: Client,
    url: String,
    api_key: String,
    temperature: f32,
    description_chars: usize,
}

impl GeminiScorer {
    /// Create a scorer, reading the API key from the configured variable.
    pub fn new(config: &ScorerConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AppError::config(format!(
                    "environment variable {} is not set",
                    config.api_key_env
                ))
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: format!(
                "{}/models/{}:generateContent",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
            api_key,
            temperature: config.temperature,
            description_chars: config.prompt_description_chars,
        })
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "temperature": self.temperature },
        });

        let response: GenerateResponse = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .first_text()
            .ok_or_else(|| AppError::scoring("response has no candidate text"))
    }
}

#[async_trait]
impl ScoringOracle for GeminiScorer {
    async fn score_batch(
        &self,
        jobs: &[JobRecord],
        profile: &CandidateProfile,
    ) -> Result<Vec<JobScore>> {
        if jobs.is_empty() {
            return Ok(Vec::new());
        }
        let prompt = build_prompt(jobs, profile, self.description_chars)?;
        let text = self.generate(&prompt).await?;
        let scores = parse_scores(&text)?;
        log::info!("Model scored {} of {} jobs", scores.len(), jobs.len());
        Ok(scores)
    }
}
