//! Candidate profile used for relevance scoring.

use serde::{Deserialize, Serialize};

/// What the candidate can do and what they are looking for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateProfile {
    #[serde(default = "defaults::skills")]
    pub skills: Vec<String>,

    /// Kind of position wanted (e.g. "internship")
    #[serde(default = "defaults::job_type")]
    pub job_type: String,

    #[serde(default = "defaults::locations")]
    pub locations: Vec<String>,

    /// Scores below this are considered irrelevant
    #[serde(default = "defaults::min_relevance")]
    pub min_relevance: u8,
}

impl Default for CandidateProfile {
    fn default() -> Self {
        Self {
            skills: defaults::skills(),
            job_type: defaults::job_type(),
            locations: defaults::locations(),
            min_relevance: defaults::min_relevance(),
        }
    }
}

mod defaults {
    pub fn skills() -> Vec<String> {
        [
            "Frontend Development",
            "Backend Development",
            "AI Agents",
            "AI Engineering",
            "Python",
            "JavaScript",
            "React",
            "Machine Learning",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
    pub fn job_type() -> String {
        "internship".into()
    }
    pub fn locations() -> Vec<String> {
        vec!["Remote".into(), "Taiwan".into()]
    }
    pub fn min_relevance() -> u8 {
        40
    }
}
