//! Posting data structure.

use serde::{Deserialize, Serialize};

/// Location used when a source does not say where a job is.
pub const DEFAULT_LOCATION: &str = "Remote";

/// Salary text used when a source does not publish one.
pub const DEFAULT_SALARY: &str = "Not specified";

/// A job posting normalized by a source adapter.
///
/// Every field is plain text so a missing value is an empty string rather
/// than a null. `location` and `salary` carry explicit placeholders instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Posting {
    /// Job title
    pub title: String,

    /// Hiring company
    pub company: String,

    /// Free-form description (may be HTML from some sources)
    pub description: String,

    /// Lowercase tags, in source order
    pub tags: Vec<String>,

    /// Location, `"Remote"` unless the source says otherwise
    pub location: String,

    /// Absolute URL of the posting
    pub url: String,

    /// Date as reported by the source, format varies
    pub date_posted: String,

    /// Source label (e.g. `RemoteOK`)
    pub source: String,

    /// Salary text, `"Not specified"` unless the source says otherwise
    pub salary: String,

    /// Search term that surfaced the posting, empty when none
    pub search_keyword: String,
}

impl Default for Posting {
    fn default() -> Self {
        Self {
            title: String::new(),
            company: String::new(),
            description: String::new(),
            tags: Vec::new(),
            location: DEFAULT_LOCATION.to_string(),
            url: String::new(),
            date_posted: String::new(),
            source: String::new(),
            salary: DEFAULT_SALARY.to_string(),
            search_keyword: String::new(),
        }
    }
}

impl Posting {
    /// Lowercase and trim a raw tag list, dropping empty entries.
    pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect()
    }
}
