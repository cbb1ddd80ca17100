//! Strong/weak seniority signals extracted from a posting.

use serde::Serialize;

use super::vocabulary::{LEVEL, SENIOR, Vocabulary};
use crate::models::Posting;

/// Lowercased view of the fields the classifier reads.
#[derive(Debug, Clone, Default)]
pub(crate) struct FieldText {
    pub title: String,
    pub description: String,
    pub company: String,
    pub tags: Vec<String>,
}

impl FieldText {
    pub fn from_posting(posting: &Posting) -> Self {
        Self {
            title: posting.title.trim().to_lowercase(),
            description: posting.description.to_lowercase(),
            company: posting.company.trim().to_lowercase(),
            tags: Posting::normalize_tags(&posting.tags),
        }
    }

    /// Title, description and company: the fields that count as strong evidence.
    pub fn strong_fields(&self) -> [&str; 3] {
        [
            self.title.as_str(),
            self.description.as_str(),
            self.company.as_str(),
        ]
    }
}

/// Evidence strength of one vocabulary in a posting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Strength {
    /// A phrase occurs in title, description or company.
    pub strong: bool,
    /// A phrase occurs only as a tag.
    pub weak: bool,
}

impl Strength {
    pub fn of(vocabulary: &Vocabulary, fields: &FieldText) -> Self {
        let strong = fields
            .strong_fields()
            .iter()
            .any(|text| vocabulary.any_in_lowercase(text));
        let weak = !strong && vocabulary.any_in_tags(&fields.tags);
        Self { strong, weak }
    }
}

/// Seniority signals for one posting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Signals {
    pub strong_level: bool,
    pub weak_level: bool,
    pub senior_strong: bool,
    /// Senior phrase only in tags; recorded for audit, never decisive.
    pub senior_weak: bool,
}

impl Signals {
    pub(crate) fn extract(fields: &FieldText) -> Self {
        let level = Strength::of(&LEVEL, fields);
        let senior = Strength::of(&SENIOR, fields);
        Self {
            strong_level: level.strong,
            weak_level: level.weak,
            senior_strong: senior.strong,
            senior_weak: senior.weak,
        }
    }

    /// Extract signals straight from a posting.
    pub fn of_posting(posting: &Posting) -> Self {
        Self::extract(&FieldText::from_posting(posting))
    }

    /// Strong senior evidence with no strong level evidence to offset it.
    pub fn senior_veto(&self) -> bool {
        self.senior_strong && !self.strong_level
    }
}
