//! Fixed seniority vocabularies.

use std::sync::LazyLock;

use super::matcher::PhraseMatcher;

/// Phrases indicating a senior-level role.
pub const SENIOR_TERMS: &[&str] = &[
    "senior",
    "sr.",
    "sr",
    "lead",
    "principal",
    "manager",
    "director",
    "head",
    "staff",
    "executive",
];

/// Phrases indicating a junior, intern or entry-level role.
pub const LEVEL_TERMS: &[&str] = &[
    "intern",
    "internship",
    "student",
    "graduate",
    "junior",
    "entry-level",
    "entry level",
    "jr.",
    "jr",
];

/// Compiled senior vocabulary.
pub static SENIOR: LazyLock<Vocabulary> = LazyLock::new(|| Vocabulary::new(SENIOR_TERMS));

/// Compiled junior/entry-level vocabulary.
pub static LEVEL: LazyLock<Vocabulary> = LazyLock::new(|| Vocabulary::new(LEVEL_TERMS));

/// Whether a (lowercase) keyword belongs to the level vocabulary.
pub fn is_level_term(phrase: &str) -> bool {
    LEVEL_TERMS.contains(&phrase)
}

/// A read-only list of compiled phrases.
#[derive(Debug)]
pub struct Vocabulary {
    matchers: Vec<PhraseMatcher>,
}

impl Vocabulary {
    pub fn new(terms: &[&str]) -> Self {
        Self {
            matchers: terms.iter().map(|t| PhraseMatcher::new(t)).collect(),
        }
    }

    pub fn matchers(&self) -> &[PhraseMatcher] {
        &self.matchers
    }

    /// Any phrase occurs in the (lowercased) text.
    pub(crate) fn any_in_lowercase(&self, text: &str) -> bool {
        self.matchers.iter().any(|m| m.is_match_lowercase(text))
    }

    /// Any phrase is one of the tags.
    pub(crate) fn any_in_tags<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        self.matchers.iter().any(|m| m.in_tags(tags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_term_membership() {
        assert!(is_level_term("intern"));
        assert!(is_level_term("entry level"));
        assert!(!is_level_term("python"));
        assert!(!is_level_term("senior"));
    }

    #[test]
    fn test_vocabularies_compile_with_boundaries() {
        assert_eq!(SENIOR.matchers().len(), SENIOR_TERMS.len());
        assert!(SENIOR.matchers().iter().all(|m| !m.is_substring_fallback()));
        assert!(LEVEL.matchers().iter().all(|m| !m.is_substring_fallback()));
    }

    #[test]
    fn test_senior_vocabulary_scans_text() {
        assert!(SENIOR.any_in_lowercase("staff engineer"));
        assert!(!SENIOR.any_in_lowercase("desires engineer"));
        assert!(LEVEL.any_in_lowercase("graduate program"));
    }
}
