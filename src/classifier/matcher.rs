//! Whole-word phrase matching.
//!
//! A phrase matches when it occurs in the text and is not glued to a larger
//! token: the characters on either side of the occurrence must be non-word
//! characters or the edge of the text. Phrases are always matched literally.
//! If a boundary-aware pattern cannot be compiled for a phrase, the matcher
//! degrades to plain substring containment instead of failing.

use regex::{Regex, RegexBuilder};

/// Compiled-size ceiling for a single phrase pattern.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

#[derive(Debug, Clone)]
enum Strategy {
    Boundary(Regex),
    Substring,
}

/// A lowercase phrase with its compiled matching strategy.
#[derive(Debug, Clone)]
pub struct PhraseMatcher {
    phrase: String,
    strategy: Strategy,
}

impl PhraseMatcher {
    /// Compile a matcher for `phrase` (trimmed and lowercased).
    pub fn new(phrase: &str) -> Self {
        Self::with_size_limit(phrase, PATTERN_SIZE_LIMIT)
    }

    pub(crate) fn with_size_limit(phrase: &str, size_limit: usize) -> Self {
        let phrase = phrase.trim().to_lowercase();
        let pattern = format!(r"(?:^|\W){}(?:\W|$)", regex::escape(&phrase));
        let strategy = match RegexBuilder::new(&pattern).size_limit(size_limit).build() {
            Ok(re) => Strategy::Boundary(re),
            Err(e) => {
                log::debug!("Phrase '{}' matched as plain substring: {}", phrase, e);
                Strategy::Substring
            }
        };
        Self { phrase, strategy }
    }

    /// The normalized phrase.
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Whether the boundary-aware pattern could not be built.
    pub fn is_substring_fallback(&self) -> bool {
        matches!(self.strategy, Strategy::Substring)
    }

    /// Match against arbitrary text (lowercased here).
    pub fn is_match(&self, text: &str) -> bool {
        self.is_match_lowercase(&text.to_lowercase())
    }

    /// Match against text the caller has already lowercased.
    pub(crate) fn is_match_lowercase(&self, text: &str) -> bool {
        if self.phrase.is_empty() || text.is_empty() {
            return false;
        }
        match &self.strategy {
            Strategy::Boundary(re) => re.is_match(text),
            Strategy::Substring => text.contains(&self.phrase),
        }
    }

    /// Exact case-insensitive membership in a tag list.
    pub fn in_tags<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        !self.phrase.is_empty()
            && tags
                .iter()
                .any(|tag| tag.as_ref().trim().to_lowercase() == self.phrase)
    }
}

/// Whole-word, case-insensitive search for `phrase` in `text`.
pub fn phrase_in_field(text: &str, phrase: &str) -> bool {
    PhraseMatcher::new(phrase).is_match(text)
}

/// Exact, case-insensitive membership of `phrase` in `tags`.
pub fn phrase_in_tags<S: AsRef<str>>(tags: &[S], phrase: &str) -> bool {
    PhraseMatcher::new(phrase).in_tags(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abbreviation_not_matched_inside_word() {
        assert!(!phrase_in_field("Desires Engineer", "sr"));
        assert!(!phrase_in_field("Classroom Assistant", "sr"));
        assert!(phrase_in_field("Sr. Backend Engineer", "sr"));
        assert!(phrase_in_field("Backend Engineer (SR)", "sr"));
    }

    #[test]
    fn test_matches_whole_words_case_insensitively() {
        assert!(phrase_in_field("AI Intern", "intern"));
        assert!(!phrase_in_field("International Sales", "intern"));
        assert!(!phrase_in_field("Leading teams", "lead"));
        assert!(phrase_in_field("Junior Software Labs", "JUNIOR"));
    }

    #[test]
    fn test_multi_word_and_hyphenated_phrases() {
        assert!(phrase_in_field("Hiring an AI Engineer today", "ai engineer"));
        assert!(phrase_in_field("An entry-level role", "entry-level"));
        assert!(phrase_in_field("An entry level role", "entry level"));
        assert!(!phrase_in_field("An entry-levels role", "entry-level"));
    }

    #[test]
    fn test_special_characters_are_literal() {
        assert!(phrase_in_field("We write C++ daily", "c++"));
        assert!(!phrase_in_field("abc++ tooling", "c++"));
        assert!(phrase_in_field("jr. developer", "jr."));
        assert!(!phrase_in_field("jrx developer", "jr."));
        assert!(!phrase_in_field("anything", "(unbalanced"));
        assert!(phrase_in_field("an (unbalanced phrase", "(unbalanced"));
    }

    #[test]
    fn test_empty_inputs_never_match() {
        assert!(!phrase_in_field("", "intern"));
        assert!(!phrase_in_field("intern", ""));
        assert!(!phrase_in_field("intern", "   "));
        assert!(!phrase_in_tags(&["intern"], ""));
    }

    #[test]
    fn test_uncompilable_pattern_degrades_to_substring() {
        let matcher = PhraseMatcher::with_size_limit("sr", 1);
        assert!(matcher.is_substring_fallback());
        assert!(matcher.is_match("Classroom Assistant"));
        assert!(!matcher.is_match("Backend Engineer"));
    }

    #[test]
    fn test_tags_are_exact_membership() {
        let tags = vec!["junior".to_string(), "backend".to_string()];
        assert!(phrase_in_tags(&tags, "Junior"));
        assert!(!phrase_in_tags(&tags, "jun"));
        assert!(!phrase_in_tags(&tags, "python"));
    }
}
