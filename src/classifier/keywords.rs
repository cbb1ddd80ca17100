//! Caller-supplied keyword sets and per-field match collection.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use super::matcher::PhraseMatcher;
use super::signals::FieldText;
use super::vocabulary::is_level_term;

/// Where in a posting a keyword matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Description,
    Tag,
    Company,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
            Field::Tag => "tag",
            Field::Company => "company",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One keyword occurrence in one field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Match {
    pub keyword: String,
    pub field: Field,
}

impl Match {
    pub fn new(keyword: impl Into<String>, field: Field) -> Self {
        Self {
            keyword: keyword.into(),
            field,
        }
    }
}

#[derive(Debug, Clone)]
struct Keyword {
    matcher: PhraseMatcher,
    is_level: bool,
}

/// A deduplicated set of lowercase keywords with precompiled matchers.
///
/// Keywords found in the level vocabulary are level keywords, the rest are
/// skill keywords.
#[derive(Debug, Clone, Default)]
pub struct KeywordSet {
    keywords: Vec<Keyword>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        let keywords = unique
            .into_iter()
            .map(|phrase| Keyword {
                is_level: is_level_term(&phrase),
                matcher: PhraseMatcher::new(&phrase),
            })
            .collect();

        Self { keywords }
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn skill_keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords
            .iter()
            .filter(|k| !k.is_level)
            .map(|k| k.matcher.phrase())
    }

    pub fn level_keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords
            .iter()
            .filter(|k| k.is_level)
            .map(|k| k.matcher.phrase())
    }

    /// Record every (keyword, field) hit, split into skill and level matches.
    pub(crate) fn collect_matches(&self, fields: &FieldText) -> KeywordMatches {
        let mut matches = KeywordMatches::default();

        for keyword in &self.keywords {
            let m = &keyword.matcher;
            let mut fields_hit = Vec::new();
            if m.is_match_lowercase(&fields.title) {
                fields_hit.push(Field::Title);
            }
            if m.is_match_lowercase(&fields.description) {
                fields_hit.push(Field::Description);
            }
            if m.in_tags(&fields.tags) {
                fields_hit.push(Field::Tag);
            }
            if m.is_match_lowercase(&fields.company) {
                fields_hit.push(Field::Company);
            }

            let target = if keyword.is_level {
                &mut matches.level
            } else {
                &mut matches.skill
            };
            target.extend(fields_hit.into_iter().map(|f| Match::new(m.phrase(), f)));
        }

        matches
    }
}

impl<S: AsRef<str>> FromIterator<S> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Keyword hits of one posting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct KeywordMatches {
    pub skill: BTreeSet<Match>,
    pub level: BTreeSet<Match>,
}

impl KeywordMatches {
    /// Number of distinct keywords (not match pairs) across both sets.
    pub fn distinct_keywords(&self) -> usize {
        self.skill
            .iter()
            .chain(self.level.iter())
            .map(|m| m.keyword.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// Sorted, deduplicated keywords of a match set.
pub fn keywords_of(matches: &BTreeSet<Match>) -> Vec<String> {
    matches
        .iter()
        .map(|m| m.keyword.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Fields each keyword matched in, keyed by keyword.
pub fn fields_by_keyword(matches: &BTreeSet<Match>) -> BTreeMap<&str, Vec<Field>> {
    let mut out: BTreeMap<&str, Vec<Field>> = BTreeMap::new();
    for m in matches {
        out.entry(m.keyword.as_str()).or_default().push(m.field);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Posting;

    fn fields(title: &str, description: &str, company: &str, tags: &[&str]) -> FieldText {
        FieldText::from_posting(&Posting {
            title: title.into(),
            description: description.into(),
            company: company.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Posting::default()
        })
    }

    #[test]
    fn test_keywords_are_normalized_and_partitioned() {
        let set = KeywordSet::new(["Python", "python ", "", "Intern", "AI Engineer"]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.level_keywords().collect::<Vec<_>>(), ["intern"]);
        assert_eq!(set.skill_keywords().collect::<Vec<_>>(), ["ai engineer", "python"]);
    }

    #[test]
    fn test_collects_matches_per_field() {
        let set: KeywordSet = ["python", "junior"].into_iter().collect();
        let found = set.collect_matches(&fields(
            "Junior Python Developer",
            "Python and Django",
            "Acme",
            &["python", "junior"],
        ));

        assert_eq!(
            found.skill,
            BTreeSet::from([
                Match::new("python", Field::Title),
                Match::new("python", Field::Description),
                Match::new("python", Field::Tag),
            ])
        );
        assert_eq!(
            found.level,
            BTreeSet::from([
                Match::new("junior", Field::Title),
                Match::new("junior", Field::Tag),
            ])
        );
        assert_eq!(found.distinct_keywords(), 2);
    }

    #[test]
    fn test_company_matches_are_recorded() {
        let set = KeywordSet::new(["junior"]);
        let found = set.collect_matches(&fields("Desires Engineer", "", "Junior Software Labs", &[]));
        assert_eq!(found.level, BTreeSet::from([Match::new("junior", Field::Company)]));
        assert!(found.skill.is_empty());
    }

    #[test]
    fn test_keywords_of_sorts_and_dedups() {
        let matches = BTreeSet::from([
            Match::new("react", Field::Tag),
            Match::new("python", Field::Title),
            Match::new("python", Field::Description),
        ]);
        assert_eq!(keywords_of(&matches), vec!["python", "react"]);
        assert_eq!(
            fields_by_keyword(&matches)["python"],
            vec![Field::Title, Field::Description]
        );
    }
}
