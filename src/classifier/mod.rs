//! Posting classification.
//!
//! Decides whether a posting is a junior/intern-level role worth keeping.
//! The decision combines three kinds of evidence:
//!
//! - **Level signals**: phrases from [`LEVEL_TERMS`] found in the title,
//!   description or company (strong) or only in the tags (weak).
//! - **Senior signals**: phrases from [`SENIOR_TERMS`], same tiers. Strong
//!   senior evidence without strong level evidence vetoes the posting.
//! - **Keyword matches**: the caller's [`KeywordSet`], split into skill and
//!   level keywords, recorded per field.
//!
//! [`classify`] is a pure function; every branch it takes is appended to the
//! result's reason trail.

mod keywords;
mod matcher;
mod signals;
mod vocabulary;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};

pub use keywords::{Field, KeywordSet, Match, fields_by_keyword, keywords_of};
pub use matcher::{PhraseMatcher, phrase_in_field, phrase_in_tags};
pub use signals::Signals;
pub use vocabulary::{LEVEL_TERMS, SENIOR_TERMS, is_level_term};

use keywords::KeywordMatches;
use signals::FieldText;

use crate::models::Posting;

/// Decision flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyOptions {
    /// Distinct keywords needed when `junior_only` is off.
    pub min_keyword_matches: usize,
    pub junior_only: bool,
    /// Tag-only level evidence also needs a skill keyword match.
    pub require_skill_match: bool,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            min_keyword_matches: 2,
            junior_only: true,
            require_skill_match: true,
        }
    }
}

/// One step of the decision trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// Step 1: strong senior evidence, no strong level evidence.
    SeniorWithoutStrongLevel,
    /// Enough distinct keywords matched (junior filter off).
    KeywordMatches { count: usize },
    /// Too few distinct keywords matched (junior filter off).
    InsufficientKeywordMatches { count: usize, required: usize },
    StrongLevel,
    LevelAndSkillMatches {
        levels: Vec<String>,
        skills: Vec<String>,
    },
    WeakLevelSupported,
    WeakLevelUnsupported,
    NoLevelSignal,
    /// Step 4: the senior veto applied after the main decision.
    FinalSeniorVeto,
}

impl Reason {
    /// Stable tag without details.
    pub fn code(&self) -> &'static str {
        match self {
            Reason::SeniorWithoutStrongLevel => "senior_in_title_or_desc_and_no_strong_level",
            Reason::KeywordMatches { .. } => "keyword_matches",
            Reason::InsufficientKeywordMatches { .. } => "insufficient_keyword_matches",
            Reason::StrongLevel => "strong_level_in_title_or_description_or_company",
            Reason::LevelAndSkillMatches { .. } => "level_keyword_and_skill_keyword_matches",
            Reason::WeakLevelSupported => "weak_level_from_tags_but_keywords_support",
            Reason::WeakLevelUnsupported => "weak_level_only_in_tags_and_no_skill_match",
            Reason::NoLevelSignal => "no_level_signal",
            Reason::FinalSeniorVeto => "senior_strong_and_no_strong_level",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::KeywordMatches { count } => write!(f, "{}={}", self.code(), count),
            Reason::InsufficientKeywordMatches { count, required } => {
                write!(f, "{}={}<{}", self.code(), count, required)
            }
            Reason::LevelAndSkillMatches { levels, skills } => write!(
                f,
                "{} (levels=[{}], skills=[{}])",
                self.code(),
                levels.join(", "),
                skills.join(", ")
            ),
            _ => f.write_str(self.code()),
        }
    }
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of classifying one posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub accepted: bool,
    pub skill_matches: BTreeSet<Match>,
    pub level_matches: BTreeSet<Match>,
    /// Every branch taken, in order.
    pub reasons: Vec<Reason>,
    pub signals: Signals,
}

impl ClassificationResult {
    /// Sorted skill keywords that matched anywhere.
    pub fn skill_keywords(&self) -> Vec<String> {
        keywords_of(&self.skill_matches)
    }

    /// Sorted level keywords that matched anywhere.
    pub fn level_keywords(&self) -> Vec<String> {
        keywords_of(&self.level_matches)
    }

    /// Reason trail rendered as audit tags.
    pub fn reason_tags(&self) -> Vec<String> {
        self.reasons.iter().map(|r| r.to_string()).collect()
    }

    /// The last reason, i.e. the one that settled the outcome.
    pub fn final_reason(&self) -> Option<&Reason> {
        self.reasons.last()
    }
}

/// Classify a posting against a keyword set.
pub fn classify(
    posting: &Posting,
    keywords: &KeywordSet,
    options: &ClassifyOptions,
) -> ClassificationResult {
    let fields = FieldText::from_posting(posting);
    let signals = Signals::extract(&fields);
    let matches = keywords.collect_matches(&fields);
    let mut reasons = Vec::new();

    if let Some(reason) = early_senior_veto(&signals) {
        reasons.push(reason);
        return ClassificationResult {
            accepted: false,
            skill_matches: matches.skill,
            level_matches: matches.level,
            reasons,
            signals,
        };
    }

    let accepted = if options.junior_only {
        junior_decision(&signals, &matches, options, &mut reasons)
    } else {
        keyword_count_decision(&matches, options, &mut reasons)
    };
    let accepted = final_senior_veto(&signals, accepted, &mut reasons);

    ClassificationResult {
        accepted,
        skill_matches: matches.skill,
        level_matches: matches.level,
        reasons,
        signals,
    }
}

/// Step 1: reject before any other evaluation.
fn early_senior_veto(signals: &Signals) -> Option<Reason> {
    signals
        .senior_veto()
        .then_some(Reason::SeniorWithoutStrongLevel)
}

/// Step 2: plain keyword count.
fn keyword_count_decision(
    matches: &KeywordMatches,
    options: &ClassifyOptions,
    reasons: &mut Vec<Reason>,
) -> bool {
    let count = matches.distinct_keywords();
    if count >= options.min_keyword_matches {
        reasons.push(Reason::KeywordMatches { count });
        true
    } else {
        reasons.push(Reason::InsufficientKeywordMatches {
            count,
            required: options.min_keyword_matches,
        });
        false
    }
}

/// Step 3: first applicable junior-level branch.
fn junior_decision(
    signals: &Signals,
    matches: &KeywordMatches,
    options: &ClassifyOptions,
    reasons: &mut Vec<Reason>,
) -> bool {
    let has_level = !matches.level.is_empty();
    let has_skill = !matches.skill.is_empty();

    let (accepted, reason) = if signals.strong_level {
        (true, Reason::StrongLevel)
    } else if has_level && has_skill {
        (
            true,
            Reason::LevelAndSkillMatches {
                levels: keywords_of(&matches.level),
                skills: keywords_of(&matches.skill),
            },
        )
    } else if signals.weak_level {
        if has_level && (!options.require_skill_match || has_skill) {
            (true, Reason::WeakLevelSupported)
        } else {
            (false, Reason::WeakLevelUnsupported)
        }
    } else {
        (false, Reason::NoLevelSignal)
    };

    reasons.push(reason);
    accepted
}

/// Step 4: the senior veto overrides whatever was decided before it.
fn final_senior_veto(signals: &Signals, accepted: bool, reasons: &mut Vec<Reason>) -> bool {
    if signals.senior_veto() {
        reasons.push(Reason::FinalSeniorVeto);
        return false;
    }
    accepted
}

/// A keyword set bundled with its decision flags.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    keywords: KeywordSet,
    options: ClassifyOptions,
}

impl Classifier {
    pub fn new(keywords: KeywordSet, options: ClassifyOptions) -> Self {
        Self { keywords, options }
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    pub fn options(&self) -> &ClassifyOptions {
        &self.options
    }

    pub fn classify(&self, posting: &Posting) -> ClassificationResult {
        classify(posting, &self.keywords, &self.options)
    }
}
