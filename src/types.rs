//! Core data types for the lexmem vocabulary system
//!
//! This module defines the fundamental data structures used throughout
//! lexmem: vocabulary entries, the validated language-code newtype, the
//! fixed query-shaping enums, and the result types returned across the
//! service boundary. Caller-supplied text is parsed into these types before
//! it reaches the scheduler or the store.

use crate::error::{LexmemError, Result};
use crate::scheduler::INITIAL_EASE_FACTOR;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Repetition count at which an entry counts as mastered
pub const MASTERY_THRESHOLD: u32 = 3;

/// Ease factor below which an entry counts as difficult
pub const DIFFICULTY_THRESHOLD: f64 = 2.0;

/// Validated ISO 639-1 language code (exactly two lowercase ASCII letters)
///
/// Vocabularies for different codes are fully isolated: identical word
/// strings under different languages are unrelated entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Parse and validate a language code
    pub fn new(code: &str) -> Result<Self> {
        if code.len() == 2 && code.chars().all(|c| c.is_ascii_lowercase()) {
            Ok(Self(code.to_string()))
        } else {
            Err(LexmemError::InvalidLanguage(code.to_string()))
        }
    }

    /// The code as a plain string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for LanguageCode {
    type Err = LexmemError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single vocabulary entry with its review-scheduling state
///
/// The composite natural key is `(word, lang)`. The four scheduling fields
/// are advanced only by review submission and rewound only by a progress
/// reset; re-adding an existing word touches the definition alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabEntry {
    /// The word being learned
    pub word: String,

    /// Language this entry belongs to
    pub lang: LanguageCode,

    /// Definition or translation
    pub definition: String,

    /// Consecutive successful recalls since the last reset
    pub repetition_count: u32,

    /// Interval growth multiplier, never below 1.3
    pub ease_factor: f64,

    /// Days until the next scheduled review
    pub interval_days: u32,

    /// Date of the most recent submitted review, if any
    pub last_reviewed: Option<NaiveDate>,

    /// Date the entry becomes due
    pub next_review: NaiveDate,
}

impl VocabEntry {
    /// Create an entry with creation defaults, due immediately
    pub fn new(word: &str, definition: &str, lang: LanguageCode, today: NaiveDate) -> Self {
        Self {
            word: word.to_string(),
            lang,
            definition: definition.to_string(),
            repetition_count: 0,
            ease_factor: INITIAL_EASE_FACTOR,
            interval_days: 0,
            last_reviewed: None,
            next_review: today,
        }
    }

    /// Whether the entry is due on or before the given date
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_review <= today
    }

    /// Heuristic mastery classification
    pub fn is_mastered(&self) -> bool {
        self.repetition_count >= MASTERY_THRESHOLD
    }

    /// Whether the entry is considered difficult
    pub fn is_difficult(&self) -> bool {
        self.ease_factor < DIFFICULTY_THRESHOLD
    }
}

/// A word/definition pair headed for the store's upsert path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWord {
    pub word: String,
    pub definition: String,
}

impl NewWord {
    pub fn new(word: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            definition: definition.into(),
        }
    }
}

/// Fixed allow-list of sort keys for listing a vocabulary
///
/// Each key maps to a column name chosen here, never assembled from caller
/// text, so query shaping stays out of the caller's hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    NextReview,
    EaseFactor,
    Word,
    RepetitionCount,
}

impl SortKey {
    /// Column to sort by (ascending)
    pub(crate) fn column(&self) -> &'static str {
        match self {
            SortKey::NextReview => "next_review",
            SortKey::EaseFactor => "ease_factor",
            SortKey::Word => "word",
            SortKey::RepetitionCount => "repetition_count",
        }
    }
}

impl FromStr for SortKey {
    type Err = LexmemError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "next_review" => Ok(SortKey::NextReview),
            "ease_factor" => Ok(SortKey::EaseFactor),
            "word" => Ok(SortKey::Word),
            "repetition_count" => Ok(SortKey::RepetitionCount),
            other => Err(LexmemError::InvalidSortKey(other.to_string())),
        }
    }
}

/// Where a substring search looks for matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Word,
    Definition,
    Both,
}

impl FromStr for SearchField {
    type Err = LexmemError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "word" => Ok(SearchField::Word),
            "definition" => Ok(SearchField::Definition),
            "both" => Ok(SearchField::Both),
            other => Err(LexmemError::InvalidSearchField(other.to_string())),
        }
    }
}

/// Read-only statistics rollup for one language vocabulary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabStats {
    /// Language the rollup covers
    pub lang: LanguageCode,

    /// Count of all entries
    pub total_words: usize,

    /// Entries with `next_review` on or before today
    pub due_today: usize,

    /// Entries with `repetition_count >= 3`
    pub mastered_words: usize,

    /// Entries with `ease_factor < 2.0`
    pub difficult_words: usize,

    /// Mean ease factor, 2.5 for an empty vocabulary (2 decimals)
    pub average_ease_factor: f64,

    /// `mastered / total * 100`, 0 for an empty vocabulary (1 decimal)
    pub mastery_rate: f64,
}

/// Refreshed snapshot returned after a submitted review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    pub word: String,
    pub lang: LanguageCode,
    pub repetition_count: u32,

    /// Ease factor rounded to 2 decimals for display
    pub ease_factor: f64,
    pub interval_days: u32,
    pub last_reviewed: NaiveDate,
    pub next_review: NaiveDate,
}

/// The four scheduling fields persisted by a submitted review
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleUpdate {
    pub repetition_count: u32,
    pub ease_factor: f64,
    pub interval_days: u32,
    pub last_reviewed: NaiveDate,
    pub next_review: NaiveDate,
}

/// Round to two decimal places for display
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to one decimal place for display
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
