//! Storage layer for the lexmem vocabulary system
//!
//! Provides the keyed-record contract over `(word, lang)` and its libSQL
//! implementation. Every operation runs to completion as one unit against
//! the durable store; concurrent callers are serialized by the backend's
//! single-writer guarantee, not by the core.

pub mod libsql;

use crate::error::Result;
use crate::types::{
    LanguageCode, NewWord, ScheduleUpdate, SearchField, SortKey, VocabEntry, VocabStats,
};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Storage backend trait defining the vocabulary-store contract
///
/// All operations are keyed by `(word, lang)` unless noted. Language
/// validation happens before any of these are reached; implementations may
/// assume a well-formed code.
#[async_trait]
pub trait VocabStore: Send + Sync {
    /// Insert each pair with creation defaults if absent; update the
    /// definition only if present. Scheduling state is never touched.
    /// Returns the count of entries affected.
    async fn upsert_words(
        &self,
        words: &[NewWord],
        lang: &LanguageCode,
        today: NaiveDate,
    ) -> Result<usize>;

    /// Retrieve one entry, or `None` if absent
    async fn get_word(&self, word: &str, lang: &LanguageCode) -> Result<Option<VocabEntry>>;

    /// Remove one entry; `WordNotFound` if absent
    async fn delete_word(&self, word: &str, lang: &LanguageCode) -> Result<()>;

    /// Remove every entry for a language; returns the prior count (0 is
    /// a valid, non-error result)
    async fn delete_all_words(&self, lang: &LanguageCode) -> Result<usize>;

    /// All entries for a language, ascending by the sort key, optionally
    /// capped
    async fn list_words(
        &self,
        lang: &LanguageCode,
        sort: SortKey,
        limit: Option<usize>,
    ) -> Result<Vec<VocabEntry>>;

    /// Substring match against word, definition, or both, in the store's
    /// natural scan order
    async fn search_words(
        &self,
        query: &str,
        lang: &LanguageCode,
        field: SearchField,
    ) -> Result<Vec<VocabEntry>>;

    /// Subset of `candidates` absent from the store, input order preserved
    async fn filter_new_words(
        &self,
        candidates: &[String],
        lang: &LanguageCode,
    ) -> Result<Vec<String>>;

    /// Entries with `next_review <= today`, ascending by `next_review`
    /// (most overdue first), optionally capped
    async fn due_reviews(
        &self,
        lang: &LanguageCode,
        today: NaiveDate,
        limit: Option<usize>,
    ) -> Result<Vec<VocabEntry>>;

    /// Read-only rollup over one language vocabulary
    async fn statistics(&self, lang: &LanguageCode, today: NaiveDate) -> Result<VocabStats>;

    /// Replace the definition; `WordNotFound` if absent
    async fn update_definition(
        &self,
        word: &str,
        lang: &LanguageCode,
        definition: &str,
    ) -> Result<()>;

    /// Rewind scheduling state to creation defaults, definition untouched;
    /// `WordNotFound` if absent
    async fn reset_progress(&self, word: &str, lang: &LanguageCode, today: NaiveDate)
        -> Result<()>;

    /// Persist the four scheduling fields computed for a submitted review;
    /// `WordNotFound` if absent
    async fn apply_review(
        &self,
        word: &str,
        lang: &LanguageCode,
        update: &ScheduleUpdate,
    ) -> Result<()>;
}
