//! Vocabulary service: the typed boundary over store and scheduler
//!
//! Every operation validates its arguments into the crate's typed forms
//! before any store access (validate-then-write), then runs as one unit
//! against the backend. This is the only place where review submission
//! composes load, SM-2 transition, and persistence.
//!
//! Date-sensitive operations come in pairs: the plain form uses the local
//! calendar date, the `_on` form takes an explicit date for deterministic
//! callers and tests.

use crate::error::{LexmemError, Result};
use crate::import::{parse_import_text, ImportReport};
use crate::scheduler::{schedule, Quality, ScheduleState};
use crate::storage::VocabStore;
use crate::types::{
    round2, LanguageCode, NewWord, ReviewOutcome, ScheduleUpdate, SearchField, SortKey,
    VocabEntry, VocabStats,
};
use chrono::{Duration, Local, NaiveDate};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

/// Default separator for batch import text
const DEFAULT_IMPORT_SEPARATOR: &str = "\n";

/// High-level vocabulary service
///
/// Owns a shared store handle; all state lives in the backend, so the
/// service itself is cheap to clone and safe to share.
#[derive(Clone)]
pub struct VocabService {
    store: Arc<dyn VocabStore>,
}

impl VocabService {
    /// Create a service over any store backend
    pub fn new(store: Arc<dyn VocabStore>) -> Self {
        Self { store }
    }

    /// Today's local calendar date
    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// Validate an optional limit, rejecting non-positive values
    fn validate_limit(limit: Option<i64>) -> Result<Option<usize>> {
        match limit {
            Some(l) if l < 1 => Err(LexmemError::InvalidLimit(l)),
            Some(l) => Ok(Some(l as usize)),
            None => Ok(None),
        }
    }

    /// Check which candidate words are absent from the vocabulary
    ///
    /// Input order is preserved; duplicates in the input pass through.
    pub async fn filter_new_words(
        &self,
        candidate_words: &[String],
        lang: &str,
    ) -> Result<Vec<String>> {
        if candidate_words.is_empty() {
            return Err(LexmemError::EmptyInput("candidate_words".to_string()));
        }
        let lang = LanguageCode::new(lang)?;

        self.store.filter_new_words(candidate_words, &lang).await
    }

    /// Add words, or refresh definitions of words that already exist
    pub async fn add_words(&self, words: &[NewWord], lang: &str) -> Result<usize> {
        self.add_words_on(words, lang, Self::today()).await
    }

    /// `add_words` with an explicit creation date
    pub async fn add_words_on(
        &self,
        words: &[NewWord],
        lang: &str,
        today: NaiveDate,
    ) -> Result<usize> {
        if words.is_empty() {
            return Err(LexmemError::EmptyInput("words".to_string()));
        }
        let lang = LanguageCode::new(lang)?;

        let added = self.store.upsert_words(words, &lang, today).await?;
        info!("Added {} words to '{}' vocabulary", added, lang);
        Ok(added)
    }

    /// Delete one word; fails if absent
    pub async fn delete_word(&self, word: &str, lang: &str) -> Result<()> {
        let lang = LanguageCode::new(lang)?;
        self.store.delete_word(word, &lang).await
    }

    /// Delete every word of a language; returns the prior count
    pub async fn delete_all_words(&self, lang: &str) -> Result<usize> {
        let lang = LanguageCode::new(lang)?;
        self.store.delete_all_words(&lang).await
    }

    /// Retrieve one entry, or `None` if absent
    pub async fn get_word(&self, word: &str, lang: &str) -> Result<Option<VocabEntry>> {
        let lang = LanguageCode::new(lang)?;
        self.store.get_word(word, &lang).await
    }

    /// Words due for review, most overdue first
    pub async fn due_reviews(&self, lang: &str, limit: Option<i64>) -> Result<Vec<VocabEntry>> {
        self.due_reviews_on(lang, limit, Self::today()).await
    }

    /// `due_reviews` with an explicit date
    pub async fn due_reviews_on(
        &self,
        lang: &str,
        limit: Option<i64>,
        today: NaiveDate,
    ) -> Result<Vec<VocabEntry>> {
        let lang = LanguageCode::new(lang)?;
        let limit = Self::validate_limit(limit)?;

        self.store.due_reviews(&lang, today, limit).await
    }

    /// Submit a review result and reschedule the word
    ///
    /// The only mutation path that advances scheduling state forward in
    /// time; `reset_progress` is the only path that rewinds it.
    pub async fn submit_review(&self, word: &str, lang: &str, quality: i64) -> Result<ReviewOutcome> {
        self.submit_review_on(word, lang, quality, Self::today())
            .await
    }

    /// `submit_review` with an explicit review date
    pub async fn submit_review_on(
        &self,
        word: &str,
        lang: &str,
        quality: i64,
        today: NaiveDate,
    ) -> Result<ReviewOutcome> {
        let lang = LanguageCode::new(lang)?;
        let quality = Quality::new(quality)?;

        let entry = self
            .store
            .get_word(word, &lang)
            .await?
            .ok_or_else(|| LexmemError::WordNotFound {
                word: word.to_string(),
                lang: lang.to_string(),
            })?;

        let next = schedule(quality, ScheduleState::from(&entry));
        let update = ScheduleUpdate {
            repetition_count: next.repetition_count,
            ease_factor: next.ease_factor,
            interval_days: next.interval_days,
            last_reviewed: today,
            next_review: today + Duration::days(next.interval_days as i64),
        };

        self.store.apply_review(word, &lang, &update).await?;

        debug!(
            "Reviewed '{}' in '{}' (quality {}): next review {}",
            word,
            lang,
            quality.grade(),
            update.next_review
        );

        Ok(ReviewOutcome {
            word: word.to_string(),
            lang,
            repetition_count: update.repetition_count,
            ease_factor: round2(update.ease_factor),
            interval_days: update.interval_days,
            last_reviewed: update.last_reviewed,
            next_review: update.next_review,
        })
    }

    /// Learning statistics for one language
    pub async fn statistics(&self, lang: &str) -> Result<VocabStats> {
        self.statistics_on(lang, Self::today()).await
    }

    /// `statistics` with an explicit date for the due-today count
    pub async fn statistics_on(&self, lang: &str, today: NaiveDate) -> Result<VocabStats> {
        let lang = LanguageCode::new(lang)?;
        self.store.statistics(&lang, today).await
    }

    /// List a vocabulary sorted ascending by one of the fixed sort keys
    pub async fn list_words(
        &self,
        lang: &str,
        sort_by: &str,
        limit: Option<i64>,
    ) -> Result<Vec<VocabEntry>> {
        let lang = LanguageCode::new(lang)?;
        let sort = SortKey::from_str(sort_by)?;
        let limit = Self::validate_limit(limit)?;

        self.store.list_words(&lang, sort, limit).await
    }

    /// Replace the definition of an existing word
    pub async fn update_definition(
        &self,
        word: &str,
        lang: &str,
        new_definition: &str,
    ) -> Result<()> {
        let lang = LanguageCode::new(lang)?;
        self.store.update_definition(word, &lang, new_definition).await
    }

    /// Substring search over word, definition, or both
    pub async fn search_words(
        &self,
        query: &str,
        lang: &str,
        search_in: &str,
    ) -> Result<Vec<VocabEntry>> {
        let lang = LanguageCode::new(lang)?;
        let field = SearchField::from_str(search_in)?;

        self.store.search_words(query, &lang, field).await
    }

    /// Rewind a word's learning progress to creation defaults
    pub async fn reset_progress(&self, word: &str, lang: &str) -> Result<()> {
        self.reset_progress_on(word, lang, Self::today()).await
    }

    /// `reset_progress` with an explicit date for the new `next_review`
    pub async fn reset_progress_on(
        &self,
        word: &str,
        lang: &str,
        today: NaiveDate,
    ) -> Result<()> {
        let lang = LanguageCode::new(lang)?;
        self.store.reset_progress(word, &lang, today).await
    }

    /// Batch import "word - definition" lines
    ///
    /// Malformed lines are reported, never fatal: every valid line in the
    /// batch is committed regardless of failures elsewhere.
    pub async fn import_from_text(
        &self,
        text: &str,
        lang: &str,
        separator: Option<&str>,
    ) -> Result<ImportReport> {
        self.import_from_text_on(text, lang, separator, Self::today())
            .await
    }

    /// `import_from_text` with an explicit creation date
    pub async fn import_from_text_on(
        &self,
        text: &str,
        lang: &str,
        separator: Option<&str>,
        today: NaiveDate,
    ) -> Result<ImportReport> {
        let lang = LanguageCode::new(lang)?;
        let separator = separator.unwrap_or(DEFAULT_IMPORT_SEPARATOR);

        let parsed = parse_import_text(text, separator);

        let imported = if parsed.entries.is_empty() {
            0
        } else {
            self.store.upsert_words(&parsed.entries, &lang, today).await?
        };

        info!(
            "Imported {} words into '{}', {} lines failed",
            imported,
            lang,
            parsed.failures.len()
        );

        Ok(ImportReport::new(imported, parsed.failures))
    }
}
