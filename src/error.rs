//! Error types for the lexmem vocabulary system
//!
//! This module provides structured error handling using thiserror. Every
//! validation failure names the invalid field and the offending value, and
//! is detected before any store mutation takes place.

use thiserror::Error;

/// Main error type for lexmem operations
#[derive(Error, Debug)]
pub enum LexmemError {
    /// Language code is not exactly two lowercase letters
    #[error("Invalid language code: '{0}'. Must be ISO 639-1 format (e.g. 'en', 'ja')")]
    InvalidLanguage(String),

    /// Review quality grade outside the 0-5 range
    #[error("Quality must be between 0 and 5, got {0}")]
    InvalidQuality(i64),

    /// Non-positive result limit
    #[error("Limit must be a positive integer, got {0}")]
    InvalidLimit(i64),

    /// Sort key outside the fixed allow-list
    #[error("Invalid sort key: '{0}'. Must be one of next_review, ease_factor, word, repetition_count")]
    InvalidSortKey(String),

    /// Search field outside the fixed allow-list
    #[error("Invalid search field: '{0}'. Must be one of word, definition, both")]
    InvalidSearchField(String),

    /// Word absent for delete/update/reset/review
    #[error("Word '{word}' not found in '{lang}' vocabulary")]
    WordNotFound { word: String, lang: String },

    /// Empty candidate-word or words-to-add list
    #[error("{0} cannot be empty")]
    EmptyInput(String),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Schema migration failed
    #[error("Migration error: {0}")]
    Migration(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for lexmem operations
pub type Result<T> = std::result::Result<T, LexmemError>;

impl From<libsql::Error> for LexmemError {
    fn from(err: libsql::Error) -> Self {
        LexmemError::Database(err.to_string())
    }
}
