//! LibSQL storage backend implementation
//!
//! Persistent vocabulary storage keyed by `(word, lang)`, with the
//! `(lang, next_review)` and `(lang)` access-path indexes for due-review
//! queries and per-language scans. Schema setup runs through embedded
//! migrations tracked in an applied-migrations table.

use crate::error::{LexmemError, Result};
use crate::storage::VocabStore;
use crate::types::{
    round1, round2, LanguageCode, NewWord, ScheduleUpdate, SearchField, SortKey, VocabEntry,
    VocabStats,
};
use crate::scheduler::INITIAL_EASE_FACTOR;
use async_trait::async_trait;
use chrono::NaiveDate;
use libsql::{params, Builder, Connection};
use std::collections::HashSet;
use tracing::{debug, info};

/// Embedded schema migrations, applied in order
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_initial_schema.sql",
        include_str!("../../migrations/001_initial_schema.sql"),
    ),
    (
        "002_add_indexes.sql",
        include_str!("../../migrations/002_add_indexes.sql"),
    ),
];

/// Column list shared by every entry-returning SELECT, so row indexes in
/// `row_to_entry` stay stable
const ENTRY_COLUMNS: &str =
    "word, lang, definition, repetition_count, ease_factor, interval, last_reviewed, next_review";

/// Stored date format (ISO-8601 calendar date)
const DATE_FORMAT: &str = "%Y-%m-%d";

/// LibSQL vocabulary store
///
/// Holds one connection opened at construction and clones it per
/// operation. libSQL gives each fresh `connect()` on a `:memory:`
/// database its own isolated store, so migrations and later operations
/// must share the connection.
pub struct LibsqlVocabStore {
    conn: Connection,
}

/// Database connection mode
#[derive(Debug, Clone)]
pub enum ConnectionMode {
    /// Local file-based database
    Local(String),
    /// In-memory database (for testing)
    InMemory,
}

impl LibsqlVocabStore {
    /// Validate a database file before opening
    ///
    /// A present file must carry the SQLite header; a missing file is fine,
    /// the caller creates it.
    fn validate_database_file(db_path: &str) -> Result<()> {
        let path = std::path::Path::new(db_path);
        if !path.exists() {
            return Ok(());
        }

        let bytes = std::fs::read(path).map_err(|e| {
            LexmemError::Database(format!("Cannot read database file at '{}': {}", db_path, e))
        })?;

        // SQLite files start with "SQLite format 3\0"
        if bytes.len() < 16 || &bytes[0..16] != b"SQLite format 3\0" {
            return Err(LexmemError::Database(format!(
                "Database file at '{}' is corrupted or not a valid SQLite database",
                db_path
            )));
        }

        debug!("Database file validation passed: {}", db_path);
        Ok(())
    }

    /// Create a new LibSQL vocabulary store
    ///
    /// Creates the database file (and its parent directory) when missing,
    /// validates the header when present, and runs migrations.
    pub async fn new(mode: ConnectionMode) -> Result<Self> {
        info!("Connecting to LibSQL database: {:?}", mode);

        let db = match mode {
            ConnectionMode::Local(ref path) => {
                Self::validate_database_file(path)?;

                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent).map_err(|e| {
                            LexmemError::Database(format!(
                                "Failed to create database directory {}: {}",
                                parent.display(),
                                e
                            ))
                        })?;
                    }
                }

                Builder::new_local(path).build().await.map_err(|e| {
                    LexmemError::Database(format!("Failed to create local database: {}", e))
                })?
            }
            ConnectionMode::InMemory => {
                Builder::new_local(":memory:").build().await.map_err(|e| {
                    LexmemError::Database(format!("Failed to create in-memory database: {}", e))
                })?
            }
        };

        let conn = db
            .connect()
            .map_err(|e| LexmemError::Database(format!("Failed to get connection: {}", e)))?;

        let store = Self { conn };
        store.run_migrations().await?;

        info!("LibSQL database ready");
        Ok(store)
    }

    /// Create a local file-based store (convenience method)
    pub async fn new_local(path: &str) -> Result<Self> {
        Self::new(ConnectionMode::Local(path.to_string())).await
    }

    /// Create an in-memory store (convenience method for tests)
    pub async fn in_memory() -> Result<Self> {
        Self::new(ConnectionMode::InMemory).await
    }

    /// Run embedded schema migrations
    async fn run_migrations(&self) -> Result<()> {
        debug!("Running database migrations...");

        let conn = self.get_conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations_applied (
                migration_name TEXT PRIMARY KEY,
                applied_at INTEGER NOT NULL
            )",
            params![],
        )
        .await
        .map_err(|e| LexmemError::Migration(format!("Failed to create migrations table: {}", e)))?;

        for (name, sql) in MIGRATIONS {
            let mut rows = conn
                .query(
                    "SELECT COUNT(*) FROM _migrations_applied WHERE migration_name = ?",
                    params![*name],
                )
                .await?;

            let already_applied = match rows.next().await? {
                Some(row) => row.get::<i64>(0)? > 0,
                None => false,
            };

            if already_applied {
                debug!("Skipping already applied migration: {}", name);
                continue;
            }

            conn.execute_batch(sql).await.map_err(|e| {
                LexmemError::Migration(format!("Failed to execute {}: {}", name, e))
            })?;

            let now = chrono::Utc::now().timestamp();
            conn.execute(
                "INSERT INTO _migrations_applied (migration_name, applied_at) VALUES (?, ?)",
                params![*name, now],
            )
            .await
            .map_err(|e| LexmemError::Migration(format!("Failed to record migration: {}", e)))?;

            info!("Executed migration: {}", name);
        }

        debug!("Database migrations completed");
        Ok(())
    }

    /// Get a handle to the shared connection
    fn get_conn(&self) -> Result<Connection> {
        Ok(self.conn.clone())
    }

    /// Format a date for storage
    fn fmt_date(date: NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }

    /// Parse a stored date
    fn parse_date(text: &str) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(text, DATE_FORMAT)
            .map_err(|e| LexmemError::Database(format!("Invalid stored date '{}': {}", text, e)))
    }

    /// Convert a libsql row (in ENTRY_COLUMNS order) to a VocabEntry
    fn row_to_entry(row: &libsql::Row) -> Result<VocabEntry> {
        let word: String = row.get(0)?;
        let lang_str: String = row.get(1)?;
        let lang = LanguageCode::new(&lang_str)
            .map_err(|_| LexmemError::Database(format!("Invalid stored language: {}", lang_str)))?;

        let definition: String = row.get(2)?;
        let repetition_count: i64 = row.get(3)?;
        let ease_factor: f64 = row.get(4)?;
        let interval: i64 = row.get(5)?;

        let last_reviewed: Option<String> = row.get(6)?;
        let last_reviewed = last_reviewed
            .map(|s| Self::parse_date(&s))
            .transpose()?;

        let next_review_str: String = row.get(7)?;
        let next_review = Self::parse_date(&next_review_str)?;

        Ok(VocabEntry {
            word,
            lang,
            definition,
            repetition_count: repetition_count as u32,
            ease_factor,
            interval_days: interval as u32,
            last_reviewed,
            next_review,
        })
    }

    /// Collect all rows of an entry query
    async fn collect_entries(mut rows: libsql::Rows) -> Result<Vec<VocabEntry>> {
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(Self::row_to_entry(&row)?);
        }
        Ok(entries)
    }
}

#[async_trait]
impl VocabStore for LibsqlVocabStore {
    async fn upsert_words(
        &self,
        words: &[NewWord],
        lang: &LanguageCode,
        today: NaiveDate,
    ) -> Result<usize> {
        debug!("Upserting {} words into '{}'", words.len(), lang);

        let conn = self.get_conn()?;
        let tx = conn.transaction().await?;
        let today_str = Self::fmt_date(today);

        let mut affected = 0usize;
        for entry in words {
            // Existing rows keep their scheduling state; only the
            // definition follows the upsert
            affected += tx
                .execute(
                    "INSERT INTO vocabulary (word, lang, definition, next_review)
                     VALUES (?, ?, ?, ?)
                     ON CONFLICT(word, lang) DO UPDATE SET
                         definition = excluded.definition",
                    params![
                        entry.word.as_str(),
                        lang.as_str(),
                        entry.definition.as_str(),
                        today_str.as_str()
                    ],
                )
                .await? as usize;
        }

        tx.commit().await?;

        debug!("Upserted {} words into '{}'", affected, lang);
        Ok(affected)
    }

    async fn get_word(&self, word: &str, lang: &LanguageCode) -> Result<Option<VocabEntry>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "SELECT {} FROM vocabulary WHERE word = ? AND lang = ?",
            ENTRY_COLUMNS
        );
        let mut rows = conn.query(&sql, params![word, lang.as_str()]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::row_to_entry(&row)?)),
            None => Ok(None),
        }
    }

    async fn delete_word(&self, word: &str, lang: &LanguageCode) -> Result<()> {
        debug!("Deleting '{}' from '{}'", word, lang);

        let conn = self.get_conn()?;
        let affected = conn
            .execute(
                "DELETE FROM vocabulary WHERE word = ? AND lang = ?",
                params![word, lang.as_str()],
            )
            .await?;

        if affected == 0 {
            return Err(LexmemError::WordNotFound {
                word: word.to_string(),
                lang: lang.to_string(),
            });
        }

        Ok(())
    }

    async fn delete_all_words(&self, lang: &LanguageCode) -> Result<usize> {
        let conn = self.get_conn()?;
        let affected = conn
            .execute("DELETE FROM vocabulary WHERE lang = ?", params![lang.as_str()])
            .await?;

        info!("Deleted {} words from '{}'", affected, lang);
        Ok(affected as usize)
    }

    async fn list_words(
        &self,
        lang: &LanguageCode,
        sort: SortKey,
        limit: Option<usize>,
    ) -> Result<Vec<VocabEntry>> {
        debug!("Listing '{}' (sort: {:?}, limit: {:?})", lang, sort, limit);

        let conn = self.get_conn()?;

        // Sort column comes from the fixed allow-list, never caller text
        let rows = if let Some(limit) = limit {
            let sql = format!(
                "SELECT {} FROM vocabulary WHERE lang = ? ORDER BY {} ASC LIMIT ?",
                ENTRY_COLUMNS,
                sort.column()
            );
            conn.query(&sql, params![lang.as_str(), limit as i64]).await?
        } else {
            let sql = format!(
                "SELECT {} FROM vocabulary WHERE lang = ? ORDER BY {} ASC",
                ENTRY_COLUMNS,
                sort.column()
            );
            conn.query(&sql, params![lang.as_str()]).await?
        };

        Self::collect_entries(rows).await
    }

    async fn search_words(
        &self,
        query: &str,
        lang: &LanguageCode,
        field: SearchField,
    ) -> Result<Vec<VocabEntry>> {
        debug!("Searching '{}' in '{}' ({:?})", query, lang, field);

        let conn = self.get_conn()?;
        let pattern = format!("%{}%", query);

        let rows = match field {
            SearchField::Word => {
                let sql = format!(
                    "SELECT {} FROM vocabulary WHERE lang = ? AND word LIKE ?",
                    ENTRY_COLUMNS
                );
                conn.query(&sql, params![lang.as_str(), pattern.as_str()])
                    .await?
            }
            SearchField::Definition => {
                let sql = format!(
                    "SELECT {} FROM vocabulary WHERE lang = ? AND definition LIKE ?",
                    ENTRY_COLUMNS
                );
                conn.query(&sql, params![lang.as_str(), pattern.as_str()])
                    .await?
            }
            SearchField::Both => {
                let sql = format!(
                    "SELECT {} FROM vocabulary WHERE lang = ? AND (word LIKE ? OR definition LIKE ?)",
                    ENTRY_COLUMNS
                );
                conn.query(
                    &sql,
                    params![lang.as_str(), pattern.as_str(), pattern.as_str()],
                )
                .await?
            }
        };

        Self::collect_entries(rows).await
    }

    async fn filter_new_words(
        &self,
        candidates: &[String],
        lang: &LanguageCode,
    ) -> Result<Vec<String>> {
        let conn = self.get_conn()?;

        let mut rows = conn
            .query(
                "SELECT word FROM vocabulary WHERE lang = ?",
                params![lang.as_str()],
            )
            .await?;

        let mut existing = HashSet::new();
        while let Some(row) = rows.next().await? {
            existing.insert(row.get::<String>(0)?);
        }

        Ok(candidates
            .iter()
            .filter(|word| !existing.contains(*word))
            .cloned()
            .collect())
    }

    async fn due_reviews(
        &self,
        lang: &LanguageCode,
        today: NaiveDate,
        limit: Option<usize>,
    ) -> Result<Vec<VocabEntry>> {
        debug!("Due reviews for '{}' on {} (limit: {:?})", lang, today, limit);

        let conn = self.get_conn()?;
        let today_str = Self::fmt_date(today);

        let rows = if let Some(limit) = limit {
            let sql = format!(
                "SELECT {} FROM vocabulary
                 WHERE lang = ? AND next_review <= ?
                 ORDER BY next_review ASC
                 LIMIT ?",
                ENTRY_COLUMNS
            );
            conn.query(
                &sql,
                params![lang.as_str(), today_str.as_str(), limit as i64],
            )
            .await?
        } else {
            let sql = format!(
                "SELECT {} FROM vocabulary
                 WHERE lang = ? AND next_review <= ?
                 ORDER BY next_review ASC",
                ENTRY_COLUMNS
            );
            conn.query(&sql, params![lang.as_str(), today_str.as_str()])
                .await?
        };

        Self::collect_entries(rows).await
    }

    async fn statistics(&self, lang: &LanguageCode, today: NaiveDate) -> Result<VocabStats> {
        let conn = self.get_conn()?;
        let today_str = Self::fmt_date(today);

        let mut rows = conn
            .query(
                "SELECT COUNT(*),
                        SUM(CASE WHEN next_review <= ?2 THEN 1 ELSE 0 END),
                        SUM(CASE WHEN repetition_count >= 3 THEN 1 ELSE 0 END),
                        SUM(CASE WHEN ease_factor < 2.0 THEN 1 ELSE 0 END),
                        AVG(ease_factor)
                 FROM vocabulary
                 WHERE lang = ?1",
                params![lang.as_str(), today_str.as_str()],
            )
            .await?;

        let row = rows
            .next()
            .await?
            .ok_or_else(|| LexmemError::Database("Statistics query returned no row".to_string()))?;

        let total_words = row.get::<i64>(0)? as usize;
        let due_today = row.get::<Option<i64>>(1)?.unwrap_or(0) as usize;
        let mastered_words = row.get::<Option<i64>>(2)?.unwrap_or(0) as usize;
        let difficult_words = row.get::<Option<i64>>(3)?.unwrap_or(0) as usize;
        let average_ease_factor = row.get::<Option<f64>>(4)?.unwrap_or(INITIAL_EASE_FACTOR);

        let mastery_rate = if total_words > 0 {
            round1(mastered_words as f64 / total_words as f64 * 100.0)
        } else {
            0.0
        };

        Ok(VocabStats {
            lang: lang.clone(),
            total_words,
            due_today,
            mastered_words,
            difficult_words,
            average_ease_factor: round2(average_ease_factor),
            mastery_rate,
        })
    }

    async fn update_definition(
        &self,
        word: &str,
        lang: &LanguageCode,
        definition: &str,
    ) -> Result<()> {
        let conn = self.get_conn()?;
        let affected = conn
            .execute(
                "UPDATE vocabulary SET definition = ? WHERE word = ? AND lang = ?",
                params![definition, word, lang.as_str()],
            )
            .await?;

        if affected == 0 {
            return Err(LexmemError::WordNotFound {
                word: word.to_string(),
                lang: lang.to_string(),
            });
        }

        Ok(())
    }

    async fn reset_progress(
        &self,
        word: &str,
        lang: &LanguageCode,
        today: NaiveDate,
    ) -> Result<()> {
        debug!("Resetting progress for '{}' in '{}'", word, lang);

        let conn = self.get_conn()?;
        let affected = conn
            .execute(
                "UPDATE vocabulary
                 SET repetition_count = 0,
                     ease_factor = ?,
                     interval = 0,
                     last_reviewed = NULL,
                     next_review = ?
                 WHERE word = ? AND lang = ?",
                params![
                    INITIAL_EASE_FACTOR,
                    Self::fmt_date(today).as_str(),
                    word,
                    lang.as_str()
                ],
            )
            .await?;

        if affected == 0 {
            return Err(LexmemError::WordNotFound {
                word: word.to_string(),
                lang: lang.to_string(),
            });
        }

        Ok(())
    }

    async fn apply_review(
        &self,
        word: &str,
        lang: &LanguageCode,
        update: &ScheduleUpdate,
    ) -> Result<()> {
        let conn = self.get_conn()?;
        let affected = conn
            .execute(
                "UPDATE vocabulary
                 SET repetition_count = ?,
                     ease_factor = ?,
                     interval = ?,
                     last_reviewed = ?,
                     next_review = ?
                 WHERE word = ? AND lang = ?",
                params![
                    update.repetition_count as i64,
                    update.ease_factor,
                    update.interval_days as i64,
                    Self::fmt_date(update.last_reviewed).as_str(),
                    Self::fmt_date(update.next_review).as_str(),
                    word,
                    lang.as_str()
                ],
            )
            .await?;

        if affected == 0 {
            return Err(LexmemError::WordNotFound {
                word: word.to_string(),
                lang: lang.to_string(),
            });
        }

        Ok(())
    }
}
