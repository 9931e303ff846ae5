//! Lexmem - Multi-Language Vocabulary Memory
//!
//! A spaced-repetition system tracking per-item recall strength across
//! multiple isolated language vocabularies:
//! - Pure SM-2 scheduler turning recall grades into review intervals
//! - Durable keyed vocabulary store (libSQL) with due-date queries
//! - Review orchestration, statistics rollups, and batch text import
//!
//! # Architecture
//!
//! The system is organized into several layers:
//! - **Types**: Core data structures (VocabEntry, LanguageCode, etc.)
//! - **Scheduler**: Pure SM-2 state transitions
//! - **Storage**: The `VocabStore` contract and its libSQL backend
//! - **Service**: Typed validation boundary composing store and scheduler
//!
//! # Example
//!
//! ```ignore
//! use lexmem::{LibsqlVocabStore, NewWord, VocabService};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = LibsqlVocabStore::new_local("vocab.db").await?;
//!     let service = VocabService::new(Arc::new(store));
//!
//!     service
//!         .add_words(&[NewWord::new("apfel", "apple")], "de")
//!         .await?;
//!
//!     for entry in service.due_reviews("de", Some(20)).await? {
//!         println!("{}: {}", entry.word, entry.definition);
//!     }
//!
//!     let outcome = service.submit_review("apfel", "de", 5).await?;
//!     println!("next review: {}", outcome.next_review);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod import;
pub mod scheduler;
pub mod service;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{LexmemError, Result};
pub use import::{parse_import_text, ImportFailure, ImportReport};
pub use scheduler::{schedule, Quality, ScheduleState};
pub use service::VocabService;
pub use storage::{
    libsql::{ConnectionMode, LibsqlVocabStore},
    VocabStore,
};
pub use types::{
    LanguageCode, NewWord, ReviewOutcome, ScheduleUpdate, SearchField, SortKey, VocabEntry,
    VocabStats,
};
