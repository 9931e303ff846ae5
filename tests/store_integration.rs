//! Integration tests for the libSQL vocabulary store
//!
//! Exercises the keyed-record contract against a real database file:
//! due-date queries, sorted listing, substring search, and the statistics
//! rollup.

use chrono::NaiveDate;
use lexmem::{
    LanguageCode, LibsqlVocabStore, NewWord, ScheduleUpdate, SearchField, SortKey, VocabStore,
};
use tempfile::TempDir;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn lang(code: &str) -> LanguageCode {
    LanguageCode::new(code).unwrap()
}

async fn file_store(dir: &TempDir) -> LibsqlVocabStore {
    let path = dir.path().join("vocab.db");
    LibsqlVocabStore::new_local(path.to_str().unwrap())
        .await
        .expect("Failed to create storage")
}

/// Seed one entry and push its schedule to the given dates
async fn seed_scheduled(
    store: &LibsqlVocabStore,
    word: &str,
    lang_code: &LanguageCode,
    repetition_count: u32,
    ease_factor: f64,
    next_review: &str,
) {
    store
        .upsert_words(
            &[NewWord::new(word, format!("definition of {}", word))],
            lang_code,
            date("2026-01-01"),
        )
        .await
        .unwrap();

    store
        .apply_review(
            word,
            lang_code,
            &ScheduleUpdate {
                repetition_count,
                ease_factor,
                interval_days: 6,
                last_reviewed: date("2026-01-01"),
                next_review: date(next_review),
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_due_reviews_inclusive_boundary_and_ordering() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir).await;
    let en = lang("en");
    let today = date("2026-08-27");

    seed_scheduled(&store, "future", &en, 1, 2.5, "2026-08-28").await;
    seed_scheduled(&store, "overdue", &en, 1, 2.5, "2026-08-01").await;
    seed_scheduled(&store, "today", &en, 1, 2.5, "2026-08-27").await;
    seed_scheduled(&store, "ancient", &en, 1, 2.5, "2026-07-01").await;

    let due = store.due_reviews(&en, today, None).await.unwrap();

    // Entry due exactly today is included; tomorrow's is not
    let words: Vec<&str> = due.iter().map(|e| e.word.as_str()).collect();
    assert_eq!(words, vec!["ancient", "overdue", "today"]);

    // Non-decreasing by next_review
    for pair in due.windows(2) {
        assert!(pair[0].next_review <= pair[1].next_review);
    }

    // Limit caps the result, most overdue first
    let capped = store.due_reviews(&en, today, Some(2)).await.unwrap();
    assert_eq!(capped.len(), 2);
    assert_eq!(capped[0].word, "ancient");
}

#[tokio::test]
async fn test_list_words_sorts_ascending_by_each_key() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir).await;
    let en = lang("en");

    seed_scheduled(&store, "zebra", &en, 5, 1.8, "2026-03-01").await;
    seed_scheduled(&store, "apple", &en, 2, 2.9, "2026-05-01").await;
    seed_scheduled(&store, "mango", &en, 8, 2.3, "2026-01-01").await;

    let by_word = store.list_words(&en, SortKey::Word, None).await.unwrap();
    let words: Vec<&str> = by_word.iter().map(|e| e.word.as_str()).collect();
    assert_eq!(words, vec!["apple", "mango", "zebra"]);

    let by_ease = store
        .list_words(&en, SortKey::EaseFactor, None)
        .await
        .unwrap();
    let words: Vec<&str> = by_ease.iter().map(|e| e.word.as_str()).collect();
    assert_eq!(words, vec!["zebra", "mango", "apple"]);

    let by_reps = store
        .list_words(&en, SortKey::RepetitionCount, None)
        .await
        .unwrap();
    let words: Vec<&str> = by_reps.iter().map(|e| e.word.as_str()).collect();
    assert_eq!(words, vec!["apple", "zebra", "mango"]);

    let by_due = store
        .list_words(&en, SortKey::NextReview, Some(1))
        .await
        .unwrap();
    assert_eq!(by_due.len(), 1);
    assert_eq!(by_due[0].word, "mango");
}

#[tokio::test]
async fn test_search_words_by_field() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir).await;
    let de = lang("de");
    let today = date("2026-08-27");

    store
        .upsert_words(
            &[
                NewWord::new("apfel", "apple, a fruit"),
                NewWord::new("birne", "pear, a fruit"),
                NewWord::new("fruchtig", "fruity"),
            ],
            &de,
            today,
        )
        .await
        .unwrap();

    let in_words = store
        .search_words("frucht", &de, SearchField::Word)
        .await
        .unwrap();
    assert_eq!(in_words.len(), 1);
    assert_eq!(in_words[0].word, "fruchtig");

    let in_defs = store
        .search_words("fruit", &de, SearchField::Definition)
        .await
        .unwrap();
    assert_eq!(in_defs.len(), 3);

    let in_both = store
        .search_words("pear", &de, SearchField::Both)
        .await
        .unwrap();
    assert_eq!(in_both.len(), 1);
    assert_eq!(in_both[0].word, "birne");

    let nothing = store
        .search_words("kartoffel", &de, SearchField::Both)
        .await
        .unwrap();
    assert!(nothing.is_empty());
}

#[tokio::test]
async fn test_statistics_rollup() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir).await;
    let ja = lang("ja");
    let today = date("2026-08-27");

    // Empty vocabulary defaults
    let empty = store.statistics(&ja, today).await.unwrap();
    assert_eq!(empty.total_words, 0);
    assert_eq!(empty.due_today, 0);
    assert_eq!(empty.mastery_rate, 0.0);
    assert_eq!(empty.average_ease_factor, 2.5);

    // mastered (reps >= 3), difficult (ease < 2.0), due, and fresh
    seed_scheduled(&store, "mastered", &ja, 4, 2.6, "2026-09-10").await;
    seed_scheduled(&store, "difficult", &ja, 1, 1.4, "2026-08-01").await;
    store
        .upsert_words(&[NewWord::new("fresh", "just added")], &ja, today)
        .await
        .unwrap();

    let stats = store.statistics(&ja, today).await.unwrap();
    assert_eq!(stats.total_words, 3);
    assert_eq!(stats.due_today, 2); // difficult (overdue) + fresh (today)
    assert_eq!(stats.mastered_words, 1);
    assert_eq!(stats.difficult_words, 1);
    // mean of 2.6, 1.4, 2.5 = 2.1666... -> 2.17; mastery 1/3 -> 33.3
    assert_eq!(stats.average_ease_factor, 2.17);
    assert_eq!(stats.mastery_rate, 33.3);
}

#[tokio::test]
async fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("vocab.db");
    let en = lang("en");
    let today = date("2026-08-27");

    {
        let store = LibsqlVocabStore::new_local(path.to_str().unwrap())
            .await
            .unwrap();
        store
            .upsert_words(&[NewWord::new("durable", "persists across opens")], &en, today)
            .await
            .unwrap();
    }

    let reopened = LibsqlVocabStore::new_local(path.to_str().unwrap())
        .await
        .unwrap();
    let entry = reopened.get_word("durable", &en).await.unwrap().unwrap();
    assert_eq!(entry.definition, "persists across opens");
    assert_eq!(entry.next_review, today);
}
