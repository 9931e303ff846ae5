//! Lexmem - Multi-Language Vocabulary Memory
//!
//! Thin command-line shell over the vocabulary service: parses arguments,
//! forwards to the core, and prints results as JSON. No scheduling or
//! storage logic lives here.

use clap::{Parser, Subcommand};
use lexmem::{config, LibsqlVocabStore, NewWord, VocabService};
use serde::Serialize;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lexmem", version, about = "Multi-language vocabulary memory with SM-2 scheduling")]
struct Cli {
    /// Path to the vocabulary database
    #[arg(long, global = true, env = "LEXMEM_DB_PATH")]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a word with its definition
    Add {
        /// Language code (ISO 639-1, e.g. 'en', 'ja')
        lang: String,
        word: String,
        definition: String,
    },

    /// Check which candidate words are not in the vocabulary yet
    Filter {
        lang: String,
        /// Words to check
        words: Vec<String>,
    },

    /// Batch import "word - definition" lines from stdin
    Import {
        lang: String,
        /// Line separator
        #[arg(long, default_value = "\n")]
        separator: String,
    },

    /// Show words due for review
    Due {
        lang: String,
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Submit a review result (quality 0-5)
    Review {
        lang: String,
        word: String,
        quality: i64,
    },

    /// Show learning statistics
    Stats { lang: String },

    /// List the vocabulary
    List {
        lang: String,
        /// Sort key: next_review, ease_factor, word, repetition_count
        #[arg(long, default_value = "next_review")]
        sort_by: String,
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Search words and definitions
    Search {
        lang: String,
        query: String,
        /// Where to search: word, definition, both
        #[arg(long, default_value = "both")]
        field: String,
    },

    /// Update the definition of an existing word
    UpdateDef {
        lang: String,
        word: String,
        definition: String,
    },

    /// Delete one word
    Delete { lang: String, word: String },

    /// Delete every word of a language
    DeleteAll { lang: String },

    /// Reset a word's learning progress
    Reset { lang: String, word: String },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db_path = config::resolve_db_path(cli.db);

    let store = LibsqlVocabStore::new_local(&db_path).await?;
    let service = VocabService::new(Arc::new(store));

    match cli.command {
        Command::Add {
            lang,
            word,
            definition,
        } => {
            let added = service
                .add_words(&[NewWord::new(word, definition)], &lang)
                .await?;
            println!("Added {} word(s) to '{}' vocabulary", added, lang);
        }
        Command::Filter { lang, words } => {
            let new_words = service.filter_new_words(&words, &lang).await?;
            print_json(&new_words)?;
        }
        Command::Import { lang, separator } => {
            let text = std::io::read_to_string(std::io::stdin())?;
            let report = service
                .import_from_text(&text, &lang, Some(&separator))
                .await?;
            print_json(&report)?;
        }
        Command::Due { lang, limit } => {
            let due = service.due_reviews(&lang, limit).await?;
            print_json(&due)?;
        }
        Command::Review {
            lang,
            word,
            quality,
        } => {
            let outcome = service.submit_review(&word, &lang, quality).await?;
            print_json(&outcome)?;
        }
        Command::Stats { lang } => {
            let stats = service.statistics(&lang).await?;
            print_json(&stats)?;
        }
        Command::List {
            lang,
            sort_by,
            limit,
        } => {
            let words = service.list_words(&lang, &sort_by, limit).await?;
            print_json(&words)?;
        }
        Command::Search { lang, query, field } => {
            let matches = service.search_words(&query, &lang, &field).await?;
            print_json(&matches)?;
        }
        Command::UpdateDef {
            lang,
            word,
            definition,
        } => {
            service.update_definition(&word, &lang, &definition).await?;
            println!("Updated definition for '{}'", word);
        }
        Command::Delete { lang, word } => {
            service.delete_word(&word, &lang).await?;
            println!("Deleted '{}' from '{}' vocabulary", word, lang);
        }
        Command::DeleteAll { lang } => {
            let deleted = service.delete_all_words(&lang).await?;
            println!("Deleted {} word(s) from '{}' vocabulary", deleted, lang);
        }
        Command::Reset { lang, word } => {
            service.reset_progress(&word, &lang).await?;
            println!("Reset progress for '{}'", word);
        }
    }

    Ok(())
}
