//! Batch import parsing for "word - definition" text
//!
//! Translates line-oriented text into word/definition pairs for the store's
//! upsert path. Malformed lines are collected with their 1-based index and a
//! reason; they never abort the rest of the batch.

use crate::types::NewWord;
use serde::{Deserialize, Serialize};

/// Literal delimiter between word and definition within a line
pub const ENTRY_DELIMITER: &str = " - ";

/// Cap on failure messages surfaced in an import report
pub const MAX_REPORTED_FAILURES: usize = 10;

/// A line that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFailure {
    /// 1-based line index within the import text
    pub line: usize,

    /// Human-readable reason
    pub reason: String,
}

impl std::fmt::Display for ImportFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Line {}: {}", self.line, self.reason)
    }
}

/// Outcome of parsing import text, before the store is touched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedImport {
    /// Successfully parsed pairs, in input order
    pub entries: Vec<NewWord>,

    /// All failures, in input order
    pub failures: Vec<ImportFailure>,
}

/// Result of a completed batch import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Entries committed to the store
    pub imported_count: usize,

    /// Lines that failed to parse
    pub failed_count: usize,

    /// At most the first 10 failure messages
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    /// Build a report from an upsert count and the full failure list
    pub fn new(imported_count: usize, mut failures: Vec<ImportFailure>) -> Self {
        let failed_count = failures.len();
        failures.truncate(MAX_REPORTED_FAILURES);
        Self {
            imported_count,
            failed_count,
            failures,
        }
    }
}

/// Split import text into word/definition pairs
///
/// Each segment of `text` split on `separator` is trimmed; blank segments
/// are skipped. A non-blank segment must contain `" - "`, and the first
/// occurrence splits it into word and definition, both trimmed and required
/// non-empty.
pub fn parse_import_text(text: &str, separator: &str) -> ParsedImport {
    let mut entries = Vec::new();
    let mut failures = Vec::new();

    for (index, raw_line) in text.split(separator).enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        match line.split_once(ENTRY_DELIMITER) {
            Some((word, definition)) => {
                let word = word.trim();
                let definition = definition.trim();
                if word.is_empty() || definition.is_empty() {
                    failures.push(ImportFailure {
                        line: line_no,
                        reason: "Empty word or definition".to_string(),
                    });
                } else {
                    entries.push(NewWord::new(word, definition));
                }
            }
            None => {
                failures.push(ImportFailure {
                    line: line_no,
                    reason: "Invalid format (expected 'word - definition')".to_string(),
                });
            }
        }
    }

    ParsedImport { entries, failures }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_well_formed_lines() {
        let parsed = parse_import_text("apple - fruit\nbanana - yellow fruit", "\n");

        assert_eq!(
            parsed.entries,
            vec![
                NewWord::new("apple", "fruit"),
                NewWord::new("banana", "yellow fruit"),
            ]
        );
        assert!(parsed.failures.is_empty());
    }

    #[test]
    fn test_blank_lines_are_skipped_and_bad_lines_reported() {
        let parsed = parse_import_text("apple - fruit\n\nbad line\nbanana - fruit2", "\n");

        assert_eq!(
            parsed.entries,
            vec![
                NewWord::new("apple", "fruit"),
                NewWord::new("banana", "fruit2"),
            ]
        );
        assert_eq!(parsed.failures.len(), 1);
        // 1-based index of the malformed line, blank line still counted
        assert_eq!(parsed.failures[0].line, 3);
        assert!(parsed.failures[0].reason.contains("word - definition"));
    }

    #[test]
    fn test_first_delimiter_occurrence_splits() {
        let parsed = parse_import_text("sake - rice wine - also a fish", "\n");

        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].word, "sake");
        assert_eq!(parsed.entries[0].definition, "rice wine - also a fish");
    }

    #[test]
    fn test_delimiter_without_both_sides_fails_the_line() {
        // Trimming strips the outer spaces, so neither line retains the
        // " - " delimiter and both report as malformed
        let parsed = parse_import_text(" - fruit\napple - ", "\n");

        assert!(parsed.entries.is_empty());
        assert_eq!(parsed.failures.len(), 2);
        assert!(parsed.failures[0].reason.contains("Invalid format"));
        assert_eq!(parsed.failures[1].line, 2);
    }

    #[test]
    fn test_custom_separator() {
        let parsed = parse_import_text("apple - fruit;banana - fruit2", ";");

        assert_eq!(parsed.entries.len(), 2);
        assert!(parsed.failures.is_empty());
    }

    #[test]
    fn test_segments_are_trimmed_before_parsing() {
        let parsed = parse_import_text("  apple - fruit  \r", "\n");

        assert_eq!(parsed.entries, vec![NewWord::new("apple", "fruit")]);
    }

    #[test]
    fn test_report_caps_failure_messages() {
        let text: String = (0..15).map(|i| format!("bad{}\n", i)).collect();
        let parsed = parse_import_text(&text, "\n");
        assert_eq!(parsed.failures.len(), 15);

        let report = ImportReport::new(0, parsed.failures);
        assert_eq!(report.failed_count, 15);
        assert_eq!(report.failures.len(), MAX_REPORTED_FAILURES);
        assert_eq!(report.failures[0].line, 1);
    }
}
