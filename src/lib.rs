//! A library for parsing and querying bibliography files exported from the
//! ACM Digital Library.
//!
//! `bibrepo` reads `.bib` files into structured, in-memory records and offers
//! a small query API over the parsed collection. It is aimed at researchers
//! running literature surveys over large bibliography exports.
//!
//! # Key Features
//!
//! - **BibTeX parsing**: entry blocks with braced, quoted, or bare field
//!   values; nested braces inside abstracts and titles are tracked so values
//!   are never truncated at the first closing brace.
//! - **Querying**: lookup by citation key, filtering by entry type or by an
//!   arbitrary field predicate, and case-insensitive text search over titles
//!   and abstracts.
//! - **Directory loading**: parse a whole directory of `.bib` exports into a
//!   single collection.
//! - **Re-serialization**: write entries or whole collections back out as
//!   `.bib` text.
//!
//! # Basic Usage
//!
//! ```rust
//! use bibrepo::{BibCollection, BibtexParser};
//!
//! let input = r#"@article{smith2020,
//!   title = {A Study of {X} and Y},
//!   year = {2020},
//! }"#;
//!
//! let entries = BibtexParser::new().parse(input).unwrap();
//! let collection = BibCollection::new(entries).unwrap();
//!
//! let entry = collection.get("smith2020").unwrap();
//! assert_eq!(entry.title(), Some("A Study of {X} and Y"));
//! assert_eq!(entry.year(), Some(2020));
//! ```
//!
//! # Searching
//!
//! ```rust
//! use bibrepo::{BibCollection, BibtexParser};
//!
//! let input = r#"@article{lee2019,
//!   title = {A Neural Network Approach},
//!   abstract = {We train a model.},
//! }"#;
//!
//! let collection = BibCollection::new(BibtexParser::new().parse(input).unwrap()).unwrap();
//! let hits = collection.search_text("neural");
//! assert_eq!(hits.len(), 1);
//! ```
//!
//! # Error Handling
//!
//! The library uses a custom [`Result`] type that wraps [`BibError`] for
//! consistent error handling across parsing and collection construction:
//!
//! ```rust
//! use bibrepo::{BibError, BibtexParser};
//!
//! let result = BibtexParser::new().parse("@article{bad, title={Unclosed");
//! match result {
//!     Ok(entries) => println!("parsed {} entries", entries.len()),
//!     Err(BibError::MalformedInput { message, line }) => {
//!         eprintln!("parse error at line {line}: {message}")
//!     }
//!     Err(e) => eprintln!("other error: {e}"),
//! }
//! ```
//!
//! # Thread Safety
//!
//! Parsing is synchronous and side-effect free, and a [`BibCollection`] is
//! immutable after construction, so collections can be shared freely between
//! threads. Processing many files in parallel needs no coordination: build
//! one collection per file.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub mod bibtex;
pub mod collection;
mod utils;

// Reexports
pub use bibtex::BibtexParser;
pub use collection::{BibCollection, DuplicateKeyPolicy};

/// A specialized Result type for bibliography operations.
pub type Result<T> = std::result::Result<T, BibError>;

/// Represents errors that can occur while parsing or indexing bibliographies.
#[derive(Error, Debug)]
pub enum BibError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    InvalidFormat(String),

    #[error("Malformed input: {message} at line {line}")]
    MalformedInput { message: String, line: usize },

    #[error("Duplicate citation key: {0}")]
    DuplicateKey(String),
}

/// Represents a single bibliography entry parsed from a `.bib` file.
///
/// Field names are normalized to lowercase and field values have internal
/// whitespace collapsed to single spaces. Entries are immutable after
/// parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BibEntry {
    /// Kind of publication, lowercased (e.g. "article", "inproceedings")
    pub entry_type: String,
    /// Unique identifier within the source file
    pub citation_key: String,
    /// Field name (lowercase) to field value
    pub fields: HashMap<String, String>,
}

impl BibEntry {
    /// Returns the value of a field, looked up case-insensitively.
    pub fn field(&self, name: &str) -> Option<&str> {
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            self.fields.get(&name.to_lowercase()).map(String::as_str)
        } else {
            self.fields.get(name).map(String::as_str)
        }
    }

    /// Returns the title field, if present.
    pub fn title(&self) -> Option<&str> {
        self.field("title")
    }

    /// Returns the abstract field, if present.
    pub fn abstract_text(&self) -> Option<&str> {
        self.field("abstract")
    }

    /// Returns the publication year as an integer, if present and numeric.
    pub fn year(&self) -> Option<i32> {
        self.field("year").and_then(utils::parse_year)
    }

    /// Returns the keywords field split into individual keywords.
    ///
    /// ACM exports separate keywords with commas; an absent field yields an
    /// empty vector.
    pub fn keywords(&self) -> Vec<String> {
        self.field("keywords")
            .map(utils::split_keywords)
            .unwrap_or_default()
    }

    /// Re-serializes the entry as a `.bib` entry block.
    ///
    /// Fields are emitted in alphabetical order so the output is
    /// deterministic; parsing the output yields an entry equal to `self`.
    pub fn to_bibtex(&self) -> String {
        let mut out = format!("@{}{{{},\n", self.entry_type, self.citation_key);
        let mut names: Vec<&String> = self.fields.keys().collect();
        names.sort();
        for name in names {
            out.push_str(&format!("  {} = {{{}}},\n", name, self.fields[name]));
        }
        out.push('}');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with(fields: &[(&str, &str)]) -> BibEntry {
        BibEntry {
            entry_type: "article".to_string(),
            citation_key: "key1".to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_bib_error_display() {
        let error = BibError::MalformedInput {
            message: "unbalanced braces".to_string(),
            line: 12,
        };
        assert_eq!(
            error.to_string(),
            "Malformed input: unbalanced braces at line 12"
        );
    }

    #[test]
    fn test_field_lookup_is_case_insensitive() {
        let entry = entry_with(&[("title", "A Study")]);
        assert_eq!(entry.field("title"), Some("A Study"));
        assert_eq!(entry.field("TITLE"), Some("A Study"));
        assert_eq!(entry.field("author"), None);
    }

    #[test]
    fn test_year_conversion() {
        let entry = entry_with(&[("year", "2020")]);
        assert_eq!(entry.year(), Some(2020));

        let entry = entry_with(&[("year", "MMXX")]);
        assert_eq!(entry.year(), None);
    }

    #[test]
    fn test_keywords_split() {
        let entry = entry_with(&[("keywords", "neural networks, surveys, datasets")]);
        assert_eq!(
            entry.keywords(),
            vec!["neural networks", "surveys", "datasets"]
        );

        let entry = entry_with(&[("title", "No keywords here")]);
        assert!(entry.keywords().is_empty());
    }

    #[test]
    fn test_to_bibtex_is_deterministic() {
        let entry = entry_with(&[("year", "2020"), ("title", "A Study")]);
        assert_eq!(
            entry.to_bibtex(),
            "@article{key1,\n  title = {A Study},\n  year = {2020},\n}"
        );
    }
}
