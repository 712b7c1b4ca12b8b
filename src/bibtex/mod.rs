//! BibTeX format parser implementation.
//!
//! Provides functionality to parse `.bib` bibliography exports, as produced
//! by the ACM Digital Library, into [`BibEntry`] records.
//!
//! # Example
//!
//! ```
//! use bibrepo::BibtexParser;
//!
//! let input = r#"@article{smith2020,
//!   title = {A Study of {X} and Y},
//!   year = {2020},
//! }"#;
//!
//! let entries = BibtexParser::new().parse(input).unwrap();
//! assert_eq!(entries[0].citation_key, "smith2020");
//! assert_eq!(entries[0].title(), Some("A Study of {X} and Y"));
//! ```

mod parse;
mod structure;

use crate::{BibEntry, BibError, Result};
use parse::bibtex_parse;
use std::path::Path;
use tracing::debug;

/// Parser for `.bib` bibliography files.
///
/// BibTeX is a line-oriented text format where each entry is a block of the
/// form `@type{key, field = value, ...}`. Field values may be wrapped in
/// braces or quotes, and braces nest.
#[derive(Debug, Clone, Default)]
pub struct BibtexParser;

impl BibtexParser {
    /// Creates a new BibTeX parser instance.
    ///
    /// # Examples
    ///
    /// ```
    /// use bibrepo::BibtexParser;
    /// let parser = BibtexParser::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a string containing one or more `.bib` entries.
    ///
    /// Entries are returned in source order. Field names are normalized to
    /// lowercase and multi-line field values are collapsed to single logical
    /// lines.
    ///
    /// # Errors
    ///
    /// Returns [`BibError::InvalidFormat`] when the input is empty or holds
    /// no entries, and [`BibError::MalformedInput`] (with a line locator)
    /// for structural errors such as unbalanced braces or a missing
    /// citation key. A structural error aborts the whole parse; no partial
    /// entries are returned.
    pub fn parse(&self, input: &str) -> Result<Vec<BibEntry>> {
        let raw_entries = bibtex_parse(input)?;
        let entries: Vec<BibEntry> = raw_entries.into_iter().map(BibEntry::from).collect();
        debug!(entries = entries.len(), "parsed bibtex input");
        Ok(entries)
    }

    /// Reads and parses a single `.bib` file.
    ///
    /// The file is read once, synchronously. Content that is not valid
    /// UTF-8 is an input error.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Vec<BibEntry>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let entries = self.parse(&content)?;
        debug!(path = %path.display(), entries = entries.len(), "parsed bib file");
        Ok(entries)
    }

    /// Parses every `.bib` file in a directory, concatenating the results.
    ///
    /// Files are processed in filename order so the combined sequence is
    /// reproducible. Non-`.bib` files are ignored.
    ///
    /// # Errors
    ///
    /// Fails if the directory is unreadable, contains no `.bib` files, or
    /// any contained `.bib` file fails to parse.
    pub fn parse_directory(&self, dir: impl AsRef<Path>) -> Result<Vec<BibEntry>> {
        let dir = dir.as_ref();
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "bib"))
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(BibError::InvalidFormat(format!(
                "no .bib files in directory {}",
                dir.display()
            )));
        }

        let mut entries = Vec::new();
        for path in &paths {
            entries.extend(self.parse_file(path)?);
        }
        debug!(
            path = %dir.display(),
            files = paths.len(),
            entries = entries.len(),
            "parsed bib directory"
        );
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_parse_example_entry() {
        let input = "@article{smith2020, title={A Study of {X} and Y}, year=2020}";
        let entries = BibtexParser::new().parse(input).unwrap();
        assert_eq!(entries.len(), 1);

        let entry = &entries[0];
        assert_eq!(entry.entry_type, "article");
        assert_eq!(entry.citation_key, "smith2020");
        assert_eq!(entry.title(), Some("A Study of {X} and Y"));
        assert_eq!(entry.field("year"), Some("2020"));
        assert_eq!(entry.fields.len(), 2);
    }

    #[test]
    fn test_parse_acm_style_entry() {
        let input = r#"@inproceedings{10.1145/1234.5678,
  author = {Smith, John and Doe, Jane},
  title = {Measuring Things},
  year = {2019},
  booktitle = {Proceedings of the Conference on Examples},
  abstract = {We measure several things and
              report the results.},
  keywords = {measurement, empirical studies},
  numpages = {12}
}"#;
        let entries = BibtexParser::new().parse(input).unwrap();
        let entry = &entries[0];
        assert_eq!(entry.citation_key, "10.1145/1234.5678");
        assert_eq!(
            entry.abstract_text(),
            Some("We measure several things and report the results.")
        );
        assert_eq!(entry.year(), Some(2019));
        assert_eq!(
            entry.keywords(),
            vec!["measurement", "empirical studies"]
        );
    }

    #[test]
    fn test_parse_is_idempotent() {
        let input = r#"@article{a, title={One {nested} title}}
@article{b, title="Two", year=2021}"#;
        let parser = BibtexParser::new();
        let first = parser.parse(input).unwrap();
        let second = parser.parse(input).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_round_trip_through_to_bibtex() {
        let input = "@article{k, title={A Study of {X} and Y}, year={2020}}";
        let parser = BibtexParser::new();
        let entries = parser.parse(input).unwrap();
        let reparsed = parser.parse(&entries[0].to_bibtex()).unwrap();
        assert_eq!(entries, reparsed);
    }

    #[test]
    fn test_malformed_entry_fails() {
        let result = BibtexParser::new().parse("@article{bad, title={Unclosed");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::with_suffix(".bib").unwrap();
        write!(file, "@article{{k, title={{From a file}}}}").unwrap();

        let entries = BibtexParser::new().parse_file(file.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title(), Some("From a file"));
    }

    #[test]
    fn test_parse_file_missing() {
        let result = BibtexParser::new().parse_file("/nonexistent/path.bib");
        assert!(matches!(result, Err(BibError::Io(_))));
    }

    #[test]
    fn test_parse_file_invalid_utf8() {
        let mut file = tempfile::NamedTempFile::with_suffix(".bib").unwrap();
        file.write_all(&[0x40, 0xff, 0xfe, 0x41]).unwrap();

        let result = BibtexParser::new().parse_file(file.path());
        assert!(matches!(result, Err(BibError::Io(_))));
    }

    #[test]
    fn test_parse_directory_in_filename_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.bib"), "@article{second, title={Two}}").unwrap();
        std::fs::write(dir.path().join("a.bib"), "@article{first, title={One}}").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a bib file").unwrap();

        let entries = BibtexParser::new().parse_directory(dir.path()).unwrap();
        let keys: Vec<&str> = entries.iter().map(|e| e.citation_key.as_str()).collect();
        assert_eq!(keys, vec!["first", "second"]);
    }

    #[test]
    fn test_parse_directory_without_bib_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "nothing here").unwrap();

        let result = BibtexParser::new().parse_directory(dir.path());
        assert!(matches!(result, Err(BibError::InvalidFormat(_))));
    }
}
