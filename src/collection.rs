//! Indexed, queryable collections of bibliography entries.
//!
//! A [`BibCollection`] owns an ordered sequence of [`BibEntry`] values,
//! typically the output of [`BibtexParser::parse`](crate::BibtexParser::parse),
//! plus a citation-key index for O(1) lookup. Iteration order always equals
//! source order. The collection is immutable after construction: every query
//! borrows, none mutates.
//!
//! # Example
//!
//! ```
//! use bibrepo::{BibCollection, BibtexParser};
//!
//! let input = r#"@article{a, title={A Neural Network Approach}}
//! @inproceedings{b, title={An Empirical Study}}"#;
//!
//! let collection = BibCollection::new(BibtexParser::new().parse(input).unwrap()).unwrap();
//! assert_eq!(collection.len(), 2);
//! assert_eq!(collection.filter_by_type("ARTICLE").count(), 1);
//! ```

use crate::{BibEntry, BibError, Result};
use std::collections::HashMap;
use tracing::debug;

/// Fields searched by [`BibCollection::search_text`].
pub const DEFAULT_SEARCH_FIELDS: [&str; 2] = ["title", "abstract"];

/// What to do when two entries share a citation key.
///
/// Duplicate keys in an export are a data-quality problem; the default
/// surfaces them as an error rather than silently dropping an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeyPolicy {
    /// Fail construction with [`BibError::DuplicateKey`].
    #[default]
    Error,
    /// Keep the first-seen entry, discard later ones.
    KeepFirst,
    /// Keep the last-seen entry. It replaces the earlier one in place, so
    /// the surviving entry sits at the first occurrence's position.
    KeepLast,
}

/// An ordered, indexed, read-only collection of bibliography entries.
#[derive(Debug, Clone)]
pub struct BibCollection {
    entries: Vec<BibEntry>,
    index: HashMap<String, usize>,
}

impl BibCollection {
    /// Builds a collection from parsed entries with the default duplicate
    /// policy ([`DuplicateKeyPolicy::Error`]).
    pub fn new(entries: Vec<BibEntry>) -> Result<Self> {
        Self::with_policy(entries, DuplicateKeyPolicy::default())
    }

    /// Builds a collection from parsed entries, resolving duplicate
    /// citation keys according to `policy`.
    pub fn with_policy(entries: Vec<BibEntry>, policy: DuplicateKeyPolicy) -> Result<Self> {
        let mut kept: Vec<BibEntry> = Vec::with_capacity(entries.len());
        let mut index: HashMap<String, usize> = HashMap::with_capacity(entries.len());

        for entry in entries {
            match index.get(&entry.citation_key) {
                None => {
                    index.insert(entry.citation_key.clone(), kept.len());
                    kept.push(entry);
                }
                Some(&existing) => match policy {
                    DuplicateKeyPolicy::Error => {
                        return Err(BibError::DuplicateKey(entry.citation_key));
                    }
                    DuplicateKeyPolicy::KeepFirst => {}
                    DuplicateKeyPolicy::KeepLast => kept[existing] = entry,
                },
            }
        }

        debug!(entries = kept.len(), "built bib collection");
        Ok(Self { entries: kept, index })
    }

    /// Returns the entry for an exact citation key, or `None` if no entry
    /// has that key.
    pub fn get(&self, key: &str) -> Option<&BibEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    /// Returns the full ordered sequence of entries as a read-only view.
    pub fn all(&self) -> &[BibEntry] {
        &self.entries
    }

    /// Iterates over entries in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, BibEntry> {
        self.entries.iter()
    }

    /// Iterates over citation keys in source order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.citation_key.as_str())
    }

    /// Number of entries in the collection.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Produces entries whose entry type matches, case-insensitively.
    ///
    /// The result is a lazy, restartable view over the collection.
    pub fn filter_by_type<'a>(
        &'a self,
        entry_type: &'a str,
    ) -> impl Iterator<Item = &'a BibEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.entry_type.eq_ignore_ascii_case(entry_type))
    }

    /// Produces entries that have `field_name` and whose value satisfies
    /// `predicate`. Entries lacking the field are excluded.
    ///
    /// ```
    /// # use bibrepo::{BibCollection, BibtexParser};
    /// # let entries = BibtexParser::new()
    /// #     .parse("@article{a, year=2019}\n@article{b, year=2021}")
    /// #     .unwrap();
    /// # let collection = BibCollection::new(entries).unwrap();
    /// let recent: Vec<_> = collection
    ///     .filter_by_field("year", |v| v.parse::<i32>().is_ok_and(|y| y >= 2020))
    ///     .collect();
    /// assert_eq!(recent.len(), 1);
    /// ```
    pub fn filter_by_field<'a, P>(
        &'a self,
        field_name: &str,
        predicate: P,
    ) -> impl Iterator<Item = &'a BibEntry> + 'a
    where
        P: Fn(&str) -> bool + 'a,
    {
        let field_name = field_name.to_lowercase();
        self.entries
            .iter()
            .filter(move |e| e.fields.get(&field_name).is_some_and(|v| predicate(v)))
    }

    /// Produces entries that carry the named field at all.
    pub fn with_field<'a>(&'a self, field_name: &str) -> impl Iterator<Item = &'a BibEntry> + 'a {
        let field_name = field_name.to_lowercase();
        self.entries
            .iter()
            .filter(move |e| e.fields.contains_key(&field_name))
    }

    /// Case-insensitive substring search over titles and abstracts.
    ///
    /// Matching entries are returned in source order.
    pub fn search_text(&self, query: &str) -> Vec<&BibEntry> {
        self.search_text_in(query, &DEFAULT_SEARCH_FIELDS)
    }

    /// Case-insensitive substring search over the given fields.
    pub fn search_text_in(&self, query: &str, fields: &[&str]) -> Vec<&BibEntry> {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| {
                fields
                    .iter()
                    .any(|f| e.field(f).is_some_and(|v| v.to_lowercase().contains(&query)))
            })
            .collect()
    }

    /// Returns a new collection holding the entries whose citation key does
    /// not appear in `other`, in source order.
    ///
    /// Useful for comparing exports, e.g. which documents one search
    /// returned that another did not.
    pub fn difference(&self, other: &BibCollection) -> BibCollection {
        let entries: Vec<BibEntry> = self
            .entries
            .iter()
            .filter(|e| !other.index.contains_key(&e.citation_key))
            .cloned()
            .collect();
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.citation_key.clone(), i))
            .collect();
        BibCollection { entries, index }
    }

    /// Re-serializes the whole collection as `.bib` text, entries separated
    /// by blank lines.
    pub fn to_bibtex(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.to_bibtex());
            out.push_str("\n\n");
        }
        out
    }
}

impl<'a> IntoIterator for &'a BibCollection {
    type Item = &'a BibEntry;
    type IntoIter = std::slice::Iter<'a, BibEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
