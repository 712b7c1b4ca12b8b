//! BibTeX format data structures.
//!
//! This module defines the intermediate entry representation produced by the
//! scanner and its conversion into the public [`BibEntry`] type.
//!
//! # Design Decision
//!
//! The scanner keeps field names and values exactly as written so that error
//! messages can quote the source; normalization (lowercased names, collapsed
//! whitespace) happens here in one place. When a field name repeats within
//! an entry, the last occurrence wins.

use crate::utils::collapse_whitespace;
use crate::BibEntry;
use std::collections::HashMap;

/// One raw entry block scanned from a `.bib` file.
#[derive(Debug, Clone)]
pub(crate) struct RawBibEntry {
    /// Entry type, lowercased (the scanner needs it to recognize non-entry
    /// blocks).
    pub(crate) entry_type: String,
    /// Citation key exactly as written.
    pub(crate) citation_key: String,
    /// Field name/value pairs in source order, unnormalized.
    pub(crate) fields: Vec<(String, String)>,
}

impl From<RawBibEntry> for BibEntry {
    fn from(raw: RawBibEntry) -> Self {
        let mut fields = HashMap::with_capacity(raw.fields.len());
        for (name, value) in raw.fields {
            fields.insert(name.to_lowercase(), collapse_whitespace(&value));
        }
        BibEntry {
            entry_type: raw.entry_type,
            citation_key: raw.citation_key,
            fields,
        }
    }
}
