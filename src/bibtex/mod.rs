//! BibTeX record store.
//!
//! The scraper only needs three things from an entry: its citation key, its
//! `url` field, and the ability to write the entry back out unchanged. Field
//! values are therefore kept in their raw source form and unwrapped on access.
//!
//! # Example
//!
//! ```
//! use bibfetch_core::bibtex;
//!
//! let records = bibtex::parse("@article{k1, url = {http://dl.acm.org/x}}").unwrap();
//! assert_eq!(records[0].key(), Some("k1"));
//! assert_eq!(records[0].url(), Some("http://dl.acm.org/x"));
//! ```

mod error;
mod parse;
mod write;

use std::path::Path;

pub use error::StoreError;
pub use parse::parse;
pub use write::{format_records, write_file};

/// Reads and parses a bibliography file.
///
/// # Errors
///
/// Returns [`StoreError::Io`] if the file cannot be read and
/// [`StoreError::Malformed`] if it is not valid BibTeX.
pub async fn read_file(path: &Path) -> Result<Vec<BibRecord>, StoreError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    parse(&raw)
}

/// One `name = value` assignment of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibField {
    name: String,
    raw: String,
}

impl BibField {
    /// Creates a field from its lower-cased name and raw source value
    /// (including braces or quotes).
    #[must_use]
    pub fn new(name: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            raw: raw.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value exactly as written in the source.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The value without its outer braces or quotes.
    #[must_use]
    pub fn value(&self) -> &str {
        let trimmed = self.raw.trim();
        let unwrapped = if trimmed.len() >= 2
            && ((trimmed.starts_with('{') && trimmed.ends_with('}'))
                || (trimmed.starts_with('"') && trimmed.ends_with('"')))
        {
            &trimmed[1..trimmed.len() - 1]
        } else {
            trimmed
        };
        unwrapped.trim()
    }
}

/// One bibliography entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibRecord {
    entry_type: String,
    key: Option<String>,
    fields: Vec<BibField>,
}

impl BibRecord {
    #[must_use]
    pub fn new(entry_type: impl Into<String>, key: Option<String>, fields: Vec<BibField>) -> Self {
        Self {
            entry_type: entry_type.into(),
            key,
            fields,
        }
    }

    /// Lower-cased entry type (`article`, `inproceedings`, ...).
    #[must_use]
    pub fn entry_type(&self) -> &str {
        &self.entry_type
    }

    /// Citation key, `None` when the entry has none.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    #[must_use]
    pub fn fields(&self) -> &[BibField] {
        &self.fields
    }

    /// Unwrapped value of the first field called `name` (lower-case).
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(BibField::value)
    }

    /// The landing-page URL, if the entry has a non-empty `url` field.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.field("url").filter(|url| !url.is_empty())
    }
}
