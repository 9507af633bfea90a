//! Error types for the BibTeX record store.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or writing a bibliography.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The bibliography text is not valid BibTeX.
    #[error("malformed BibTeX entry #{entry} `{preview}`: {reason}\n  Suggestion: {suggestion}")]
    Malformed {
        /// 1-based position of the offending `@...{...}` block.
        entry: usize,
        /// Truncated entry text for display.
        preview: String,
        /// Why the entry was rejected.
        reason: String,
        /// How to fix the input.
        suggestion: &'static str,
    },

    /// Reading or writing a bibliography file failed.
    #[error("IO error on {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Creates a malformed-entry error.
    #[must_use]
    pub fn malformed(entry: usize, raw: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            entry,
            preview: preview(raw),
            reason: reason.into(),
            suggestion: "use `@type{key, field = {value}, ...}` with balanced braces and quotes",
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn preview(input: &str) -> String {
    const MAX: usize = 60;
    let flat = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= MAX {
        return flat;
    }
    let shortened: String = flat.chars().take(MAX).collect();
    format!("{shortened}...")
}
