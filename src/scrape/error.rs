//! Errors that abort a scrape run.

use std::path::PathBuf;

use thiserror::Error;

use crate::discovery::Strategy;

/// Run-level failures. Per-entry problems never surface here; they are
/// classified into a [`Status`](crate::Status) instead.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// A strategy that needs path expressions was given none.
    #[error("mode {strategy} needs at least one path expression\n  Suggestion: {suggestion}")]
    MissingPathExpression {
        /// The selected strategy.
        strategy: Strategy,
        /// How to fix the invocation.
        suggestion: &'static str,
    },

    /// The output directory cannot be created.
    #[error("cannot create output directory {path}: {source}\n  Suggestion: {suggestion}")]
    OutputDir {
        /// The directory.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// How to fix the invocation.
        suggestion: &'static str,
    },
}

impl ScrapeError {
    #[must_use]
    pub fn missing_path_expression(strategy: Strategy) -> Self {
        Self::MissingPathExpression {
            strategy,
            suggestion: "pass CSS selectors with -x, e.g. -x \"a#pdfLink;a.download-pdf-link\"",
        }
    }

    #[must_use]
    pub fn output_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputDir {
            path: path.into(),
            source,
            suggestion: "check that the parent directory exists and is writable, or pick another -o",
        }
    }
}
