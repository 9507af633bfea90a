//! Error types for streaming a PDF to disk.

use std::path::PathBuf;

use thiserror::Error;

use crate::status::Status;

/// Failure while copying a resource body into the output file.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Reading the response body failed.
    #[error("error reading {url}: {source}")]
    Read {
        /// The URL being downloaded.
        url: String,
        /// The underlying read error.
        #[source]
        source: std::io::Error,
    },

    /// Creating or writing the output file failed.
    #[error("error writing {path}: {source}")]
    Write {
        /// The output file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl StreamError {
    pub fn read(url: impl Into<String>, source: std::io::Error) -> Self {
        Self::Read {
            url: url.into(),
            source,
        }
    }

    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Terminal status this failure classifies as.
    #[must_use]
    pub fn status(&self) -> Status {
        match self {
            Self::Read { .. } => Status::InputStreamError,
            Self::Write { .. } => Status::OutputStreamError,
        }
    }
}
