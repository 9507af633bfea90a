//! Error types for page fetching.

use thiserror::Error;

/// Errors a [`PageFetcher`](super::PageFetcher) can report.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL is malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
    },

    /// The server answered with a 4xx or 5xx status.
    #[error("HTTP {status} fetching {url}")]
    FailingStatus {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The request timed out.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Connection, TLS or body transfer failure.
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL being fetched.
        url: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    pub fn failing_status(url: impl Into<String>, status: u16) -> Self {
        Self::FailingStatus {
            url: url.into(),
            status,
        }
    }

    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    pub fn network(
        url: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Network {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Maps a reqwest transport error, keeping timeouts distinct.
    pub(crate) fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(url)
        } else {
            Self::network(url, error)
        }
    }

    /// True for the retryable failing-status condition.
    #[must_use]
    pub fn is_failing_status(&self) -> bool {
        matches!(self, Self::FailingStatus { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_failing_status_display() {
        let err = FetchError::failing_status("https://example.com/a.pdf", 503);
        let msg = err.to_string();
        assert!(msg.contains("503"), "{msg}");
        assert!(msg.contains("https://example.com/a.pdf"), "{msg}");
        assert!(err.is_failing_status());
    }

    #[test]
    fn test_network_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset by peer");
        let err = FetchError::network("https://example.com", io);
        assert!(!err.is_failing_status());
        assert!(err.to_string().contains("reset by peer"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
