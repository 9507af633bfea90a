//! Terminal classification of a processed entry.

use std::fmt;

/// Where processing of one entry ended. Every processed entry ends in
/// exactly one status; the statuses partition the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    /// The entry has no citation key.
    NoKey,
    /// The entry has no `url` field.
    NoUrl,
    /// No PDF link could be discovered on the landing page.
    LinkNotFound,
    /// The discovered link leads to a document page (sign-in, purchase, ...)
    /// instead of a downloadable resource.
    InvalidLink,
    /// The server kept answering with a failing HTTP status.
    FailingStatusCode,
    /// Reading the response failed.
    InputStreamError,
    /// Writing the PDF to disk failed.
    OutputStreamError,
    /// The PDF was downloaded.
    Success,
}

impl Status {
    /// All statuses, in output order.
    pub const ALL: [Status; 8] = [
        Status::NoKey,
        Status::NoUrl,
        Status::LinkNotFound,
        Status::InvalidLink,
        Status::FailingStatusCode,
        Status::InputStreamError,
        Status::OutputStreamError,
        Status::Success,
    ];

    /// Stable label, also used as output directory name and file suffix.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoKey => "NO_KEY",
            Self::NoUrl => "NO_URL",
            Self::LinkNotFound => "LINK_NOT_FOUND",
            Self::InvalidLink => "INVALID_LINK",
            Self::FailingStatusCode => "FAILING_STATUS_CODE",
            Self::InputStreamError => "INPUT_STREAM_ERROR",
            Self::OutputStreamError => "OUTPUT_STREAM_ERROR",
            Self::Success => "SUCCESS",
        }
    }

    /// Position in [`Status::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
