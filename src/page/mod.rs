//! Page retrieval.
//!
//! A [`PageFetcher`] turns a URL into a [`Page`]: either an HTML
//! [`Document`] that discovery can query, or a [`Resource`] whose bytes are
//! streamed to disk. Two fetchers exist per run, a plain one and a scripting
//! one; discovery only ever sees the trait.

mod document;
mod error;
mod http;
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing;

use std::fmt;

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};

pub use document::Document;
pub use error::FetchError;
pub use http::{CONNECT_TIMEOUT_SECS, FetcherOptions, HttpPageFetcher, READ_TIMEOUT_SECS};

/// Byte chunks of a resource body.
pub type ContentStream = BoxStream<'static, Result<Vec<u8>, std::io::Error>>;

/// Result of fetching a URL.
#[derive(Debug)]
pub enum Page {
    Document(Document),
    Resource(Resource),
}

impl Page {
    #[must_use]
    pub fn is_document(&self) -> bool {
        matches!(self, Self::Document(_))
    }

    /// URL the page was finally served from.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Document(document) => document.url().as_str(),
            Self::Resource(resource) => resource.url(),
        }
    }
}

/// A non-HTML response whose body has not been read yet.
pub struct Resource {
    url: String,
    content_type: Option<String>,
    body: ContentStream,
}

impl Resource {
    #[must_use]
    pub fn new(url: impl Into<String>, content_type: Option<String>, body: ContentStream) -> Self {
        Self {
            url: url.into(),
            content_type,
            body,
        }
    }

    /// Resource backed by an in-memory list of chunks.
    #[must_use]
    pub fn from_chunks(
        url: impl Into<String>,
        chunks: Vec<Result<Vec<u8>, std::io::Error>>,
    ) -> Self {
        Self::new(
            url,
            Some("application/pdf".to_string()),
            stream::iter(chunks).boxed(),
        )
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    #[must_use]
    pub fn into_content_stream(self) -> ContentStream {
        self.body
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("url", &self.url)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Retrieves pages.
///
/// Implementations keep their own session state (cookies). Fetches of
/// 4xx/5xx responses must fail with [`FetchError::FailingStatus`].
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn fetch(&self, url: &str) -> Result<Page, FetchError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;

    #[tokio::test]
    async fn test_resource_from_chunks_streams_in_order() {
        let resource = Resource::from_chunks(
            "https://example.org/a.pdf",
            vec![Ok(b"%PDF".to_vec()), Ok(b"-1.7".to_vec())],
        );
        assert_eq!(resource.content_type(), Some("application/pdf"));
        let bytes: Vec<Vec<u8>> = resource.into_content_stream().try_collect().await.unwrap();
        assert_eq!(bytes.concat(), b"%PDF-1.7");
    }

    #[test]
    fn test_page_url_and_kind() {
        let document = Page::Document(Document::new(
            url::Url::parse("https://example.org/landing").unwrap(),
            "<html></html>",
        ));
        assert!(document.is_document());
        assert_eq!(document.url(), "https://example.org/landing");

        let resource = Page::Resource(Resource::from_chunks("https://example.org/a.pdf", vec![]));
        assert!(!resource.is_document());
        assert_eq!(resource.url(), "https://example.org/a.pdf");
    }
}
