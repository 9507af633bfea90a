//! Frame-source discovery.
//!
//! Some publishers show the PDF inside a `frame` or `iframe`. Before looking
//! at the frames, each path expression may redirect to another page: when an
//! expression matches a link, the link is followed. A target that is not a
//! document is taken to be the PDF itself; a document target replaces the
//! current page.

use tracing::{debug, warn};

use crate::page::{Document, Page, PageFetcher};

pub(super) async fn find_link(
    fetcher: &dyn PageFetcher,
    url: &str,
    path_expressions: &[String],
) -> Option<String> {
    let mut page = match fetcher.fetch(url).await {
        Ok(Page::Document(document)) => document,
        Ok(Page::Resource(resource)) => {
            debug!(url, served = resource.url(), "landing page is not a document");
            return None;
        }
        Err(error) => {
            warn!(url, fetcher = fetcher.name(), error = %error, "landing page fetch failed");
            return None;
        }
    };

    for expression in path_expressions {
        let Some(next) = page.first_matching_link(expression) else {
            continue;
        };
        match fetcher.fetch(&next).await {
            Ok(Page::Document(document)) => {
                debug!(expression = expression.as_str(), next = next.as_str(), "following anchor");
                page = document;
            }
            Ok(Page::Resource(_)) => {
                debug!(expression = expression.as_str(), next = next.as_str(), "anchor leads to the file");
                return Some(next);
            }
            Err(error) => {
                warn!(next = next.as_str(), error = %error, "anchor target fetch failed");
            }
        }
    }

    pdf_frame_source(&page)
}

/// First frame `src` naming a PDF, resolved against the page URL.
fn pdf_frame_source(page: &Document) -> Option<String> {
    let sources = page.frame_sources();
    let total = sources.len();
    for (index, src) in sources.iter().enumerate() {
        debug!(frame = index + 1, total, src = src.as_str(), "checking frame");
        if src.to_ascii_lowercase().contains(".pdf") {
            return page.resolve_relative(src);
        }
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::page::testing::StubFetcher;

    const IEEE: &str = "https://ieeexplore.ieee.org/document/1";

    #[tokio::test]
    async fn test_frame_with_pdf_source_is_found() {
        let fetcher = StubFetcher::new().document(
            IEEE,
            r#"<frameset><frame src="/header.html"><frame src="/stamp/1.PDF?arnumber=1"></frameset>"#,
        );
        let link = find_link(&fetcher, IEEE, &[]).await;
        assert_eq!(link.as_deref(), Some("https://ieeexplore.ieee.org/stamp/1.PDF?arnumber=1"));
    }

    #[tokio::test]
    async fn test_anchor_to_resource_is_returned_immediately() {
        let fetcher = StubFetcher::new()
            .document(IEEE, r#"<a class="pdf" href="/stamp.jsp?id=1">PDF</a>"#)
            .resource("https://ieeexplore.ieee.org/stamp.jsp?id=1");
        let link = find_link(&fetcher, IEEE, &["a.pdf".to_string()]).await;
        assert_eq!(link.as_deref(), Some("https://ieeexplore.ieee.org/stamp.jsp?id=1"));
    }

    #[tokio::test]
    async fn test_anchor_to_document_becomes_current_page() {
        let fetcher = StubFetcher::new()
            .document(IEEE, r#"<a class="pdf" href="/stamp.jsp?id=1">PDF</a>"#)
            .document(
                "https://ieeexplore.ieee.org/stamp.jsp?id=1",
                r#"<body><iframe src="https://ieeexplore.ieee.org/ielx7/1.pdf"></iframe></body>"#,
            );
        let link = find_link(&fetcher, IEEE, &["a.pdf".to_string()]).await;
        assert_eq!(link.as_deref(), Some("https://ieeexplore.ieee.org/ielx7/1.pdf"));
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_no_pdf_frame_is_not_found() {
        let fetcher = StubFetcher::new().document(
            IEEE,
            r#"<body><iframe src="/ads.html"></iframe></body>"#,
        );
        assert_eq!(find_link(&fetcher, IEEE, &[]).await, None);
    }

    #[tokio::test]
    async fn test_failed_redirect_keeps_current_page() {
        let fetcher = StubFetcher::new().document(
            IEEE,
            r#"<a class="pdf" href="/gone">x</a><iframe src="doc.pdf"></iframe>"#,
        );
        let link = find_link(&fetcher, IEEE, &["a.pdf".to_string()]).await;
        assert_eq!(link.as_deref(), Some("https://ieeexplore.ieee.org/document/doc.pdf"));
    }
}
