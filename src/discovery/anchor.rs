//! Anchor-path discovery: the PDF link is an anchor picked out by a path
//! expression on the landing page.

use tracing::{debug, warn};

use crate::page::{Page, PageFetcher};

/// Returns the target of the first anchor matched by any expression, tried
/// in order. The landing page is fetched once.
pub(super) async fn find_link(
    fetcher: &dyn PageFetcher,
    url: &str,
    path_expressions: &[String],
) -> Option<String> {
    let document = match fetcher.fetch(url).await {
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

    path_expressions.iter().find_map(|expression| {
        debug!(expression = expression.as_str(), "trying path expression");
        document.first_matching_link(expression)
    })
}
