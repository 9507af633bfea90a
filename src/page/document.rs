//! Parsed landing pages and the path-expression queries run against them.
//!
//! Path expressions are CSS selectors. The HTML is kept as text and parsed on
//! each query: parsed trees are not `Send` and must not live across an
//! `.await`.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::{trace, warn};
use url::Url;

#[allow(clippy::expect_used)]
static FRAME_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("frame, iframe").expect("frame selector is valid"));

/// An HTML page together with the URL it was served from.
#[derive(Debug, Clone)]
pub struct Document {
    url: Url,
    html: String,
}

impl Document {
    #[must_use]
    pub fn new(url: Url, html: impl Into<String>) -> Self {
        Self {
            url,
            html: html.into(),
        }
    }

    /// URL the page was served from, used as base for relative links.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Evaluates `expression` and, if its first match is a link, returns the
    /// link target as an absolute URL.
    ///
    /// Invalid expressions are logged and match nothing.
    #[must_use]
    pub fn first_matching_link(&self, expression: &str) -> Option<String> {
        let selector = match Selector::parse(expression) {
            Ok(selector) => selector,
            Err(error) => {
                warn!(expression, error = %error, "invalid path expression");
                return None;
            }
        };

        let html = Html::parse_document(&self.html);
        let element = html.select(&selector).next()?;
        let Some(href) = element.value().attr("href") else {
            trace!(
                expression,
                tag = element.value().name(),
                "matched element is not a link"
            );
            return None;
        };
        self.resolve_relative(href)
    }

    /// `src` attributes of every `frame` and `iframe`, in document order.
    #[must_use]
    pub fn frame_sources(&self) -> Vec<String> {
        let html = Html::parse_document(&self.html);
        html.select(&FRAME_SELECTOR)
            .filter_map(|element| element.value().attr("src"))
            .map(str::to_string)
            .collect()
    }

    /// Resolves `href` against the page URL.
    #[must_use]
    pub fn resolve_relative(&self, href: &str) -> Option<String> {
        self.url.join(href.trim()).ok().map(String::from)
    }
}
