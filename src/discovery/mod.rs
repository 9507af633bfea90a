//! Locating the PDF link behind a record's landing page.
//!
//! Two page strategies exist, [`PageStrategy::AnchorPath`] and
//! [`PageStrategy::FrameSource`]. [`Strategy::Auto`] picks a chain of them
//! from the [`SourceRegistry`] based on the landing page URL.
//!
//! Every page strategy runs on the plain fetcher first. Strategies that
//! allow it get exactly one more try on the scripting fetcher when the
//! plain run finds nothing.
//!
//! # Example
//!
//! ```no_run
//! use bibfetch_core::discovery::{DiscoveryContext, SourceRegistry, Strategy, discover_with_retry};
//! use bibfetch_core::page::{FetcherOptions, HttpPageFetcher};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = FetcherOptions::default();
//! let plain = HttpPageFetcher::plain(&options)?;
//! let scripting = HttpPageFetcher::scripting(&options)?;
//! let registry = SourceRegistry::builtin();
//! let ctx = DiscoveryContext::new(&registry, &plain, &scripting);
//!
//! let link = discover_with_retry(Strategy::Auto, &ctx, "http://dl.acm.org/citation.cfm?id=1", &[]).await;
//! println!("{link:?}");
//! # Ok(())
//! # }
//! ```

mod anchor;
mod frame;
mod source;

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info, instrument};

use crate::page::PageFetcher;

pub use source::{Source, SourceRegistry, SourceRule};

/// Link-discovery strategy selected for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Strategy chain chosen per URL from the source registry.
    #[default]
    Auto,
    AnchorPath,
    FrameSource,
}

impl Strategy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "AUTO",
            Self::AnchorPath => "ANCHOR_PATH",
            Self::FrameSource => "FRAME_SOURCE",
        }
    }

    /// True when the strategy is useless without user-supplied path
    /// expressions.
    #[must_use]
    pub fn requires_explicit_path_expression(self) -> bool {
        matches!(self, Self::AnchorPath)
    }

    /// True when a not-found result warrants one retry on the scripting
    /// fetcher. `Auto` retries per chain step instead.
    #[must_use]
    pub fn allows_scripting_retry(self) -> bool {
        matches!(self, Self::FrameSource)
    }

    fn page_strategy(self) -> Option<PageStrategy> {
        match self {
            Self::Auto => None,
            Self::AnchorPath => Some(PageStrategy::AnchorPath),
            Self::FrameSource => Some(PageStrategy::FrameSource),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "AUTO" => Ok(Self::Auto),
            "ANCHOR_PATH" | "XPATH_ANCHOR" | "ANCHOR" => Ok(Self::AnchorPath),
            "FRAME_SOURCE" | "FRAME_SRC" | "FRAME" => Ok(Self::FrameSource),
            other => Err(format!(
                "unknown mode `{other}` (expected AUTO, ANCHOR_PATH or FRAME_SOURCE)"
            )),
        }
    }
}

/// A strategy that works on a single landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStrategy {
    AnchorPath,
    FrameSource,
}

impl PageStrategy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AnchorPath => "ANCHOR_PATH",
            Self::FrameSource => "FRAME_SOURCE",
        }
    }

    #[must_use]
    pub fn allows_scripting_retry(self) -> bool {
        matches!(self, Self::FrameSource)
    }

    async fn find_link(
        self,
        fetcher: &dyn PageFetcher,
        url: &str,
        path_expressions: &[String],
    ) -> Option<String> {
        match self {
            Self::AnchorPath => anchor::find_link(fetcher, url, path_expressions).await,
            Self::FrameSource => frame::find_link(fetcher, url, path_expressions).await,
        }
    }
}

impl fmt::Display for PageStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything discovery needs, borrowed for the duration of a run.
#[derive(Clone, Copy)]
pub struct DiscoveryContext<'a> {
    pub registry: &'a SourceRegistry,
    pub plain: &'a dyn PageFetcher,
    pub scripting: &'a dyn PageFetcher,
}

impl<'a> DiscoveryContext<'a> {
    #[must_use]
    pub fn new(
        registry: &'a SourceRegistry,
        plain: &'a dyn PageFetcher,
        scripting: &'a dyn PageFetcher,
    ) -> Self {
        Self {
            registry,
            plain,
            scripting,
        }
    }
}

impl fmt::Debug for DiscoveryContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryContext")
            .field("plain", &self.plain.name())
            .field("scripting", &self.scripting.name())
            .finish_non_exhaustive()
    }
}

/// Finds the PDF link behind `url`, or `None` when nothing was found.
///
/// `path_expressions` are the user's expressions; `Auto` ignores them and
/// uses the ones configured for the detected source. Fetch failures count as
/// not found.
#[instrument(skip(ctx, path_expressions))]
pub async fn discover_with_retry(
    strategy: Strategy,
    ctx: &DiscoveryContext<'_>,
    url: &str,
    path_expressions: &[String],
) -> Option<String> {
    if let Some(page_strategy) = strategy.page_strategy() {
        return discover_page(page_strategy, ctx, url, path_expressions).await;
    }

    let source = ctx.registry.classify(url);
    let chain = ctx.registry.configurations(source);
    info!(source = %source, steps = chain.len(), "automatic source detection");
    for rule in chain {
        if let Some(link) = discover_page(rule.strategy(), ctx, url, rule.path_expressions()).await {
            return Some(link);
        }
    }
    None
}

async fn discover_page(
    strategy: PageStrategy,
    ctx: &DiscoveryContext<'_>,
    url: &str,
    path_expressions: &[String],
) -> Option<String> {
    debug!(strategy = %strategy, fetcher = ctx.plain.name(), "discovering link");
    if let Some(link) = strategy.find_link(ctx.plain, url, path_expressions).await {
        return Some(link);
    }
    if !strategy.allows_scripting_retry() {
        return None;
    }

    info!(strategy = %strategy, fetcher = ctx.scripting.name(), "retrying with scripting enabled");
    strategy.find_link(ctx.scripting, url, path_expressions).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::page::testing::StubFetcher;

    const ACM_PAGE: &str = r#"<a name="FullTextPDF" href="/ft_gateway.cfm?id=1">PDF</a>"#;

    #[test]
    fn test_strategy_from_str_aliases() {
        assert_eq!("auto".parse::<Strategy>().unwrap(), Strategy::Auto);
        assert_eq!("XPATH_ANCHOR".parse::<Strategy>().unwrap(), Strategy::AnchorPath);
        assert_eq!("anchor-path".parse::<Strategy>().unwrap(), Strategy::AnchorPath);
        assert_eq!("frame_src".parse::<Strategy>().unwrap(), Strategy::FrameSource);
        assert!("scrape-harder".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_strategy_flags() {
        assert!(Strategy::AnchorPath.requires_explicit_path_expression());
        assert!(!Strategy::Auto.requires_explicit_path_expression());
        assert!(!Strategy::FrameSource.requires_explicit_path_expression());

        assert!(Strategy::FrameSource.allows_scripting_retry());
        assert!(!Strategy::AnchorPath.allows_scripting_retry());
        assert!(!Strategy::Auto.allows_scripting_retry());
    }

    #[tokio::test]
    async fn test_auto_acm_page_without_anchor_is_not_found() {
        let registry = SourceRegistry::builtin();
        let plain = StubFetcher::named("plain").document("http://dl.acm.org/x", "<p>no pdf</p>");
        let scripting = StubFetcher::named("scripting");
        let ctx = DiscoveryContext::new(&registry, &plain, &scripting);

        let link = discover_with_retry(Strategy::Auto, &ctx, "http://dl.acm.org/x", &[]).await;
        assert_eq!(link, None);
        // ANCHOR_PATH never retries with scripting.
        assert_eq!(scripting.calls(), 0);
    }

    #[tokio::test]
    async fn test_auto_acm_uses_configured_expression() {
        let registry = SourceRegistry::builtin();
        let plain = StubFetcher::named("plain").document("http://dl.acm.org/x", ACM_PAGE);
        let scripting = StubFetcher::named("scripting");
        let ctx = DiscoveryContext::new(&registry, &plain, &scripting);

        let link = discover_with_retry(Strategy::Auto, &ctx, "http://dl.acm.org/x", &[]).await;
        assert_eq!(link.as_deref(), Some("http://dl.acm.org/ft_gateway.cfm?id=1"));
    }

    #[tokio::test]
    async fn test_auto_doi_falls_through_frame_to_anchor() {
        let registry = SourceRegistry::builtin();
        let url = "https://dx.doi.org/10.1145/1";
        let plain = StubFetcher::named("plain").document(url, ACM_PAGE);
        let scripting = StubFetcher::named("scripting").document(url, ACM_PAGE);
        let ctx = DiscoveryContext::new(&registry, &plain, &scripting);

        let link = discover_with_retry(Strategy::Auto, &ctx, url, &[]).await;
        assert_eq!(link.as_deref(), Some("https://dx.doi.org/ft_gateway.cfm?id=1"));
        // FRAME_SOURCE found nothing and retried once with scripting.
        assert_eq!(scripting.calls(), 1);
        // FRAME_SOURCE then ANCHOR_PATH on the plain fetcher.
        assert_eq!(plain.calls(), 2);
    }

    #[tokio::test]
    async fn test_frame_source_scripting_result_is_final() {
        let registry = SourceRegistry::builtin();
        let url = "https://example.org/paper";
        let plain = StubFetcher::named("plain").document(url, "<p>loading...</p>");
        let scripting = StubFetcher::named("scripting")
            .document(url, r#"<body><iframe src="/files/paper.pdf"></iframe></body>"#);
        let ctx = DiscoveryContext::new(&registry, &plain, &scripting);

        let link = discover_with_retry(Strategy::FrameSource, &ctx, url, &[]).await;
        assert_eq!(link.as_deref(), Some("https://example.org/files/paper.pdf"));
        assert_eq!(plain.calls(), 1);
        assert_eq!(scripting.calls(), 1);
    }

    #[tokio::test]
    async fn test_anchor_path_with_user_expressions() {
        let registry = SourceRegistry::builtin();
        let url = "https://journals.example.org/article/7";
        let plain = StubFetcher::named("plain")
            .document(url, r#"<a class="get-pdf" href="article/7.pdf">PDF</a>"#);
        let scripting = StubFetcher::named("scripting");
        let ctx = DiscoveryContext::new(&registry, &plain, &scripting);

        let link = discover_with_retry(
            Strategy::AnchorPath,
            &ctx,
            url,
            &["a.missing".to_string(), "a.get-pdf".to_string()],
        )
        .await;
        assert_eq!(link.as_deref(), Some("https://journals.example.org/article/article/7.pdf"));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_not_found() {
        let registry = SourceRegistry::builtin();
        let plain = StubFetcher::named("plain");
        let scripting = StubFetcher::named("scripting");
        let ctx = DiscoveryContext::new(&registry, &plain, &scripting);

        let link = discover_with_retry(Strategy::Auto, &ctx, "https://unreachable.example/", &[]).await;
        assert_eq!(link, None);
        // UNKNOWN is FRAME_SOURCE: one plain try, one scripting retry.
        assert_eq!(plain.calls(), 1);
        assert_eq!(scripting.calls(), 1);
    }
}
