//! Known publisher sources and the link-discovery chain each one uses.

use std::fmt;

use tracing::debug;

use super::PageStrategy;

const ACM_ANCHOR: &str = "a[name='FullTextPDF']";
const IEEE_ANCHOR: &str = "a[class*='stats-document-lh-action-downloadPdf_2']";
const SCIENCEDIRECT_ANCHORS: [&str; 2] = ["a[id='pdfLink']", "a[class='download-pdf-link']"];

/// A publisher site the scraper knows how to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Acm,
    Doi,
    Ieee,
    ScienceDirect,
    Unknown,
}

impl Source {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Acm => "ACM",
            Self::Doi => "DOI",
            Self::Ieee => "IEEE",
            Self::ScienceDirect => "SCIENCEDIRECT",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of a source's discovery chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRule {
    strategy: PageStrategy,
    path_expressions: Vec<String>,
}

impl SourceRule {
    #[must_use]
    pub fn new(strategy: PageStrategy, path_expressions: &[&str]) -> Self {
        Self {
            strategy,
            path_expressions: path_expressions.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[must_use]
    pub fn strategy(&self) -> PageStrategy {
        self.strategy
    }

    #[must_use]
    pub fn path_expressions(&self) -> &[String] {
        &self.path_expressions
    }
}

#[derive(Debug, Clone)]
struct SourceEntry {
    source: Source,
    url_fragments: Vec<&'static str>,
    rules: Vec<SourceRule>,
}

/// Immutable table mapping URLs to sources and sources to discovery chains.
///
/// Classification walks the table in order and the first source with a
/// matching URL fragment wins. `Unknown` has no fragments and is the
/// fallback.
#[derive(Debug, Clone)]
pub struct SourceRegistry {
    entries: Vec<SourceEntry>,
}

impl SourceRegistry {
    /// The built-in publisher table.
    #[must_use]
    pub fn builtin() -> Self {
        let entries = vec![
            SourceEntry {
                source: Source::Acm,
                url_fragments: vec!["doi.acm.org", "dl.acm.org"],
                rules: vec![SourceRule::new(PageStrategy::AnchorPath, &[ACM_ANCHOR])],
            },
            SourceEntry {
                source: Source::Doi,
                url_fragments: vec!["dx.doi.org"],
                rules: vec![
                    SourceRule::new(PageStrategy::FrameSource, &[IEEE_ANCHOR]),
                    SourceRule::new(PageStrategy::AnchorPath, &[ACM_ANCHOR]),
                ],
            },
            SourceEntry {
                source: Source::Ieee,
                url_fragments: vec!["ieeexplore.ieee.org"],
                rules: vec![SourceRule::new(PageStrategy::FrameSource, &[IEEE_ANCHOR])],
            },
            SourceEntry {
                source: Source::ScienceDirect,
                url_fragments: vec!["www.sciencedirect.com"],
                rules: vec![SourceRule::new(
                    PageStrategy::AnchorPath,
                    &SCIENCEDIRECT_ANCHORS,
                )],
            },
            SourceEntry {
                source: Source::Unknown,
                url_fragments: Vec::new(),
                rules: vec![SourceRule::new(PageStrategy::FrameSource, &[])],
            },
        ];
        Self { entries }
    }

    /// Source whose URL fragments match `url`, or [`Source::Unknown`].
    #[must_use]
    pub fn classify(&self, url: &str) -> Source {
        let source = self
            .entries
            .iter()
            .find(|entry| entry.url_fragments.iter().any(|f| url.contains(f)))
            .map_or(Source::Unknown, |entry| entry.source);
        debug!(url, source = %source, "classified source");
        source
    }

    /// Discovery chain of `source`, in the order it is tried.
    #[must_use]
    pub fn configurations(&self, source: Source) -> &[SourceRule] {
        self.entries
            .iter()
            .find(|entry| entry.source == source)
            .map(|entry| entry.rules.as_slice())
            .unwrap_or_default()
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
