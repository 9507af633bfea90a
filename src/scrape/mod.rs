//! The per-entry pipeline: classify, discover, download, aggregate.
//!
//! Entries are processed one after another in file order. Each processed
//! entry ends in exactly one [`Status`] and is written to that status's
//! directory; at the end of the run one bibliography per status is written
//! next to them.

mod error;
mod output;

use tracing::{info, instrument, warn};

use crate::bibtex::BibRecord;
use crate::discovery::{DiscoveryContext, Strategy, discover_with_retry};
use crate::download::{CoolDown, RetryPolicy, fetch_pdf};
use crate::ident::IdScheme;
use crate::range::EntryRange;
use crate::results::{Reconciliation, ResultSet};
use crate::status::Status;

pub use error::ScrapeError;
pub use output::OutputLayout;

/// Default separator between path expressions given as one string.
pub const DEFAULT_PATH_SEPARATOR: &str = ";";

/// Splits a user-supplied expression list, dropping blank parts.
#[must_use]
pub fn split_path_expressions(text: &str, separator: &str) -> Vec<String> {
    let separator = if separator.is_empty() {
        DEFAULT_PATH_SEPARATOR
    } else {
        separator
    };
    text.split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Knobs of a single run.
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    pub range: EntryRange,
    pub id_scheme: IdScheme,
    /// Number given to the first entry of the file.
    pub first_number: usize,
    pub strategy: Strategy,
    pub path_expressions: Vec<String>,
    pub retry: RetryPolicy,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            range: EntryRange::unbounded(),
            id_scheme: IdScheme::default(),
            first_number: 1,
            strategy: Strategy::default(),
            path_expressions: Vec::new(),
            retry: RetryPolicy::default(),
        }
    }
}

impl ScrapeSettings {
    /// # Errors
    ///
    /// Returns [`ScrapeError::MissingPathExpression`] when the strategy needs
    /// path expressions and none were given.
    pub fn validate(&self) -> Result<(), ScrapeError> {
        if self.strategy.requires_explicit_path_expression() && self.path_expressions.is_empty() {
            return Err(ScrapeError::missing_path_expression(self.strategy));
        }
        Ok(())
    }

    /// Identifier number of the entry at `ordinal` (1-based).
    #[must_use]
    pub fn entry_number(&self, ordinal: usize) -> usize {
        (self.first_number + ordinal).saturating_sub(1)
    }

    /// Logs the resolved settings.
    pub fn log(&self) {
        info!(range = %self.range, "range to process");
        info!(mode = %self.strategy, "scraping mode");
        for (index, expression) in self.path_expressions.iter().enumerate() {
            info!(index = index + 1, expression = expression.as_str(), "path expression");
        }
        info!(scheme = %self.id_scheme, first_number = self.first_number, "identifiers");
        info!(
            max_attempts = self.retry.max_attempts(),
            cool_down_secs = self.retry.cool_down().as_secs(),
            "download retries"
        );
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Entries in the input file.
    pub total_entries: usize,
    /// Processed entries per status, in status order, empty statuses omitted.
    pub counts: Vec<(Status, usize)>,
    pub reconciliation: Reconciliation,
}

impl RunReport {
    #[must_use]
    pub fn count(&self, status: Status) -> usize {
        self.counts
            .iter()
            .find(|(s, _)| *s == status)
            .map_or(0, |(_, n)| *n)
    }

    /// Logs success and per-status failure counts.
    pub fn log_summary(&self) {
        let succeeded = self.reconciliation.succeeded;
        info!(succeeded, "successfully processed entries");
        info!(
            unprocessed = self.total_entries.saturating_sub(succeeded),
            "unprocessed entries"
        );
        for (status, count) in &self.counts {
            if !status.is_success() {
                info!(status = %status, count, "failed entries");
            }
        }
        self.reconciliation.warn_on_mismatch();
    }
}

/// Drives a run over a parsed bibliography.
pub struct Scraper<'a> {
    settings: &'a ScrapeSettings,
    discovery: DiscoveryContext<'a>,
    cool_down: &'a dyn CoolDown,
    layout: OutputLayout,
}

impl<'a> Scraper<'a> {
    /// PDFs are downloaded with `discovery.plain`.
    #[must_use]
    pub fn new(
        settings: &'a ScrapeSettings,
        discovery: DiscoveryContext<'a>,
        cool_down: &'a dyn CoolDown,
        layout: OutputLayout,
    ) -> Self {
        Self {
            settings,
            discovery,
            cool_down,
            layout,
        }
    }

    /// Processes the in-range entries of `records` and writes all output.
    ///
    /// # Errors
    ///
    /// Fails only on run-level problems: invalid settings or an output
    /// directory that cannot be created.
    pub async fn run(&self, records: Vec<BibRecord>) -> Result<RunReport, ScrapeError> {
        self.settings.validate()?;
        self.layout.prepare().await?;

        let total_entries = records.len();
        let range = self.settings.range;
        let expected = range.count_within(total_entries);
        let last_number = self
            .settings
            .entry_number(range.end().map_or(total_entries, |end| end.min(total_entries)));
        info!(processing = expected, total = total_entries, "processing entries");

        let mut results = ResultSet::new();
        for (index, record) in records.into_iter().enumerate() {
            let ordinal = index + 1;
            if range.is_past_end(ordinal) {
                break;
            }
            if !range.admits(ordinal) {
                continue;
            }

            let number = self.settings.entry_number(ordinal);
            let (status, id) = self.process(number, last_number, &record).await;
            info!(entry = number, id = id.as_str(), status = %status, "entry classified");
            self.layout.write_record(status, &id, &record).await;
            results.record(status, record);
        }

        let reconciliation = results.reconcile(expected);
        let groups = results.finalize();
        self.layout.write_groups(&groups).await;

        Ok(RunReport {
            total_entries,
            counts: groups
                .iter()
                .map(|(status, records)| (*status, records.len()))
                .collect(),
            reconciliation,
        })
    }

    #[instrument(skip(self, record), fields(key = record.key().unwrap_or_default()))]
    async fn process(&self, number: usize, last_number: usize, record: &BibRecord) -> (Status, String) {
        let Some(key) = record.key() else {
            return (Status::NoKey, IdScheme::Ordinal.id(number, "", record));
        };
        info!(entry = number, of = last_number, key, "processing entry");

        let id = self.settings.id_scheme.id(number, key, record);
        let Some(url) = record.url() else {
            return (Status::NoUrl, id);
        };

        info!(url, "discovering PDF link");
        let Some(link) = discover_with_retry(
            self.settings.strategy,
            &self.discovery,
            url,
            &self.settings.path_expressions,
        )
        .await
        else {
            return (Status::LinkNotFound, id);
        };

        if let Err(error) = self.layout.status_dir(Status::Success).await {
            warn!(error = %error, "cannot create download directory");
            return (Status::OutputStreamError, id);
        }

        info!(link = link.as_str(), "fetching PDF");
        let status = fetch_pdf(
            self.discovery.plain,
            &link,
            &self.layout.pdf_path(&id),
            &self.settings.retry,
            self.cool_down,
        )
        .await;
        (status, id)
    }
}
