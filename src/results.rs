//! Per-status accumulation of processed entries.

use tracing::warn;

use crate::bibtex::BibRecord;
use crate::status::Status;

/// Processed entries grouped by their terminal [`Status`], in the order they
/// were classified.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    buckets: [Vec<BibRecord>; Status::ALL.len()],
}

impl ResultSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `record` to the bucket of `status`.
    pub fn record(&mut self, status: Status, record: BibRecord) {
        self.buckets[status.index()].push(record);
    }

    #[must_use]
    pub fn bucket(&self, status: Status) -> &[BibRecord] {
        &self.buckets[status.index()]
    }

    /// Number of processed entries across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.bucket(Status::Success).len()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    /// Consumes the set, yielding every non-empty bucket in status order.
    #[must_use]
    pub fn finalize(self) -> Vec<(Status, Vec<BibRecord>)> {
        Status::ALL
            .into_iter()
            .zip(self.buckets)
            .filter(|(_, records)| !records.is_empty())
            .collect()
    }

    /// Checks the bucket totals against the number of entries that should
    /// have been processed.
    #[must_use]
    pub fn reconcile(&self, expected: usize) -> Reconciliation {
        Reconciliation {
            expected,
            succeeded: self.succeeded(),
            failed: self.failed(),
        }
    }
}

/// Processed-entry counts at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciliation {
    /// Entries inside the range.
    pub expected: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl Reconciliation {
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.total() == self.expected
    }

    /// Logs an integrity warning when the counts do not add up.
    pub fn warn_on_mismatch(&self) {
        if !self.is_consistent() {
            warn!(
                expected = self.expected,
                succeeded = self.succeeded,
                failed = self.failed,
                total = self.total(),
                "number of processed entries does not match the number of entries in range"
            );
        }
    }
}
