//! On-disk layout of a run's results.
//!
//! ```text
//! <out>/
//!   SUCCESS/{id}.pdf
//!   {STATUS}/{id}.bib         one per processed entry
//!   {stem}-{STATUS}.bib       one per non-empty status
//! ```
//!
//! Status directories are created on first use.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::ScrapeError;
use crate::bibtex::{self, BibRecord};
use crate::status::Status;

#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
    stem: String,
}

impl OutputLayout {
    /// Layout under `root`, naming grouped files after the input file's stem.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, input: &Path) -> Self {
        let stem = input
            .file_stem()
            .map_or_else(|| "bibliography".to_string(), |s| s.to_string_lossy().into_owned());
        Self {
            root: root.into(),
            stem,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the root directory.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::OutputDir`] when it cannot be created.
    pub async fn prepare(&self) -> Result<(), ScrapeError> {
        if tokio::fs::try_exists(&self.root).await.unwrap_or(false) {
            info!(path = %self.root.display(), "output directory");
        } else {
            info!(path = %self.root.display(), "creating output directory");
        }
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ScrapeError::output_dir(&self.root, e))
    }

    /// Directory for `status`, created if missing.
    ///
    /// # Errors
    ///
    /// Returns the IO error when the directory cannot be created.
    pub async fn status_dir(&self, status: Status) -> std::io::Result<PathBuf> {
        let dir = self.root.join(status.as_str());
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    #[must_use]
    pub fn pdf_path(&self, id: &str) -> PathBuf {
        self.root.join(Status::Success.as_str()).join(format!("{id}.pdf"))
    }

    #[must_use]
    pub fn record_path(&self, status: Status, id: &str) -> PathBuf {
        self.root.join(status.as_str()).join(format!("{id}.bib"))
    }

    #[must_use]
    pub fn group_path(&self, status: Status) -> PathBuf {
        self.root.join(format!("{}-{}.bib", self.stem, status.as_str()))
    }

    /// Writes `record` into its status directory. Failures are logged only.
    pub async fn write_record(&self, status: Status, id: &str, record: &BibRecord) {
        if let Err(error) = self.status_dir(status).await {
            warn!(status = %status, error = %error, "cannot create status directory");
            return;
        }
        let path = self.record_path(status, id);
        match bibtex::write_file(&path, std::slice::from_ref(record)).await {
            Ok(()) => debug!(path = %path.display(), "entry written"),
            Err(error) => warn!(error = %error, "cannot write entry"),
        }
    }

    /// Writes one bibliography per status group. Failures are logged only.
    pub async fn write_groups(&self, groups: &[(Status, Vec<BibRecord>)]) {
        for (status, records) in groups {
            let path = self.group_path(*status);
            match bibtex::write_file(&path, records).await {
                Ok(()) => info!(
                    status = %status,
                    entries = records.len(),
                    path = %path.display(),
                    "bibliography written"
                ),
                Err(error) => warn!(status = %status, error = %error, "cannot write bibliography"),
            }
        }
    }
}
