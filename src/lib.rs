//! bibfetch core library
//!
//! Fetches the PDFs behind the entries of a BibTeX bibliography and sorts
//! every processed entry into a status bucket.
//!
//! # Architecture
//!
//! - [`bibtex`] - Reading and writing bibliographies
//! - [`range`] - Selecting a window of entries
//! - [`ident`] - File names for processed entries
//! - [`page`] - Fetching pages (plain and scripting fetchers)
//! - [`discovery`] - Finding the PDF link on a landing page
//! - [`download`] - Bounded-retry PDF download and classification
//! - [`results`] - Per-status aggregation
//! - [`scrape`] - The run loop tying it all together

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bibtex;
pub mod discovery;
pub mod download;
pub mod ident;
pub mod page;
pub mod range;
pub mod results;
pub mod scrape;
pub mod status;
pub mod user_agent;

// Re-export commonly used types
pub use bibtex::{BibField, BibRecord, StoreError};
pub use discovery::{DiscoveryContext, Source, SourceRegistry, Strategy, discover_with_retry};
pub use download::{
    CoolDown, InterruptOutcome, InterruptibleSleep, Interrupts, RetryDecision, RetryPolicy,
    fetch_pdf,
};
pub use ident::IdScheme;
pub use page::{FetchError, FetcherOptions, HttpPageFetcher, Page, PageFetcher};
pub use range::EntryRange;
pub use results::{Reconciliation, ResultSet};
pub use scrape::{OutputLayout, RunReport, ScrapeError, ScrapeSettings, Scraper};
pub use status::Status;
pub use user_agent::Browser;
