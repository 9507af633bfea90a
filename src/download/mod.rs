//! Downloading a discovered PDF link.
//!
//! [`fetch_pdf`] makes up to [`RetryPolicy::max_attempts`] attempts and
//! classifies the outcome as a terminal [`Status`]:
//!
//! - the link answers with a document page: `INVALID_LINK`, no retry
//! - a failing HTTP status: `FAILING_STATUS_CODE`, retried after the
//!   cool-down while attempts remain
//! - a transport failure, or a body read failure: `INPUT_STREAM_ERROR`
//! - the output file cannot be written: `OUTPUT_STREAM_ERROR`
//! - the body was written: `SUCCESS`

mod cool_down;
mod error;
mod retry;
mod stream;

use std::path::Path;

use tracing::{info, instrument, warn};

use crate::page::{Page, PageFetcher};
use crate::status::Status;

pub use cool_down::{CoolDown, InterruptOutcome, InterruptibleSleep, Interrupts};
pub use error::StreamError;
pub use retry::{DEFAULT_COOL_DOWN, DEFAULT_MAX_ATTEMPTS, RetryDecision, RetryPolicy};
pub use stream::save_resource;

/// Downloads `url` into `target` and returns the terminal status.
#[instrument(skip(fetcher, target, policy, cool_down), fields(path = %target.display()))]
pub async fn fetch_pdf(
    fetcher: &dyn PageFetcher,
    url: &str,
    target: &Path,
    policy: &RetryPolicy,
    cool_down: &dyn CoolDown,
) -> Status {
    let mut attempt = 1;
    loop {
        if attempt > 1 {
            cool_down.wait(policy.cool_down()).await;
        }
        let status = attempt_download(fetcher, url, target).await;
        match policy.decide(status, attempt) {
            RetryDecision::Retry { next_attempt } => {
                info!(
                    attempt,
                    max_attempts = policy.max_attempts(),
                    cool_down_secs = policy.cool_down().as_secs(),
                    "download failed; retrying after cool-down"
                );
                attempt = next_attempt;
            }
            RetryDecision::Stop => break status,
        }
    }
}

async fn attempt_download(fetcher: &dyn PageFetcher, url: &str, target: &Path) -> Status {
    match fetcher.fetch(url).await {
        Ok(Page::Document(document)) => {
            info!(served = document.url().as_str(), "link leads to a document page");
            Status::InvalidLink
        }
        Ok(Page::Resource(resource)) => match save_resource(resource, target).await {
            Ok(bytes) => {
                info!(bytes, "downloaded");
                Status::Success
            }
            Err(error) => {
                warn!(error = %error, "download interrupted");
                error.status()
            }
        },
        Err(error) if error.is_failing_status() => {
            warn!(error = %error, "failing status code");
            Status::FailingStatusCode
        }
        Err(error) => {
            warn!(error = %error, "download failed");
            Status::InputStreamError
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use tempfile::TempDir;

    use super::*;
    use crate::page::testing::{PDF_BYTES, StubFetcher, StubResponse};

    const PDF_URL: &str = "https://example.org/paper.pdf";

    #[derive(Default)]
    struct RecordingCoolDown {
        waits: Mutex<Vec<Duration>>,
    }

    impl RecordingCoolDown {
        fn count(&self) -> usize {
            self.waits.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CoolDown for RecordingCoolDown {
        async fn wait(&self, duration: Duration) {
            self.waits.lock().unwrap().push(duration);
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_two_failures_then_success() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("1.pdf");
        let fetcher = StubFetcher::new()
            .respond(PDF_URL, StubResponse::Status(503))
            .respond(PDF_URL, StubResponse::Status(503))
            .resource(PDF_URL);
        let cool_down = RecordingCoolDown::default();

        let status = fetch_pdf(&fetcher, PDF_URL, &target, &policy(), &cool_down).await;

        assert_eq!(status, Status::Success);
        assert_eq!(fetcher.calls(), 3);
        assert_eq!(cool_down.count(), 2);
        assert!(cool_down.waits.lock().unwrap().iter().all(|d| *d == Duration::from_secs(5)));
        assert_eq!(std::fs::read(&target).unwrap(), PDF_BYTES);
    }

    #[tokio::test]
    async fn test_interrupted_cool_down_moves_on_to_next_attempt() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("1.pdf");
        let fetcher = StubFetcher::new()
            .respond(PDF_URL, StubResponse::Status(503))
            .resource(PDF_URL);
        let interrupts = Arc::new(Interrupts::new());
        let cool_down = InterruptibleSleep::new(Arc::clone(&interrupts));
        let long_wait = RetryPolicy::new(2, Duration::from_secs(600));
        let interrupter = {
            let interrupts = Arc::clone(&interrupts);
            tokio::spawn(async move {
                while !interrupts.is_cooling() {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
                interrupts.interrupt()
            })
        };

        let start = tokio::time::Instant::now();
        let status = fetch_pdf(&fetcher, PDF_URL, &target, &long_wait, &cool_down).await;

        assert!(start.elapsed() < Duration::from_secs(10));
        assert_eq!(interrupter.await.unwrap(), InterruptOutcome::WokeCoolDown);
        assert_eq!(status, Status::Success);
        assert_eq!(fetcher.calls(), 2);
        assert!(!interrupts.is_aborted());
        assert_eq!(std::fs::read(&target).unwrap(), PDF_BYTES);
    }

    #[tokio::test]
    async fn test_persistent_failing_status_exhausts_attempts() {
        let dir = TempDir::new().unwrap();
        let fetcher = StubFetcher::new().respond(PDF_URL, StubResponse::Status(500));
        let cool_down = RecordingCoolDown::default();

        let status = fetch_pdf(
            &fetcher,
            PDF_URL,
            &dir.path().join("1.pdf"),
            &policy(),
            &cool_down,
        )
        .await;

        assert_eq!(status, Status::FailingStatusCode);
        assert_eq!(fetcher.calls(), 3);
        assert_eq!(cool_down.count(), 2);
    }

    #[tokio::test]
    async fn test_document_page_is_invalid_link_without_retry() {
        let dir = TempDir::new().unwrap();
        let fetcher = StubFetcher::new().document(PDF_URL, "<h1>Sign in</h1>");
        let cool_down = RecordingCoolDown::default();

        let status = fetch_pdf(
            &fetcher,
            PDF_URL,
            &dir.path().join("1.pdf"),
            &policy(),
            &cool_down,
        )
        .await;

        assert_eq!(status, Status::InvalidLink);
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(cool_down.count(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_is_input_stream_error() {
        let dir = TempDir::new().unwrap();
        let fetcher = StubFetcher::new().respond(PDF_URL, StubResponse::Network);
        let cool_down = RecordingCoolDown::default();

        let status = fetch_pdf(
            &fetcher,
            PDF_URL,
            &dir.path().join("1.pdf"),
            &policy(),
            &cool_down,
        )
        .await;

        assert_eq!(status, Status::InputStreamError);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_broken_body_is_input_stream_error_and_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("1.pdf");
        let fetcher = StubFetcher::new().respond(PDF_URL, StubResponse::BrokenResource);
        let cool_down = RecordingCoolDown::default();

        let status = fetch_pdf(&fetcher, PDF_URL, &target, &policy(), &cool_down).await;

        assert_eq!(status, Status::InputStreamError);
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_unwritable_target_is_output_stream_error() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("no-such-dir").join("1.pdf");
        let fetcher = StubFetcher::new().resource(PDF_URL);
        let cool_down = RecordingCoolDown::default();

        let status = fetch_pdf(&fetcher, PDF_URL, &target, &policy(), &cool_down).await;

        assert_eq!(status, Status::OutputStreamError);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_single_attempt_budget_never_cools_down() {
        let dir = TempDir::new().unwrap();
        let fetcher = StubFetcher::new().respond(PDF_URL, StubResponse::Status(429));
        let cool_down = RecordingCoolDown::default();

        let status = fetch_pdf(
            &fetcher,
            PDF_URL,
            &dir.path().join("1.pdf"),
            &RetryPolicy::new(1, Duration::from_secs(5)),
            &cool_down,
        )
        .await;

        assert_eq!(status, Status::FailingStatusCode);
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(cool_down.count(), 0);
    }
}
