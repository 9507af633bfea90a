//! Scripted in-memory fetcher for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use url::Url;

use super::{Document, FetchError, Page, PageFetcher, Resource};

pub(crate) const PDF_BYTES: &[u8] = b"%PDF-1.4\n%stub\n";

#[derive(Debug, Clone)]
pub(crate) enum StubResponse {
    Document(String),
    Resource,
    /// Resource whose body fails after the first chunk.
    BrokenResource,
    Status(u16),
    Network,
}

/// Answers each URL from a queue of scripted responses. The last response
/// of a queue repeats; unknown URLs answer 404.
pub(crate) struct StubFetcher {
    name: &'static str,
    responses: Mutex<HashMap<String, VecDeque<StubResponse>>>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub(crate) fn new() -> Self {
        Self::named("stub")
    }

    pub(crate) fn named(name: &'static str) -> Self {
        Self {
            name,
            responses: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn respond(self, url: &str, response: StubResponse) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back(response);
        self
    }

    pub(crate) fn document(self, url: &str, html: &str) -> Self {
        self.respond(url, StubResponse::Document(html.to_string()))
    }

    pub(crate) fn resource(self, url: &str) -> Self {
        self.respond(url, StubResponse::Resource)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = {
            let mut responses = self.responses.lock().unwrap();
            match responses.get_mut(url) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match response {
            Some(StubResponse::Document(html)) => {
                let parsed = Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;
                Ok(Page::Document(Document::new(parsed, html)))
            }
            Some(StubResponse::Resource) => Ok(Page::Resource(Resource::from_chunks(
                url,
                vec![Ok(PDF_BYTES.to_vec())],
            ))),
            Some(StubResponse::BrokenResource) => Ok(Page::Resource(Resource::from_chunks(
                url,
                vec![
                    Ok(PDF_BYTES[..4].to_vec()),
                    Err(std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        "connection reset",
                    )),
                ],
            ))),
            Some(StubResponse::Status(status)) => Err(FetchError::failing_status(url, status)),
            Some(StubResponse::Network) => Err(FetchError::network(
                url,
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
            )),
            None => Err(FetchError::failing_status(url, 404)),
        }
    }
}
