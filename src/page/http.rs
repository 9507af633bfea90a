//! reqwest-backed page fetcher.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::{Document, FetchError, Page, PageFetcher, Resource};
use crate::user_agent::Browser;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large files).
pub const READ_TIMEOUT_SECS: u64 = 300;

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Settings shared by the plain and the scripting fetcher.
#[derive(Debug, Clone)]
pub struct FetcherOptions {
    pub user_agent: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Rendering service returning the HTML of a page after its scripts ran.
    /// Called as `{endpoint}?url={page url}`.
    pub render_endpoint: Option<Url>,
}

impl Default for FetcherOptions {
    fn default() -> Self {
        Self {
            user_agent: Browser::default().user_agent(),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
            render_endpoint: None,
        }
    }
}

/// Fetches pages over HTTP, keeping its own cookie session.
///
/// Responses served as HTML become [`Page::Document`]; everything else is
/// streamed as a [`Page::Resource`]. 4xx/5xx responses are reported as
/// [`FetchError::FailingStatus`].
#[derive(Debug)]
pub struct HttpPageFetcher {
    client: Client,
    name: &'static str,
    render_endpoint: Option<Url>,
}

impl HttpPageFetcher {
    /// Fetcher that never executes page scripts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the HTTP client cannot be built.
    pub fn plain(options: &FetcherOptions) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(options)?,
            name: "plain",
            render_endpoint: None,
        })
    }

    /// Fetcher whose documents come from the render endpoint, if any.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the HTTP client cannot be built.
    pub fn scripting(options: &FetcherOptions) -> Result<Self, FetchError> {
        match &options.render_endpoint {
            Some(endpoint) => info!(endpoint = %endpoint, "scripting fetcher renders through endpoint"),
            None => info!("no render endpoint configured; scripting fetcher performs plain fetches"),
        }
        Ok(Self {
            client: build_client(options)?,
            name: "scripting",
            render_endpoint: options.render_endpoint.clone(),
        })
    }

    async fn render(&self, endpoint: &Url, page_url: &Url) -> Result<String, FetchError> {
        let mut render_url = endpoint.clone();
        render_url
            .query_pairs_mut()
            .append_pair("url", page_url.as_str());

        let response = self
            .client
            .get(render_url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(render_url.as_str(), e))?;
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(FetchError::failing_status(render_url.as_str(), status.as_u16()));
        }
        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(render_url.as_str(), e))
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    fn name(&self) -> &str {
        self.name
    }

    #[instrument(skip(self), fields(fetcher = self.name))]
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let parsed = Url::parse(url.trim()).map_err(|_| FetchError::invalid_url(url))?;

        let response = self
            .client
            .get(parsed)
            .header(ACCEPT, HTML_ACCEPT)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(FetchError::failing_status(url, status.as_u16()));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !is_document_type(content_type.as_deref()) {
            debug!(url = %final_url, content_type = ?content_type, "resource response");
            let body = response
                .bytes_stream()
                .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(std::io::Error::other))
                .boxed();
            return Ok(Page::Resource(Resource::new(
                final_url.as_str(),
                content_type,
                body,
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let html = match &self.render_endpoint {
            Some(endpoint) => match self.render(endpoint, &final_url).await {
                Ok(rendered) => rendered,
                Err(error) => {
                    warn!(url = %final_url, error = %error, "rendering failed; using unrendered page");
                    html
                }
            },
            None => html,
        };

        debug!(url = %final_url, bytes = html.len(), "document response");
        Ok(Page::Document(Document::new(final_url, html)))
    }
}

/// HTML and XHTML are documents; anything else (including a missing
/// content type) is a raw resource.
fn is_document_type(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|value| {
        let value = value.to_ascii_lowercase();
        value.contains("text/html") || value.contains("application/xhtml")
    })
}

fn build_client(options: &FetcherOptions) -> Result<Client, FetchError> {
    Client::builder()
        .connect_timeout(options.connect_timeout)
        .timeout(options.read_timeout)
        .gzip(true)
        .cookie_store(true)
        .user_agent(options.user_agent.clone())
        .build()
        .map_err(|source| FetchError::ClientBuild { source })
}
