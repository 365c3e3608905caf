// ABOUTME: The main Client struct that fetches wiki pages and image bytes.
// ABOUTME: Provides async fetch_page(), fetch_pages() and fetch_bytes() on top of a shared reqwest client.

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use tracing::debug;

use crate::error::{FetchError, OP_FETCH_IMAGE, OP_FETCH_PAGE};
use crate::options::{ClientBuilder, Options};
use crate::resource::{fetch, FetchOptions};

/// HTTP client for source pages and images. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Client {
    opts: Options,
    http_client: reqwest::Client,
}

impl Client {
    /// Create a new ClientBuilder for configuring the client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new Client with the given options.
    pub fn new(opts: Options) -> Result<Self, FetchError> {
        let http_client = match opts.http_client.clone() {
            Some(client) => client,
            None => reqwest::Client::builder()
                .user_agent(&opts.user_agent)
                .timeout(opts.timeout)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .map_err(|e| {
                    FetchError::fetch(
                        "",
                        "BuildClient",
                        Some(anyhow::anyhow!("failed to build HTTP client: {}", e)),
                    )
                })?,
        };

        Ok(Self { opts, http_client })
    }

    fn fetch_options(&self, op: &'static str) -> FetchOptions {
        FetchOptions {
            headers: self.opts.headers.clone(),
            max_body_bytes: self.opts.max_body_bytes,
            op,
        }
    }

    /// Fetch a source page and decode it to text.
    pub async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let result = fetch(&self.http_client, url, &self.fetch_options(OP_FETCH_PAGE)).await?;
        debug!(
            url = %result.url,
            final_url = %result.final_url,
            status = result.status,
            bytes = result.body.len(),
            "fetched page"
        );
        Ok(result.text_utf8(None))
    }

    /// Fetch several pages with at most `concurrency` requests in flight.
    ///
    /// Results come back in the order of `urls`.
    pub async fn fetch_pages(
        &self,
        urls: &[String],
        concurrency: usize,
    ) -> Vec<Result<String, FetchError>> {
        stream::iter(urls)
            .map(|url| self.fetch_page(url))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    /// Fetch the raw bytes of an image.
    pub async fn fetch_bytes(&self, url: &str) -> Result<Bytes, FetchError> {
        let result = fetch(&self.http_client, url, &self.fetch_options(OP_FETCH_IMAGE)).await?;
        debug!(url = %result.url, status = result.status, bytes = result.body.len(), "fetched image");
        Ok(result.body)
    }
}
