use std::time::Duration;

use futures_util::StreamExt;
use market_core::{Item, ItemId, Page, PageNumber};
use market_logging::market_debug;
use url::Url;

use crate::payload::{decode_item, decode_page};
use crate::{FailureKind, FetchError};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Performs one network call for one page. No retries.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, page: PageNumber) -> Result<Page, FetchError>;
}

/// Fetches product pages from the marketplace HTTP API.
#[derive(Debug, Clone)]
pub struct ReqwestPageFetcher {
    base_url: Url,
    items_per_page: u32,
    settings: FetchSettings,
    client: reqwest::Client,
}

impl ReqwestPageFetcher {
    pub fn new(
        base_url: Url,
        items_per_page: u32,
        settings: FetchSettings,
    ) -> Result<Self, FetchError> {
        if base_url.cannot_be_a_base() {
            return Err(FetchError::new(
                FailureKind::InvalidUrl,
                format!("{base_url} cannot be used as a base url"),
            ));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Transport, err.to_string()))?;

        Ok(Self {
            base_url,
            items_per_page,
            settings,
            client,
        })
    }

    /// `{base}/api/products?page_no={page}&items_per_page={n}`
    pub fn page_url(&self, page: PageNumber) -> Url {
        let mut url = self.products_url();
        url.query_pairs_mut()
            .append_pair("page_no", &page.to_string())
            .append_pair("items_per_page", &self.items_per_page.to_string());
        url
    }

    /// `{base}/api/products/{id}`
    pub fn item_url(&self, id: ItemId) -> Url {
        let mut url = self.products_url();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(&id.to_string());
        }
        url
    }

    /// Fetch the detail record of one product.
    pub async fn fetch_item(&self, id: ItemId) -> Result<Item, FetchError> {
        let bytes = self.get_bytes(self.item_url(id)).await?;
        decode_item(&bytes)
    }

    fn products_url(&self) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["api", "products"]);
        }
        url
    }

    async fn get_bytes(&self, url: Url) -> Result<Vec<u8>, FetchError> {
        market_debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::Server(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl PageFetcher for ReqwestPageFetcher {
    async fn fetch_page(&self, page: PageNumber) -> Result<Page, FetchError> {
        let bytes = self.get_bytes(self.page_url(page)).await?;
        decode_page(&bytes, page)
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return FetchError::new(FailureKind::Decode, err.to_string());
    }
    FetchError::new(FailureKind::Transport, err.to_string())
}
