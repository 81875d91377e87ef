//! Page source for the Art Institute of Chicago public API.
//!
//! The API numbers pages from 1 while the controller counts from 0, so
//! `fetch(i)` requests `page=i+1`. Only the fields the table shows are
//! requested to keep responses small.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::{FetchError, Page, PageSource, Record, DEFAULT_PAGE_SIZE};

pub const DEFAULT_BASE_URL: &str = "https://api.artic.edu/api/v1";
pub const DEFAULT_USER_AGENT: &str = concat!("galleria/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Largest `limit` the API accepts.
pub const MAX_PAGE_SIZE: usize = 100;

const FIELDS: &str = "id,title,place_of_origin,artist_display,inscriptions,date_start,date_end";

#[derive(Debug, Clone)]
pub struct ArticConfig {
    pub base_url: String,
    pub page_size: usize,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ArticConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

pub struct ArticSource {
    client: reqwest::Client,
    base_url: String,
    page_size: usize,
    user_agent: String,
}

impl ArticSource {
    pub fn new(config: ArticConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size.clamp(1, MAX_PAGE_SIZE),
            user_agent: config.user_agent,
        })
    }

    /// The API numbers pages from 1; an index with no 1-based successor is
    /// rejected instead of wrapping.
    pub fn page_url(&self, page_index: usize) -> Result<String, FetchError> {
        let page = page_index.checked_add(1).ok_or_else(|| {
            FetchError::Malformed(format!("page index {} out of range", page_index))
        })?;
        Ok(format!(
            "{}/artworks?page={}&limit={}&fields={}",
            self.base_url, page, self.page_size, FIELDS
        ))
    }
}

#[derive(Deserialize)]
struct ArtworksResponse {
    data: Vec<Record>,
    pagination: Pagination,
}

#[derive(Deserialize)]
struct Pagination {
    total: usize,
}

/// Decode an `/artworks` response body.
pub fn decode_page(body: &[u8]) -> Result<Page, FetchError> {
    let resp: ArtworksResponse =
        serde_json::from_slice(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    Ok(Page {
        records: resp.data,
        total: resp.pagination.total,
    })
}

#[async_trait::async_trait]
impl PageSource for ArticSource {
    fn page_size(&self) -> usize {
        self.page_size
    }

    async fn fetch(&self, page_index: usize) -> Result<Page, FetchError> {
        let url = self.page_url(page_index)?;
        debug!(%url, "requesting artworks page");
        let response = self
            .client
            .get(&url)
            // The API asks clients to identify themselves with this header.
            .header("AIC-User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        decode_page(&body)
    }
}
