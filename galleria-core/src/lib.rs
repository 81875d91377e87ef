//! galleria-core: catalog records, the page source seam, and the paginated selection controller

use serde::{Deserialize, Serialize};

pub mod controller;
pub mod pager;
pub mod selection;

#[cfg(feature = "mem-source")]
pub mod mem;

#[cfg(feature = "artic")]
pub mod artic;

pub use controller::{
    PageFetch, PageResponse, PageTicket, PaginatedSelectionController, Resolution, RowView,
    ViewState,
};
#[cfg(feature = "mem-source")]
pub use mem::MemPageSource;
pub use selection::SelectionState;

pub type RecordId = u64;

/// Rows per page used by the catalog API when no limit is given.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// One catalog entry. Only `id` carries meaning for selection; everything
/// else is display payload passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub place_of_origin: Option<String>,
    #[serde(default)]
    pub artist_display: Option<String>,
    #[serde(default)]
    pub inscriptions: Option<String>,
    #[serde(default)]
    pub date_start: Option<i64>,
    #[serde(default)]
    pub date_end: Option<i64>,
}

impl Record {
    pub fn new<S: Into<String>>(id: RecordId, title: S) -> Self {
        Self {
            id,
            title: Some(title.into()),
            place_of_origin: None,
            artist_display: None,
            inscriptions: None,
            date_start: None,
            date_end: None,
        }
    }
}

/// One fetched batch of records plus the size of the whole remote collection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Page {
    pub records: Vec<Record>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("server returned status {0}")]
    Status(u16),
    #[error("malformed page: {0}")]
    Malformed(String),
}

/// A remote paginated collection queried by 0-based page index.
///
/// `page_size` is the single source of truth for rows per page: the
/// controller reads it from here for its offset math, so the two sides
/// cannot drift apart.
#[async_trait::async_trait]
pub trait PageSource: Send + Sync {
    fn page_size(&self) -> usize;
    async fn fetch(&self, page_index: usize) -> Result<Page, FetchError>;
}
