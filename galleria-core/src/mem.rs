//! In-memory page source backed by a fixed record list.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::{FetchError, Page, PageSource, Record};

pub struct MemPageSource {
    records: Vec<Record>,
    page_size: usize,
    failing: Mutex<HashSet<usize>>,
    fetches: AtomicUsize,
}

impl MemPageSource {
    pub fn new(records: Vec<Record>, page_size: usize) -> Self {
        Self {
            records,
            page_size: page_size.max(1),
            failing: Mutex::new(HashSet::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Build from a JSON array of records.
    pub fn from_json_slice(bytes: &[u8], page_size: usize) -> serde_json::Result<Self> {
        let records: Vec<Record> = serde_json::from_slice(bytes)?;
        Ok(Self::new(records, page_size))
    }

    /// Make every later fetch of `page_index` fail until [`Self::heal_page`].
    pub fn fail_page(&self, page_index: usize) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(page_index);
    }

    pub fn heal_page(&self, page_index: usize) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&page_index);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait::async_trait]
impl PageSource for MemPageSource {
    fn page_size(&self) -> usize {
        self.page_size
    }

    async fn fetch(&self, page_index: usize) -> Result<Page, FetchError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let failing = self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&page_index);
        if failing {
            return Err(FetchError::Transport(format!(
                "page {} unavailable",
                page_index
            )));
        }
        let len = self.records.len();
        let start = page_index.saturating_mul(self.page_size).min(len);
        let end = start.saturating_add(self.page_size).min(len);
        Ok(Page {
            records: self.records[start..end].to_vec(),
            total: len,
        })
    }
}
