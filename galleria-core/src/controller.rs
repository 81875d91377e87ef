//! The paginated selection controller.
//!
//! Owns the resident page (`records`, `total`, `page_index`), the loading
//! flag and the selection. Page changes are split in two halves so callers
//! can keep handling input while a fetch is in flight:
//!
//! 1. [`PaginatedSelectionController::go_to_page`] marks the state loading and
//!    hands back a [`PageFetch`] stamped with a fresh [`PageTicket`].
//! 2. [`PaginatedSelectionController::resolve`] applies the finished
//!    [`PageResponse`] only if its ticket is still the latest one issued.
//!
//! Everything the presentation layer shows is derived on demand through
//! [`PaginatedSelectionController::view`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::pager;
use crate::selection::SelectionState;
use crate::{FetchError, Page, PageSource, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    seq: u64,
    index: usize,
}

impl PageTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

/// An issued page request that has not run yet.
pub struct PageFetch {
    ticket: PageTicket,
    source: Arc<dyn PageSource>,
}

impl PageFetch {
    pub fn ticket(&self) -> PageTicket {
        self.ticket
    }

    pub async fn run(self) -> PageResponse {
        let result = self.source.fetch(self.ticket.index).await;
        PageResponse::new(self.ticket, result)
    }
}

#[derive(Debug, Clone)]
pub struct PageResponse {
    pub ticket: PageTicket,
    pub result: Result<Page, FetchError>,
}

impl PageResponse {
    pub fn new(ticket: PageTicket, result: Result<Page, FetchError>) -> Self {
        Self { ticket, result }
    }
}

/// What [`PaginatedSelectionController::resolve`] did with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// Superseded by a newer request; nothing changed.
    Stale,
    /// The latest request failed; the previous page stays resident.
    Failed(FetchError),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub record: Record,
    pub selected: bool,
}

/// Snapshot handed to the presentation layer after every controller call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub page_index: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub total: usize,
    pub first: usize,
    pub last: usize,
    pub loading: bool,
    pub requested_page: Option<usize>,
    pub has_previous: bool,
    pub has_next: bool,
    pub page_links: Vec<usize>,
    pub selected_count: usize,
    pub notice: Option<String>,
    pub report: String,
    pub rows: Vec<RowView>,
}

pub struct PaginatedSelectionController {
    source: Arc<dyn PageSource>,
    page_size: usize,
    page_index: usize,
    records: Vec<Record>,
    total: usize,
    loading: bool,
    selection: SelectionState,
    latest_seq: u64,
    // ticket of the latest request while it is outstanding
    pending: Option<PageTicket>,
    last_failure: Option<FetchError>,
}

impl PaginatedSelectionController {
    pub fn new(source: Arc<dyn PageSource>) -> Self {
        let page_size = source.page_size().max(1);
        Self {
            source,
            page_size,
            page_index: 0,
            records: Vec::new(),
            total: 0,
            loading: false,
            selection: SelectionState::new(),
            latest_seq: 0,
            pending: None,
            last_failure: None,
        }
    }

    /// Issue a fetch for `index`, superseding any request still in flight.
    pub fn go_to_page(&mut self, index: usize) -> PageFetch {
        self.latest_seq += 1;
        let ticket = PageTicket {
            seq: self.latest_seq,
            index,
        };
        self.pending = Some(ticket);
        self.loading = true;
        debug!(page = index, seq = ticket.seq, "page fetch issued");
        PageFetch {
            ticket,
            source: Arc::clone(&self.source),
        }
    }

    pub fn resolve(&mut self, response: PageResponse) -> Resolution {
        let PageResponse { ticket, result } = response;
        if self.pending != Some(ticket) {
            debug!(
                page = ticket.index,
                seq = ticket.seq,
                latest = self.latest_seq,
                "stale page response discarded"
            );
            return Resolution::Stale;
        }
        self.pending = None;
        self.loading = false;
        match result.and_then(|page| self.check_page(page)) {
            Ok(page) => {
                debug!(
                    page = ticket.index,
                    records = page.records.len(),
                    total = page.total,
                    "page applied"
                );
                self.records = page.records;
                self.total = page.total;
                self.page_index = ticket.index;
                self.last_failure = None;
                Resolution::Applied
            }
            Err(err) => {
                warn!(page = ticket.index, error = %err, "page fetch failed");
                self.last_failure = Some(err.clone());
                Resolution::Failed(err)
            }
        }
    }

    /// Issue, await and resolve one page request.
    pub async fn load_page(&mut self, index: usize) -> Resolution {
        let fetch = self.go_to_page(index);
        let response = fetch.run().await;
        self.resolve(response)
    }

    fn check_page(&self, page: Page) -> Result<Page, FetchError> {
        if page.records.len() > self.page_size {
            return Err(FetchError::Malformed(format!(
                "{} records exceed page size {}",
                page.records.len(),
                self.page_size
            )));
        }
        Ok(page)
    }

    /// Replace the selection with the first `n` records of the resident page.
    ///
    /// `n <= 0` is ignored. Returns whether the selection was replaced.
    pub fn request_bulk_select(&mut self, n: i64) -> bool {
        let n = match usize::try_from(n) {
            Ok(n) if n > 0 => n,
            _ => return false,
        };
        let take = n.min(self.records.len());
        self.selection
            .replace_all(self.records[..take].iter().cloned());
        debug!(requested = n, selected = take, "bulk selection applied");
        true
    }

    /// Same as [`Self::request_bulk_select`] for raw text from an input box;
    /// anything that is not an integer is ignored.
    pub fn request_bulk_select_input(&mut self, raw: &str) -> bool {
        match raw.trim().parse::<i64>() {
            Ok(n) => self.request_bulk_select(n),
            Err(_) => false,
        }
    }

    /// Returns whether `record` is selected afterwards.
    pub fn toggle_row_selection(&mut self, record: &Record) -> bool {
        self.selection.toggle(record)
    }

    pub fn replace_selection<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = Record>,
    {
        self.selection.replace_all(records);
    }

    pub fn is_selected(&self, record: &Record) -> bool {
        self.selection.contains(record.id)
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Page index of the outstanding request, if any.
    pub fn pending_page(&self) -> Option<usize> {
        self.pending.map(|t| t.index)
    }

    pub fn last_failure(&self) -> Option<&FetchError> {
        self.last_failure.as_ref()
    }

    pub fn page_count(&self) -> usize {
        pager::page_count(self.total, self.page_size)
    }

    pub fn first_record_offset(&self) -> usize {
        pager::first_record_offset(self.page_index, self.page_size)
    }

    pub fn last_record_offset(&self) -> usize {
        pager::last_record_offset(self.first_record_offset(), self.records.len(), self.total)
    }

    pub fn view(&self) -> ViewState {
        let first = self.first_record_offset();
        let last = self.last_record_offset();
        let page_count = self.page_count();
        ViewState {
            page_index: self.page_index,
            page_size: self.page_size,
            page_count,
            total: self.total,
            first,
            last,
            loading: self.loading,
            requested_page: self.pending_page(),
            has_previous: self.page_index > 0,
            has_next: self.page_index.saturating_add(1) < page_count,
            page_links: pager::page_links(self.page_index, page_count, pager::PAGE_LINK_COUNT),
            selected_count: self.selection.len(),
            notice: self.last_failure.as_ref().map(|e| e.to_string()),
            report: pager::report(first, last, self.total),
            rows: self
                .records
                .iter()
                .map(|r| RowView {
                    record: r.clone(),
                    selected: self.is_selected(r),
                })
                .collect(),
        }
    }
}
