//! Pure pager math shared by the controller's derived view state.

/// Number of page links shown around the current page.
pub const PAGE_LINK_COUNT: usize = 5;

pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

/// 0-based offset of the first record on `page_index`.
pub fn first_record_offset(page_index: usize, page_size: usize) -> usize {
    page_index.saturating_mul(page_size)
}

/// Exclusive end offset of the records on the page, capped at `total`.
pub fn last_record_offset(first: usize, records_on_page: usize, total: usize) -> usize {
    first.saturating_add(records_on_page).min(total)
}

/// A window of at most `link_count` page indices around `current`,
/// shifted so it never runs past either end.
pub fn page_links(current: usize, page_count: usize, link_count: usize) -> Vec<usize> {
    if page_count == 0 || link_count == 0 {
        return Vec::new();
    }
    let visible = link_count.min(page_count);
    let start = current.saturating_sub(visible / 2).min(page_count - visible);
    (start..start + visible).collect()
}

/// "Showing X to Y of Z entries", with X 1-based.
pub fn report(first: usize, last: usize, total: usize) -> String {
    if last <= first {
        return format!("Showing 0 to 0 of {} entries", total);
    }
    format!("Showing {} to {} of {} entries", first + 1, last, total)
}
