use std::sync::Arc;

use galleria_core::{MemPageSource, PaginatedSelectionController, Record, Resolution};

fn catalog(n: u64) -> Vec<Record> {
    (1..=n).map(|i| Record::new(i, format!("work {i}"))).collect()
}

async fn loaded(n: u64, page_size: usize, page: usize) -> PaginatedSelectionController {
    let source = Arc::new(MemPageSource::new(catalog(n), page_size));
    let mut c = PaginatedSelectionController::new(source);
    assert_eq!(c.load_page(page).await, Resolution::Applied);
    c
}

fn ids(c: &PaginatedSelectionController) -> Vec<u64> {
    c.selection().ids().collect()
}

#[tokio::test]
async fn select_first_three_of_five() {
    let mut c = loaded(5, 5, 0).await;
    assert!(c.request_bulk_select(3));
    assert_eq!(ids(&c), vec![1, 2, 3]);
}

#[tokio::test]
async fn select_more_than_the_page_takes_the_whole_page() {
    let mut c = loaded(100, 12, 0).await;
    assert!(c.request_bulk_select(50));
    assert_eq!(c.selection().len(), 12);
    assert_eq!(ids(&c), (1..=12).collect::<Vec<_>>());
}

#[tokio::test]
async fn non_positive_count_leaves_selection_alone() {
    let mut c = loaded(20, 5, 0).await;
    let third = c.records()[2].clone();
    c.toggle_row_selection(&third);
    assert!(!c.request_bulk_select(0));
    assert!(!c.request_bulk_select(-4));
    assert_eq!(ids(&c), vec![3]);
}

#[tokio::test]
async fn bulk_select_replaces_selection_from_other_pages() {
    let mut c = loaded(20, 5, 0).await;
    let a = c.records()[0].clone();
    c.toggle_row_selection(&a);
    assert_eq!(c.load_page(2).await, Resolution::Applied);

    // Still selected by id even though page 0 is no longer resident.
    assert!(c.is_selected(&a));
    assert!(c.request_bulk_select(2));
    assert_eq!(ids(&c), vec![11, 12]);
    assert!(!c.is_selected(&a));
}

#[tokio::test]
async fn toggle_round_trip() {
    let mut c = loaded(10, 5, 0).await;
    let a = c.records()[0].clone();
    assert!(c.toggle_row_selection(&a));
    assert!(c.is_selected(&a));
    assert!(!c.toggle_row_selection(&a));
    assert!(c.selection().is_empty());
}

#[tokio::test]
async fn selection_survives_paging_and_is_reported_per_row() {
    let mut c = loaded(30, 10, 0).await;
    let first_page: Vec<Record> = c.records()[..2].to_vec();
    c.replace_selection(first_page.clone());
    assert_eq!(c.load_page(1).await, Resolution::Applied);
    assert!(first_page.iter().all(|r| c.is_selected(r)));
    assert!(c.view().rows.iter().all(|row| !row.selected));
    assert_eq!(c.view().selected_count, 2);

    assert_eq!(c.load_page(0).await, Resolution::Applied);
    let marked: Vec<u64> = c
        .view()
        .rows
        .iter()
        .filter(|row| row.selected)
        .map(|row| row.record.id)
        .collect();
    assert_eq!(marked, vec![1, 2]);
}

#[tokio::test]
async fn replace_selection_with_nothing_clears() {
    let mut c = loaded(10, 5, 0).await;
    assert!(c.request_bulk_select(5));
    c.replace_selection(Vec::new());
    assert!(c.selection().is_empty());
}

#[tokio::test]
async fn offsets_for_twelve_per_page_of_one_hundred() {
    let mut c = loaded(100, 12, 0).await;
    assert_eq!(c.first_record_offset(), 0);
    assert_eq!(c.last_record_offset(), 12);
    assert_eq!(c.view().report, "Showing 1 to 12 of 100 entries");

    assert_eq!(c.load_page(8).await, Resolution::Applied);
    assert_eq!(
        c.records().iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![97, 98, 99, 100]
    );
    assert_eq!(c.first_record_offset(), 96);
    assert_eq!(c.last_record_offset(), 100);
    let view = c.view();
    assert!(!view.has_next);
    assert_eq!(view.page_links, vec![4, 5, 6, 7, 8]);
}

#[tokio::test]
async fn bulk_select_and_toggle_work_while_loading() {
    let mut c = loaded(30, 10, 0).await;
    let fetch = c.go_to_page(1);
    assert!(c.is_loading());

    assert!(c.request_bulk_select(3));
    assert_eq!(ids(&c), vec![1, 2, 3]);

    let response = fetch.run().await;
    assert_eq!(c.resolve(response), Resolution::Applied);
    assert_eq!(ids(&c), vec![1, 2, 3]);
    assert_eq!(c.page_index(), 1);
}

#[tokio::test]
async fn largest_page_index_loads_as_empty_page() {
    let mut c = loaded(10, 5, 0).await;
    assert_eq!(c.load_page(usize::MAX).await, Resolution::Applied);
    assert!(c.records().is_empty());
    let v = c.view();
    assert!(!v.has_next);
    assert_eq!(v.last, 10);
    assert_eq!(v.report, "Showing 0 to 0 of 10 entries");
}
