use std::sync::Arc;

use assert_matches::assert_matches;
use galleria_core::{
    MemPageSource, Page, PageResponse, PaginatedSelectionController, Record, Resolution,
};
use proptest::prelude::*;

const PAGE_SIZE: usize = 12;
const TOTAL: u64 = 100;

fn catalog() -> Vec<Record> {
    (1..=TOTAL).map(|i| Record::new(i, format!("work {i}"))).collect()
}

fn page_for(index: usize) -> Page {
    let all = catalog();
    let start = (index * PAGE_SIZE).min(all.len());
    let end = (start + PAGE_SIZE).min(all.len());
    Page {
        records: all[start..end].to_vec(),
        total: all.len(),
    }
}

fn controller() -> PaginatedSelectionController {
    PaginatedSelectionController::new(Arc::new(MemPageSource::new(catalog(), PAGE_SIZE)))
}

fn issued_pages_and_arrival_order() -> impl Strategy<Value = (Vec<usize>, Vec<usize>)> {
    prop::collection::vec(0usize..9, 1..8).prop_flat_map(|pages| {
        let order: Vec<usize> = (0..pages.len()).collect();
        (Just(pages), Just(order).prop_shuffle())
    })
}

proptest! {
    #[test]
    fn only_the_last_issued_page_is_applied((pages, order) in issued_pages_and_arrival_order()) {
        let mut c = controller();
        let tickets: Vec<_> = pages.iter().map(|&p| c.go_to_page(p).ticket()).collect();
        let last = tickets.len() - 1;

        let mut applied = 0;
        for &i in &order {
            let res = c.resolve(PageResponse::new(tickets[i], Ok(page_for(pages[i]))));
            if i == last {
                prop_assert_eq!(res, Resolution::Applied);
                applied += 1;
            } else {
                prop_assert_eq!(res, Resolution::Stale);
            }
        }

        prop_assert_eq!(applied, 1);
        prop_assert!(!c.is_loading());
        prop_assert_eq!(c.page_index(), pages[last]);
        let expected_page = page_for(pages[last]);
        prop_assert_eq!(c.records(), expected_page.records.as_slice());
        prop_assert_eq!(c.total(), TOTAL as usize);
    }
}

#[tokio::test]
async fn slow_earlier_fetch_cannot_overwrite_newer_page() {
    let mut c = controller();
    let first = c.go_to_page(1);
    let second = c.go_to_page(5);

    // The later request finishes first.
    let newer = tokio::spawn(second.run()).await.unwrap();
    let older = tokio::spawn(first.run()).await.unwrap();

    assert_eq!(c.resolve(newer), Resolution::Applied);
    assert_eq!(c.resolve(older), Resolution::Stale);
    assert_eq!(c.page_index(), 5);
    assert_eq!(c.records().first().map(|r| r.id), Some(61));
}

#[tokio::test]
async fn failure_of_superseded_request_is_not_surfaced() {
    let source = Arc::new(MemPageSource::new(catalog(), PAGE_SIZE));
    source.fail_page(3);
    let mut c = PaginatedSelectionController::new(source);

    let doomed = c.go_to_page(3);
    let good = c.go_to_page(4);
    let doomed = doomed.run().await;
    let good = good.run().await;

    assert_eq!(c.resolve(doomed), Resolution::Stale);
    assert!(c.last_failure().is_none());
    assert!(c.is_loading());
    assert_eq!(c.resolve(good), Resolution::Applied);
    assert_eq!(c.page_index(), 4);
}

#[tokio::test]
async fn failure_of_latest_request_clears_loading_only() {
    let source = Arc::new(MemPageSource::new(catalog(), PAGE_SIZE));
    let mut c = PaginatedSelectionController::new(source.clone());
    assert_eq!(c.load_page(2).await, Resolution::Applied);
    let before = c.records().to_vec();

    source.fail_page(3);
    assert_matches!(c.load_page(3).await, Resolution::Failed(_));

    assert_eq!(c.page_index(), 2);
    assert_eq!(c.records(), before.as_slice());
    assert_eq!(c.total(), TOTAL as usize);
    assert!(!c.is_loading());
    assert!(c.view().notice.is_some());

    // The next successful load clears the notice.
    source.heal_page(3);
    assert_eq!(c.load_page(3).await, Resolution::Applied);
    assert!(c.view().notice.is_none());
    assert_eq!(source.fetch_count(), 3);
}
