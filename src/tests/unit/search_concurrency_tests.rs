//! Search Controller Concurrency Tests
//!
//! Every test pins backend calls in flight with `GatedSearchBackend` and
//! releases them deliberately, covering:
//! - at most one in-flight fetch per controller
//! - visibility events collapsing into no-ops while loading
//! - "latest filter wins": responses (and failures) from an abandoned
//!   filter state never surface

use crate::core::search::controller::{FetchOutcome, LoadStatus, SearchController};
use crate::core::search::filters::SearchFilters;
use crate::core::search::trigger::{ScrollTrigger, TriggerOutcome};
use crate::tests::common::fixtures::dataset_page;
use crate::tests::mocks::GatedSearchBackend;
use crate::core::api;

fn controller_with(backend: GatedSearchBackend) -> SearchController<GatedSearchBackend> {
    SearchController::with_filters(backend, SearchFilters::with_limit(2))
}

#[tokio::test]
async fn test_duplicate_visibility_events_fetch_once() {
    let backend = GatedSearchBackend::scripted(vec![Ok(dataset_page(&[1, 2], 4, 1, 2))]);
    let controller = controller_with(backend.clone());
    let trigger = ScrollTrigger::new(controller.clone());

    let first = tokio::spawn({
        let trigger = trigger.clone();
        async move { trigger.on_visible().await }
    });
    backend.wait_for_calls(1).await;

    // The sentinel fires again while the fetch is in flight.
    assert_eq!(
        trigger.on_visible().await,
        TriggerOutcome::Triggered(FetchOutcome::AlreadyLoading)
    );
    assert_eq!(
        trigger.on_visible().await,
        TriggerOutcome::Triggered(FetchOutcome::AlreadyLoading)
    );

    backend.release(1);
    assert_eq!(
        first.await.unwrap(),
        TriggerOutcome::Triggered(FetchOutcome::Fetched(2))
    );
    assert_eq!(backend.started(), 1, "one page, one request");
}

#[tokio::test]
async fn test_latest_filter_wins_when_old_response_arrives_last() {
    let backend = GatedSearchBackend::scripted(vec![
        // Call 1: the unfiltered query, soon abandoned.
        Ok(dataset_page(&[1, 2], 4, 1, 2)),
        // Call 2: the "ice" query issued by the filter change.
        Ok(dataset_page(&[7], 1, 1, 2)),
    ]);
    let controller = controller_with(backend.clone());

    let stale_fetch = tokio::spawn({
        let controller = controller.clone();
        async move { controller.fetch_next_page().await }
    });
    backend.wait_for_calls(1).await;

    let filter_change = tokio::spawn({
        let controller = controller.clone();
        async move { controller.set_search_term("ice").await }
    });
    backend.wait_for_calls(2).await;

    // The newer query answers first; the older response straggles in.
    backend.release(2);
    assert_eq!(filter_change.await.unwrap().unwrap(), FetchOutcome::Fetched(1));
    backend.release(1);
    assert_eq!(stale_fetch.await.unwrap().unwrap(), FetchOutcome::Stale);

    let snapshot = controller.snapshot().await;
    let ids: Vec<i64> = snapshot.datasets.iter().map(|d| d.dataset_id).collect();
    assert_eq!(ids, vec![7], "only the current filter state's results surface");
    assert_eq!(snapshot.total_count, 1);
    assert_eq!(snapshot.filters.search_term.as_deref(), Some("ice"));
    assert_eq!(snapshot.filters.page, 2);
    assert_eq!(backend.started(), 2);

    let seen = backend.seen_filters();
    assert_eq!(seen[0].search_term, None);
    assert_eq!(seen[1].search_term.as_deref(), Some("ice"));
    assert_eq!(seen[1].page, 1, "filter change restarts from page 1");
}

#[tokio::test]
async fn test_failure_of_abandoned_fetch_never_surfaces() {
    let backend = GatedSearchBackend::scripted(vec![
        Err(api::Error::api(500, "old query exploded".to_string())),
        Ok(dataset_page(&[7], 1, 1, 2)),
    ]);
    let controller = controller_with(backend.clone());

    let stale_fetch = tokio::spawn({
        let controller = controller.clone();
        async move { controller.fetch_next_page().await }
    });
    backend.wait_for_calls(1).await;

    let filter_change = tokio::spawn({
        let controller = controller.clone();
        async move { controller.set_search_term("ice").await }
    });
    backend.wait_for_calls(2).await;

    backend.release(2);
    filter_change.await.unwrap().unwrap();
    backend.release(1);

    // The old fetch failed, but its filter state is gone: the failure is
    // swallowed, not surfaced.
    assert_eq!(stale_fetch.await.unwrap().unwrap(), FetchOutcome::Stale);

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.status, LoadStatus::Loaded);
    assert_eq!(snapshot.last_error, None);
    assert_eq!(snapshot.datasets.len(), 1);
}

#[tokio::test]
async fn test_fetch_after_inflight_completion_resumes_cursor() {
    let backend = GatedSearchBackend::scripted(vec![
        Ok(dataset_page(&[1, 2], 5, 1, 2)),
        Ok(dataset_page(&[3, 4], 5, 2, 2)),
    ]);
    let controller = controller_with(backend.clone());

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.fetch_next_page().await }
    });
    backend.wait_for_calls(1).await;
    assert_eq!(
        controller.fetch_next_page().await.unwrap(),
        FetchOutcome::AlreadyLoading
    );
    backend.release(1);
    first.await.unwrap().unwrap();

    // Once the flag clears, the next call really fetches page 2.
    backend.release(2);
    assert_eq!(controller.fetch_next_page().await.unwrap(), FetchOutcome::Fetched(2));

    let seen = backend.seen_filters();
    assert_eq!(seen.iter().map(|f| f.page).collect::<Vec<_>>(), vec![1, 2]);
}
