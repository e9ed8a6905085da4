//! Property-based tests for result accumulation
//!
//! Tests invariants:
//! - Accumulated order equals backend order, for any page split
//! - Each page costs exactly one request
//! - Overlapping pages never produce duplicates

use std::collections::HashSet;

use proptest::prelude::*;

use crate::core::api::models::DatasetListResponse;
use crate::core::search::controller::{FetchOutcome, SearchController};
use crate::core::search::filters::SearchFilters;
use crate::tests::common::fixtures::{dataset, dataset_page};
use crate::tests::mocks::GatedSearchBackend;

// ============================================================================
// Strategies
// ============================================================================

/// Unique dataset ids in arbitrary order.
fn arb_unique_ids() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::vec(0i64..1000, 0..40).prop_map(|ids| {
        let mut seen = HashSet::new();
        ids.into_iter().filter(|id| seen.insert(*id)).collect()
    })
}

fn test_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("test runtime must build")
}

/// Drive the controller until the backend reports exhaustion, returning
/// the accumulated ids.
async fn drain(controller: &SearchController<GatedSearchBackend>) -> Vec<i64> {
    let mut fetches = 0usize;
    loop {
        let outcome = controller
            .fetch_next_page()
            .await
            .expect("scripted fetch cannot fail");
        if outcome == FetchOutcome::Exhausted {
            break;
        }
        fetches += 1;
        assert!(fetches < 60, "controller failed to reach exhaustion");
    }
    controller
        .snapshot()
        .await
        .datasets
        .iter()
        .map(|d| d.dataset_id)
        .collect()
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: for any page size, accumulating every page yields the
    /// backend's ids in backend order, with one request per page.
    #[test]
    fn prop_accumulation_preserves_backend_order(
        ids in arb_unique_ids(),
        limit in 1u32..6,
    ) {
        let total = ids.len() as u64;
        let chunks: Vec<&[i64]> = ids.chunks(limit as usize).collect();
        let mut responses = Vec::new();
        if chunks.is_empty() {
            responses.push(Ok(dataset_page(&[], 0, 1, limit)));
        } else {
            for (i, chunk) in chunks.iter().enumerate() {
                responses.push(Ok(dataset_page(chunk, total, (i + 1) as u32, limit)));
            }
        }
        let expected_calls = responses.len();

        let backend = GatedSearchBackend::scripted(responses);
        for call in 1..=expected_calls {
            backend.release(call);
        }
        let controller =
            SearchController::with_filters(backend.clone(), SearchFilters::with_limit(limit));

        let collected = test_runtime().block_on(drain(&controller));

        prop_assert_eq!(collected, ids);
        prop_assert_eq!(backend.started(), expected_calls);
    }

    /// Property: when consecutive pages overlap (a dataset inserted
    /// upstream shifts the window), the overlap never duplicates.
    #[test]
    fn prop_overlapping_pages_never_duplicate(
        ids in arb_unique_ids().prop_filter("need at least 2 ids", |v| v.len() >= 2),
    ) {
        let split = ids.len() / 2;
        let total = ids.len() as u64;
        let to_page = |slice: &[i64], page: u32, has_next: bool| DatasetListResponse {
            datasets: slice
                .iter()
                .map(|&id| dataset(id, &format!("dataset-{id}")))
                .collect(),
            total_count: total,
            page,
            limit: split as u32,
            has_next,
            has_prev: page > 1,
        };

        // Page 2 re-serves the last id of page 1.
        let backend = GatedSearchBackend::scripted(vec![
            Ok(to_page(&ids[..split], 1, true)),
            Ok(to_page(&ids[split - 1..], 2, false)),
        ]);
        backend.release(1);
        backend.release(2);
        let controller =
            SearchController::with_filters(backend.clone(), SearchFilters::with_limit(split as u32));

        let collected = test_runtime().block_on(drain(&controller));

        prop_assert_eq!(collected.len(), ids.len());
        prop_assert_eq!(collected, ids);
    }
}
