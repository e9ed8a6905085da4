//! Paginated dataset search controller.
//!
//! [`SearchController`] owns the filter state and the accumulated result
//! list for one search session. Pages are appended as they arrive and
//! deduplicated by dataset id; any filter change clears the accumulation,
//! resets the cursor to page 1, and starts a fresh query.
//!
//! Stale responses are suppressed with a generation counter: every filter
//! change bumps the generation, and a fetch only applies its response if
//! the generation it started under is still current. A fetch that loses
//! the race is discarded wholesale, so results from an abandoned filter
//! state never surface.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use indexmap::IndexMap;
use tokio::sync::Mutex;

use crate::core::api;
use crate::core::api::models::{DatasetListResponse, DatasetSummary};
use crate::core::search::filters::{SearchFilters, SortBy};

// ============================================================================
// Backend Seam
// ============================================================================

/// Search capability the controller drives.
///
/// Production code plugs in [`ApiClient`](crate::core::api::ApiClient);
/// tests substitute mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search_datasets(&self, filters: &SearchFilters)
        -> api::Result<DatasetListResponse>;
}

// ============================================================================
// Observable State
// ============================================================================

/// Where the controller is in its load lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// No fetch has completed for the current filter state.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// At least one page has loaded.
    Loaded,
    /// The most recent fetch failed.
    Failed,
}

/// What a fetch attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page arrived; this many datasets were new to the list.
    Fetched(usize),
    /// The filter change was a no-op; nothing was fetched.
    Unchanged,
    /// A fetch was already in flight; this call did nothing.
    AlreadyLoading,
    /// The backend reported no further pages.
    Exhausted,
    /// The response arrived after a filter change and was discarded.
    Stale,
}

/// Point-in-time copy of the controller's observable state.
#[derive(Debug, Clone)]
pub struct SearchSnapshot {
    /// Accumulated datasets in arrival order, deduplicated by id.
    pub datasets: Vec<DatasetSummary>,
    /// Total matches reported by the backend for the current filters.
    pub total_count: u64,
    /// Whether further pages exist.
    pub has_next: bool,
    pub status: LoadStatus,
    /// Message from the most recent failed fetch, if any.
    pub last_error: Option<String>,
    /// Current filter state. `filters.page` is the next page to fetch.
    pub filters: SearchFilters,
}

struct ControllerState {
    filters: SearchFilters,
    /// Bumped on every filter change; in-flight fetches compare against it.
    generation: u64,
    results: IndexMap<i64, DatasetSummary>,
    total_count: u64,
    has_next: bool,
    loading: bool,
    status: LoadStatus,
    last_error: Option<String>,
}

// ============================================================================
// Controller
// ============================================================================

/// Async controller for an incrementally loaded dataset search.
///
/// Cheap to clone; clones share state, so a UI can hand one clone to a
/// visibility trigger and keep another for filter edits.
pub struct SearchController<B: SearchBackend> {
    backend: Arc<B>,
    state: Arc<Mutex<ControllerState>>,
}

impl<B: SearchBackend> Clone for SearchController<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            state: Arc::clone(&self.state),
        }
    }
}

impl<B: SearchBackend> SearchController<B> {
    /// Create a controller with default filters.
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self::with_filters(backend, SearchFilters::default())
    }

    /// Create a controller with an initial filter state.
    ///
    /// The page size in `filters` is fixed for the controller's lifetime;
    /// the cursor always starts at page 1.
    #[must_use]
    pub fn with_filters(backend: B, mut filters: SearchFilters) -> Self {
        filters.normalize();
        filters.page = 1;
        Self {
            backend: Arc::new(backend),
            state: Arc::new(Mutex::new(ControllerState {
                filters,
                generation: 0,
                results: IndexMap::new(),
                total_count: 0,
                has_next: true,
                loading: false,
                status: LoadStatus::Idle,
                last_error: None,
            })),
        }
    }

    // ========================================================================
    // Fetching
    // ========================================================================

    /// Fetch the next page for the current filter state.
    ///
    /// At most one fetch is in flight per controller; concurrent calls
    /// return [`FetchOutcome::AlreadyLoading`]. When the backend has
    /// reported the final page, calls return [`FetchOutcome::Exhausted`]
    /// without touching the network. The page cursor only advances when a
    /// page applies; a failed fetch leaves the list and cursor unchanged.
    pub async fn fetch_next_page(&self) -> api::Result<FetchOutcome> {
        let (generation, filters) = {
            let mut state = self.state.lock().await;
            if state.loading {
                log::debug!("Fetch already in flight - ignoring");
                return Ok(FetchOutcome::AlreadyLoading);
            }
            if !state.has_next {
                log::debug!("All pages loaded - nothing to fetch");
                return Ok(FetchOutcome::Exhausted);
            }
            state.loading = true;
            state.status = LoadStatus::Loading;
            (state.generation, state.filters.clone())
        };

        let result = self.backend.search_datasets(&filters).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            // A filter change superseded this fetch. The change reset the
            // loading flag, so it is no longer ours to clear.
            log::debug!(
                "Discarding stale response for page {} (filters changed mid-flight)",
                filters.page
            );
            return Ok(FetchOutcome::Stale);
        }
        state.loading = false;

        match result {
            Ok(page) => {
                let before = state.results.len();
                for dataset in page.datasets {
                    state.results.insert(dataset.dataset_id, dataset);
                }
                let added = state.results.len() - before;
                state.total_count = page.total_count;
                state.has_next = page.has_next;
                state.filters.page = filters.page + 1;
                state.status = LoadStatus::Loaded;
                state.last_error = None;
                log::debug!(
                    "Applied page {}: {added} new, {} loaded of {} total",
                    filters.page,
                    state.results.len(),
                    state.total_count
                );
                Ok(FetchOutcome::Fetched(added))
            }
            Err(e) => {
                state.status = LoadStatus::Failed;
                state.last_error = Some(e.to_string());
                log::warn!("Fetch for page {} failed: {e}", filters.page);
                Err(e)
            }
        }
    }

    /// Re-run the current query from page 1, discarding accumulated
    /// results.
    pub async fn refresh(&self) -> api::Result<FetchOutcome> {
        {
            let mut state = self.state.lock().await;
            state.filters.page = 1;
            state.generation = state.generation.wrapping_add(1);
            state.results.clear();
            state.total_count = 0;
            state.has_next = true;
            state.loading = false;
            state.status = LoadStatus::Idle;
            state.last_error = None;
            log::debug!("Refreshing search: {}", state.filters.describe());
        }
        self.fetch_next_page().await
    }

    // ========================================================================
    // Filter Mutation
    // ========================================================================
    //
    // Every mutation funnels through `apply_change`: normalize, detect
    // no-ops, then reset the accumulation and start a fresh query under a
    // new generation.

    /// Set the free-text search term. A blank term clears it.
    pub async fn set_search_term(&self, term: &str) -> api::Result<FetchOutcome> {
        let term = term.to_string();
        self.apply_change("search term", move |f| {
            f.search_term = Some(term);
        })
        .await
    }

    /// Add a tag to the filter set.
    pub async fn add_tag(&self, tag: &str) -> api::Result<FetchOutcome> {
        let tag = tag.to_string();
        self.apply_change("add tag", move |f| {
            f.tags.insert(tag);
        })
        .await
    }

    /// Remove a tag from the filter set. Removing an absent tag is a
    /// no-op.
    pub async fn remove_tag(&self, tag: &str) -> api::Result<FetchOutcome> {
        let tag = tag.trim().to_lowercase();
        self.apply_change("remove tag", move |f| {
            f.tags.shift_remove(&tag);
        })
        .await
    }

    /// Drop all tag filters.
    pub async fn clear_tags(&self) -> api::Result<FetchOutcome> {
        self.apply_change("clear tags", |f| {
            f.tags.clear();
        })
        .await
    }

    /// Set the upload-date range. `None` bounds are open.
    pub async fn set_date_range(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> api::Result<FetchOutcome> {
        self.apply_change("date range", move |f| {
            f.date_from = from;
            f.date_to = to;
        })
        .await
    }

    /// Set the result ordering.
    pub async fn set_sort(&self, sort_by: SortBy) -> api::Result<FetchOutcome> {
        self.apply_change("sort order", move |f| {
            f.sort_by = sort_by;
        })
        .await
    }

    /// Clear every filter back to defaults, keeping the page size.
    pub async fn clear_filters(&self) -> api::Result<FetchOutcome> {
        self.apply_change("clear filters", |f| {
            *f = SearchFilters::with_limit(f.limit);
        })
        .await
    }

    async fn apply_change<F>(&self, label: &str, mutate: F) -> api::Result<FetchOutcome>
    where
        F: FnOnce(&mut SearchFilters),
    {
        {
            let mut state = self.state.lock().await;
            let mut next = state.filters.clone();
            mutate(&mut next);
            next.normalize();
            // The page size is fixed per controller, and the cursor is
            // pinned for the comparison below.
            next.limit = state.filters.limit;
            next.page = state.filters.page;

            if next == state.filters {
                log::debug!("Filter change ({label}) is a no-op");
                return Ok(FetchOutcome::Unchanged);
            }

            next.page = 1;
            log::info!("Filter change ({label}): {}", next.describe());
            state.filters = next;
            state.generation = state.generation.wrapping_add(1);
            state.results.clear();
            state.total_count = 0;
            state.has_next = true;
            state.loading = false;
            state.status = LoadStatus::Idle;
            state.last_error = None;
        }
        self.fetch_next_page().await
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Copy of the current observable state.
    pub async fn snapshot(&self) -> SearchSnapshot {
        let state = self.state.lock().await;
        SearchSnapshot {
            datasets: state.results.values().cloned().collect(),
            total_count: state.total_count,
            has_next: state.has_next,
            status: state.status,
            last_error: state.last_error.clone(),
            filters: state.filters.clone(),
        }
    }

    /// Current load status.
    pub async fn status(&self) -> LoadStatus {
        self.state.lock().await.status
    }
}
