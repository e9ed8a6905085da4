//! Property-based tests for search filter normalization
//!
//! Tests invariants:
//! - Normalization is idempotent
//! - Normalized values always satisfy the backend's constraints
//! - Query serialization emits one `tags` pair per tag and omits unset
//!   filters

use chrono::NaiveDate;
use proptest::prelude::*;

use crate::core::search::filters::{
    SearchFilters, SortBy, MAX_PAGE_SIZE, MAX_SEARCH_TERM_LEN, MAX_TAGS, MIN_PAGE_SIZE,
};

// ============================================================================
// Strategies for generating filter states
// ============================================================================

/// Arbitrary search terms: any characters, often over-long or blank.
fn arb_term() -> impl Strategy<Value = Option<String>> {
    proptest::option::of(".{0,150}")
}

/// Tag lists with mixed case, blanks, and duplicates.
fn arb_tags() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[A-Za-z ]{0,12}", 0..15)
}

fn arb_sort() -> impl Strategy<Value = SortBy> {
    prop_oneof![
        Just(SortBy::Newest),
        Just(SortBy::Oldest),
        Just(SortBy::Downloads),
        Just(SortBy::Name),
    ]
}

fn arb_date() -> impl Strategy<Value = Option<NaiveDate>> {
    proptest::option::of((1990i32..2030, 1u32..13, 1u32..29).prop_map(|(y, m, d)| {
        NaiveDate::from_ymd_opt(y, m, d).expect("day range keeps dates valid")
    }))
}

fn arb_filters() -> impl Strategy<Value = SearchFilters> {
    (
        arb_term(),
        arb_tags(),
        arb_date(),
        arb_date(),
        arb_sort(),
        0u32..10,
        0u32..300,
    )
        .prop_map(
            |(search_term, tags, date_from, date_to, sort_by, page, limit)| SearchFilters {
                search_term,
                tags: tags.into_iter().collect(),
                date_from,
                date_to,
                sort_by,
                page,
                limit,
            },
        )
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Property: normalizing twice changes nothing beyond the first pass.
    #[test]
    fn prop_normalize_is_idempotent(filters in arb_filters()) {
        let mut once = filters;
        once.normalize();
        let mut twice = once.clone();
        twice.normalize();
        prop_assert_eq!(once, twice);
    }

    /// Property: normalized filters always satisfy the backend's
    /// documented constraints.
    #[test]
    fn prop_normalized_filters_satisfy_constraints(filters in arb_filters()) {
        let mut filters = filters;
        filters.normalize();

        if let Some(term) = &filters.search_term {
            prop_assert!(!term.trim().is_empty());
            prop_assert_eq!(term.trim(), term.as_str());
            prop_assert!(term.chars().count() <= MAX_SEARCH_TERM_LEN);
        }
        prop_assert!(filters.tags.len() <= MAX_TAGS);
        for tag in &filters.tags {
            prop_assert!(!tag.is_empty());
            prop_assert_eq!(tag.trim(), tag.as_str());
            prop_assert_eq!(tag.to_lowercase(), tag.clone());
        }
        prop_assert!(filters.limit >= MIN_PAGE_SIZE && filters.limit <= MAX_PAGE_SIZE);
        prop_assert!(filters.page >= 1);
    }

    /// Property: the query serialization carries exactly one `tags` pair
    /// per tag, the three mandatory keys exactly once, and optional keys
    /// only when set.
    #[test]
    fn prop_query_pairs_match_filter_state(filters in arb_filters()) {
        let mut filters = filters;
        filters.normalize();
        let pairs = filters.query_pairs();

        let count = |key: &str| pairs.iter().filter(|(k, _)| k == key).count();
        prop_assert_eq!(count("tags"), filters.tags.len());
        prop_assert_eq!(count("sort_by"), 1);
        prop_assert_eq!(count("page"), 1);
        prop_assert_eq!(count("limit"), 1);
        prop_assert_eq!(count("search_term"), usize::from(filters.search_term.is_some()));
        prop_assert_eq!(count("date_from"), usize::from(filters.date_from.is_some()));
        prop_assert_eq!(count("date_to"), usize::from(filters.date_to.is_some()));
    }
}
