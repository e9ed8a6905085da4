//! Search filter state and normalization.
//!
//! [`SearchFilters`] is the single description of "what the user is looking
//! at": free-text term, tag set, upload-date range, sort order, and the
//! pagination cursor. Filter values are normalized before they reach the
//! wire; values the backend would reject are dropped with a warning rather
//! than failing the query.

use chrono::NaiveDate;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest search term the backend accepts.
pub const MAX_SEARCH_TERM_LEN: usize = 100;

/// Most tags a single query may carry.
pub const MAX_TAGS: usize = 10;

/// Page size bounds enforced by the backend.
pub const MIN_PAGE_SIZE: u32 = 1;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page size used when configuration does not say otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

// ============================================================================
// Sort Order
// ============================================================================

/// Result ordering understood by the search endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Most recently created first.
    #[default]
    Newest,
    /// Oldest first.
    Oldest,
    /// Most downloaded first.
    Downloads,
    /// Dataset name, ascending.
    Name,
}

impl SortBy {
    /// Wire value for the `sort_by` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Newest => "newest",
            SortBy::Oldest => "oldest",
            SortBy::Downloads => "downloads",
            SortBy::Name => "name",
        }
    }

    /// Parse a wire value, falling back to [`SortBy::Newest`] on unknown
    /// input.
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "newest" => SortBy::Newest,
            "oldest" => SortBy::Oldest,
            "downloads" => SortBy::Downloads,
            "name" => SortBy::Name,
            other => {
                log::warn!("Unknown sort order {other:?} - falling back to newest");
                SortBy::Newest
            }
        }
    }

    /// All orderings, for building pickers.
    pub fn all() -> [SortBy; 4] {
        [SortBy::Newest, SortBy::Oldest, SortBy::Downloads, SortBy::Name]
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Filter State
// ============================================================================

/// Complete filter and pagination state for one dataset search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Free-text search term. `None` means unfiltered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,

    /// Tag filter. Order is preserved for display; membership is
    /// case-insensitive (stored lowercased).
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub tags: IndexSet<String>,

    /// Inclusive lower bound on upload date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,

    /// Inclusive upper bound on upload date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,

    /// Result ordering.
    #[serde(default)]
    pub sort_by: SortBy,

    /// 1-based page cursor.
    #[serde(default = "default_page")]
    pub page: u32,

    /// Page size. Fixed for the lifetime of a controller.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            search_term: None,
            tags: IndexSet::new(),
            date_from: None,
            date_to: None,
            sort_by: SortBy::default(),
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchFilters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default filters with an explicit page size.
    #[must_use]
    pub fn with_limit(limit: u32) -> Self {
        let mut filters = Self::default();
        filters.limit = limit;
        filters.normalize();
        filters
    }

    /// Whether any user-visible filter is active.
    ///
    /// Sort order and pagination are presentation, not filters.
    pub fn has_active_filters(&self) -> bool {
        self.search_term.is_some()
            || !self.tags.is_empty()
            || self.date_from.is_some()
            || self.date_to.is_some()
    }

    /// Bring the state into the shape the backend accepts.
    ///
    /// - trims the search term, dropping it when blank, and truncates it
    ///   to [`MAX_SEARCH_TERM_LEN`] characters
    /// - lowercases tags, drops blanks, and keeps at most [`MAX_TAGS`]
    /// - clamps the page size into the accepted range
    ///
    /// Values that cannot be salvaged are dropped with a warning; a bad
    /// filter never turns into a failed query.
    pub fn normalize(&mut self) {
        if let Some(term) = self.search_term.take() {
            let trimmed = term.trim();
            if trimmed.is_empty() {
                log::debug!("Dropping blank search term");
            } else if trimmed.chars().count() > MAX_SEARCH_TERM_LEN {
                log::warn!(
                    "Search term exceeds {MAX_SEARCH_TERM_LEN} characters - truncating"
                );
                let cut: String = trimmed.chars().take(MAX_SEARCH_TERM_LEN).collect();
                self.search_term = Some(cut.trim_end().to_string());
            } else {
                self.search_term = Some(trimmed.to_string());
            }
        }

        let tags = std::mem::take(&mut self.tags);
        for tag in tags {
            let tag = tag.trim().to_lowercase();
            if tag.is_empty() {
                log::debug!("Dropping blank tag");
                continue;
            }
            if self.tags.len() >= MAX_TAGS {
                log::warn!("Tag filter capped at {MAX_TAGS} tags - dropping {tag:?}");
                continue;
            }
            self.tags.insert(tag);
        }

        if self.limit < MIN_PAGE_SIZE || self.limit > MAX_PAGE_SIZE {
            let clamped = self.limit.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);
            log::warn!("Page size {} out of range - clamping to {clamped}", self.limit);
            self.limit = clamped;
        }

        if self.page == 0 {
            log::warn!("Page cursor 0 is invalid - resetting to 1");
            self.page = 1;
        }
    }

    /// Serialize to query parameters. Tags repeat the `tags` key once per
    /// value.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(term) = &self.search_term {
            pairs.push(("search_term".to_string(), term.clone()));
        }
        for tag in &self.tags {
            pairs.push(("tags".to_string(), tag.clone()));
        }
        if let Some(date) = self.date_from {
            pairs.push(("date_from".to_string(), date.format("%Y-%m-%d").to_string()));
        }
        if let Some(date) = self.date_to {
            pairs.push(("date_to".to_string(), date.format("%Y-%m-%d").to_string()));
        }
        pairs.push(("sort_by".to_string(), self.sort_by.to_string()));
        pairs.push(("page".to_string(), self.page.to_string()));
        pairs.push(("limit".to_string(), self.limit.to_string()));
        pairs
    }

    /// One-line description for logging.
    pub fn describe(&self) -> String {
        format!(
            "term={:?} tags={} dates={}..{} sort={} page={} limit={}",
            self.search_term.as_deref().unwrap_or(""),
            self.tags.len(),
            self.date_from.map(|d| d.to_string()).unwrap_or_default(),
            self.date_to.map(|d| d.to_string()).unwrap_or_default(),
            self.sort_by,
            self.page,
            self.limit
        )
    }
}
