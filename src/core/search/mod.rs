//! Incremental dataset search.
//!
//! This module implements the browse-side search experience: a filter
//! state that normalizes itself before hitting the wire, a controller
//! that accumulates pages into one deduplicated list, and a visibility
//! trigger that turns "the end of the list scrolled into view" into the
//! next fetch.
//!
//! ```text
//!   UI events                 SearchController              backend
//!   ---------                 ----------------              -------
//!   set_search_term() ---> bump generation, clear list ---> page 1
//!   sentinel visible  ---> ScrollTrigger::on_visible() ---> page N+1
//!   response (stale)  <--- generation mismatch: discarded
//! ```
//!
//! The controller is clone-shareable; hand one clone to the trigger and
//! keep another for filter edits.

// ============================================================================
// Module Declarations
// ============================================================================

pub mod controller;
pub mod filters;
pub mod trigger;

// ============================================================================
// Re-exports
// ============================================================================

pub use controller::{
    FetchOutcome, LoadStatus, SearchBackend, SearchController, SearchSnapshot,
};
pub use filters::{SearchFilters, SortBy};
pub use trigger::{ScrollTrigger, TriggerOutcome};
