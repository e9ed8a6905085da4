//! Visibility-driven fetch trigger.
//!
//! UIs signal "the list tail became visible" through [`ScrollTrigger`];
//! the trigger decides whether that should turn into a fetch. It stays
//! quiet while a fetch is in flight or the result set is exhausted, and
//! after a failed fetch it suppresses further visibility events entirely
//! so a sentinel sitting in view cannot hammer a failing backend. An
//! explicit retry, refresh, or filter change clears the failed state and
//! re-arms the trigger.

use crate::core::search::controller::{
    FetchOutcome, LoadStatus, SearchBackend, SearchController,
};

/// What a visibility event turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The event was forwarded to the controller.
    Triggered(FetchOutcome),
    /// The controller is in the failed state; nothing was fetched.
    SkippedAfterFailure,
    /// The forwarded fetch failed. The message is also recorded in the
    /// controller's snapshot.
    FetchFailed(String),
}

/// Turns list-tail visibility events into incremental fetches.
pub struct ScrollTrigger<B: SearchBackend> {
    controller: SearchController<B>,
}

impl<B: SearchBackend> Clone for ScrollTrigger<B> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
        }
    }
}

impl<B: SearchBackend> ScrollTrigger<B> {
    #[must_use]
    pub fn new(controller: SearchController<B>) -> Self {
        Self { controller }
    }

    /// Handle "the sentinel row became visible".
    ///
    /// Safe to call as often as the UI likes: redundant events while a
    /// fetch is in flight or after the final page collapse into no-ops.
    pub async fn on_visible(&self) -> TriggerOutcome {
        if self.controller.status().await == LoadStatus::Failed {
            log::debug!("Visibility event suppressed until the failed fetch is retried");
            return TriggerOutcome::SkippedAfterFailure;
        }

        match self.controller.fetch_next_page().await {
            Ok(outcome) => TriggerOutcome::Triggered(outcome),
            Err(e) => {
                log::warn!("Visibility-driven fetch failed: {e}");
                TriggerOutcome::FetchFailed(e.to_string())
            }
        }
    }

    /// Explicitly retry after a failure, re-arming the trigger.
    pub async fn retry(&self) -> TriggerOutcome {
        match self.controller.fetch_next_page().await {
            Ok(outcome) => TriggerOutcome::Triggered(outcome),
            Err(e) => {
                log::warn!("Retry fetch failed: {e}");
                TriggerOutcome::FetchFailed(e.to_string())
            }
        }
    }

    /// The controller this trigger feeds.
    pub fn controller(&self) -> &SearchController<B> {
        &self.controller
    }
}
