//! File preview loader state machine.
//!
//! One [`PreviewLoader`] serves one dataset-detail view. It tracks the
//! dataset's file list, the selected file, and the loaded window, moving
//! through the phases:
//!
//! ```text
//!   NoFile -> Loading -> Loaded <-> LoadingMore
//!                |
//!                v  (initial load failed)
//!              Error
//! ```
//!
//! A `load_more` failure is transient: the loader stays in `Loaded` with
//! its data intact and records the error message. Switching files bumps a
//! selection generation, so windows from an abandoned selection are
//! discarded when they arrive. `sync_files` keeps a selection that
//! survives the list change and auto-selects the first previewable file
//! when it does not.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::core::api;
use crate::core::api::models::{DatasetFileRecord, PreviewWindowResponse};
use crate::core::preview::error::{PreviewError, Result};
use crate::core::preview::window::{PreviewFileType, PreviewWindow};

/// Rows requested per window when configuration does not say otherwise.
pub const DEFAULT_PREVIEW_ROWS: u32 = 50;

// ============================================================================
// Backend Seam
// ============================================================================

/// Preview capability the loader drives.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreviewBackend: Send + Sync {
    async fn fetch_preview(
        &self,
        file_id: i64,
        offset: u64,
        max_rows: u32,
    ) -> api::Result<PreviewWindowResponse>;
}

// ============================================================================
// Observable State
// ============================================================================

/// Where the loader is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewPhase {
    /// Nothing selected.
    NoFile,
    /// First window of a selection is in flight.
    Loading,
    /// A window is loaded and stable.
    Loaded,
    /// A continuation window is in flight; loaded data remains visible.
    LoadingMore,
    /// The selection's initial load failed.
    Error,
}

/// What a load call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The first window arrived with this many rows.
    Loaded(usize),
    /// A continuation window appended this many rows.
    Appended(usize),
    /// A window was already in flight; this call did nothing.
    AlreadyLoading,
    /// The whole file is loaded.
    Exhausted,
    /// No stable window to extend (nothing selected, still loading, or
    /// errored).
    NotReady,
    /// The response arrived after the selection changed and was
    /// discarded.
    Stale,
}

/// Point-in-time copy of the loader's observable state.
#[derive(Debug, Clone)]
pub struct PreviewSnapshot {
    pub phase: PreviewPhase,
    pub file: Option<DatasetFileRecord>,
    pub window: Option<PreviewWindow>,
    /// Message from the most recent failure, fatal or transient.
    pub last_error: Option<String>,
}

struct LoaderState {
    files: Vec<DatasetFileRecord>,
    selected: Option<DatasetFileRecord>,
    window: Option<PreviewWindow>,
    phase: PreviewPhase,
    /// Bumped whenever the selection changes; in-flight fetches compare
    /// against it.
    generation: u64,
    last_error: Option<String>,
}

impl LoaderState {
    fn clear_selection(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.selected = None;
        self.window = None;
        self.phase = PreviewPhase::NoFile;
        self.last_error = None;
    }
}

// ============================================================================
// Loader
// ============================================================================

/// Async loader for chunked file previews.
///
/// Cheap to clone; clones share state.
pub struct PreviewLoader<B: PreviewBackend> {
    backend: Arc<B>,
    state: Arc<Mutex<LoaderState>>,
    max_rows: u32,
}

impl<B: PreviewBackend> Clone for PreviewLoader<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            state: Arc::clone(&self.state),
            max_rows: self.max_rows,
        }
    }
}

impl<B: PreviewBackend> PreviewLoader<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self::with_max_rows(backend, DEFAULT_PREVIEW_ROWS)
    }

    /// Create a loader with an explicit window size.
    #[must_use]
    pub fn with_max_rows(backend: B, max_rows: u32) -> Self {
        Self {
            backend: Arc::new(backend),
            state: Arc::new(Mutex::new(LoaderState {
                files: Vec::new(),
                selected: None,
                window: None,
                phase: PreviewPhase::NoFile,
                generation: 0,
                last_error: None,
            })),
            max_rows: max_rows.max(1),
        }
    }

    // ========================================================================
    // File List
    // ========================================================================

    /// Replace the dataset's file list.
    ///
    /// A selection that survives the change is kept untouched. Otherwise
    /// the first previewable file in list order is selected and its first
    /// window loaded; with no previewable file the loader falls back to an
    /// empty selection. `Ok(None)` means no load was started.
    pub async fn sync_files(&self, files: Vec<DatasetFileRecord>) -> Result<Option<LoadOutcome>> {
        let file_id = {
            let mut state = self.state.lock().await;
            let selection_alive = state
                .selected
                .as_ref()
                .is_some_and(|sel| files.iter().any(|f| f.file_id == sel.file_id));
            state.files = files;
            if selection_alive {
                return Ok(None);
            }
            let next = state
                .files
                .iter()
                .find(|f| PreviewFileType::detect(f).is_some())
                .map(|f| f.file_id);
            let Some(file_id) = next else {
                if state.selected.is_some() {
                    log::debug!("Selected file left the dataset - clearing preview");
                    state.clear_selection();
                }
                return Ok(None);
            };
            file_id
        };

        log::debug!("Auto-selecting file {file_id} for preview");
        self.select_file(file_id).await.map(Some)
    }

    /// The current file list.
    pub async fn files(&self) -> Vec<DatasetFileRecord> {
        self.state.lock().await.files.clone()
    }

    /// Drop the selection and its window.
    pub async fn clear_selection(&self) {
        self.state.lock().await.clear_selection();
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Select a file and load its first window.
    ///
    /// A supported selection discards the previous window immediately and
    /// loads from offset 0; selecting while another load is in flight
    /// supersedes it. Files whose type the preview endpoint cannot parse
    /// are rejected before any network traffic, leaving the current
    /// selection in place.
    pub async fn select_file(&self, file_id: i64) -> Result<LoadOutcome> {
        let (generation, file_type) = {
            let mut state = self.state.lock().await;
            let file = state
                .files
                .iter()
                .find(|f| f.file_id == file_id)
                .cloned()
                .ok_or(PreviewError::FileNotFound(file_id))?;

            let Some(file_type) = PreviewFileType::detect(&file) else {
                let declared = file
                    .file_type
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string());
                let err = PreviewError::UnsupportedType {
                    file_name: file.file_name.clone(),
                    file_type: declared,
                };
                log::debug!("{err}");
                // Rejected selections do not transition: the current
                // selection and window stay visible.
                state.last_error = Some(err.to_string());
                return Err(err);
            };

            log::debug!("Previewing {} as {file_type}", file.file_name);
            state.generation = state.generation.wrapping_add(1);
            state.selected = Some(file);
            state.window = None;
            state.phase = PreviewPhase::Loading;
            state.last_error = None;
            (state.generation, file_type)
        };

        let result = self.backend.fetch_preview(file_id, 0, self.max_rows).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            log::debug!("Discarding preview window for superseded selection");
            return Ok(LoadOutcome::Stale);
        }
        match result {
            Ok(response) => {
                let window = PreviewWindow::from_response(file_type, response);
                let rows = window.row_count();
                state.window = Some(window);
                state.phase = PreviewPhase::Loaded;
                Ok(LoadOutcome::Loaded(rows))
            }
            Err(e) => {
                state.phase = PreviewPhase::Error;
                state.last_error = Some(e.to_string());
                log::warn!("Preview load for file {file_id} failed: {e}");
                Err(e.into())
            }
        }
    }

    /// Load the next window of the selected file.
    ///
    /// Only meaningful in the `Loaded` phase; other phases are no-ops. A
    /// failure keeps the loaded window and phase intact, recording the
    /// error for the UI.
    pub async fn load_more(&self) -> Result<LoadOutcome> {
        let (generation, file_id, offset) = {
            let mut state = self.state.lock().await;
            match state.phase {
                PreviewPhase::LoadingMore => return Ok(LoadOutcome::AlreadyLoading),
                PreviewPhase::Loaded => {}
                _ => return Ok(LoadOutcome::NotReady),
            }
            let (Some(window), Some(file)) = (&state.window, &state.selected) else {
                return Ok(LoadOutcome::NotReady);
            };
            if !window.has_more {
                return Ok(LoadOutcome::Exhausted);
            }
            let file_id = file.file_id;
            let offset = window.next_offset;
            state.phase = PreviewPhase::LoadingMore;
            (state.generation, file_id, offset)
        };

        let result = self.backend.fetch_preview(file_id, offset, self.max_rows).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            log::debug!("Discarding continuation window for superseded selection");
            return Ok(LoadOutcome::Stale);
        }
        match result {
            Ok(response) => {
                let Some(window) = state.window.as_mut() else {
                    return Ok(LoadOutcome::Stale);
                };
                match window.append(response) {
                    Ok(added) => {
                        state.phase = PreviewPhase::Loaded;
                        state.last_error = None;
                        log::debug!("Appended {added} rows at offset {offset} for file {file_id}");
                        Ok(LoadOutcome::Appended(added))
                    }
                    Err(mismatch) => {
                        // Loaded data is intact; only the new window is
                        // dropped.
                        state.phase = PreviewPhase::Loaded;
                        state.last_error = Some(mismatch.to_string());
                        log::warn!("Continuation window rejected: {mismatch}");
                        Err(mismatch.into())
                    }
                }
            }
            Err(e) => {
                state.phase = PreviewPhase::Loaded;
                state.last_error = Some(e.to_string());
                log::warn!("Continuation fetch at offset {offset} failed: {e}");
                Err(e.into())
            }
        }
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Copy of the current observable state.
    pub async fn snapshot(&self) -> PreviewSnapshot {
        let state = self.state.lock().await;
        PreviewSnapshot {
            phase: state.phase,
            file: state.selected.clone(),
            window: state.window.clone(),
            last_error: state.last_error.clone(),
        }
    }

    /// Current phase.
    pub async fn phase(&self) -> PreviewPhase {
        self.state.lock().await.phase
    }
}
