//! Chunked file preview.
//!
//! Previews load window by window: the loader asks for the first window
//! at offset 0 and resumes from the server-provided cursor on each
//! `load_more`, folding windows into one contiguous [`PreviewWindow`].

pub mod error;
pub mod loader;
pub mod window;

pub use error::{PreviewError, Result};
pub use loader::{
    LoadOutcome, PreviewBackend, PreviewLoader, PreviewPhase, PreviewSnapshot,
    DEFAULT_PREVIEW_ROWS,
};
pub use window::{PreviewFileType, PreviewWindow};
