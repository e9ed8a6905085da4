//! Preview subsystem errors.

use thiserror::Error;

use crate::core::api;
use crate::core::api::models::PayloadKindMismatch;

pub type Result<T> = std::result::Result<T, PreviewError>;

#[derive(Error, Debug)]
pub enum PreviewError {
    /// The file's type cannot be previewed. Raised before any network
    /// traffic.
    #[error("Preview not supported for {file_name:?} (type: {file_type})")]
    UnsupportedType { file_name: String, file_type: String },

    /// The file id is not part of the current dataset's file list.
    #[error("No file with id {0} in the current dataset")]
    FileNotFound(i64),

    /// The backend request failed.
    #[error(transparent)]
    Api(#[from] api::Error),

    /// A continuation window arrived in a different shape than the data
    /// already loaded.
    #[error(transparent)]
    Window(#[from] PayloadKindMismatch),
}

impl PreviewError {
    /// Whether retrying the same operation may succeed.
    pub fn is_retriable(&self) -> bool {
        match self {
            PreviewError::Api(e) => e.is_retriable(),
            _ => false,
        }
    }

    /// Whether the failure calls for re-authentication.
    pub fn needs_auth(&self) -> bool {
        matches!(self, PreviewError::Api(e) if e.needs_auth())
    }
}
