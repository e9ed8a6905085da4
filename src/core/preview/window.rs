//! Preview file types and window accumulation.
//!
//! A preview is loaded in windows: the first request starts at offset 0,
//! and each response carries the byte cursor (`current_offset`) the next
//! request must resume from. [`PreviewWindow`] folds those responses into
//! one contiguous view, keeping CSV headers from the first window and the
//! pagination cursor from the latest.

use std::fmt;

use crate::core::api::models::{
    DatasetFileRecord, PayloadKind, PayloadKindMismatch, PreviewPayload, PreviewWindowResponse,
};

// ============================================================================
// File Types
// ============================================================================

/// File types the preview endpoint can parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewFileType {
    Csv,
    Json,
}

impl PreviewFileType {
    /// Match a MIME type, ignoring case and surrounding whitespace.
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_lowercase().as_str() {
            "text/csv" => Some(PreviewFileType::Csv),
            "application/json" => Some(PreviewFileType::Json),
            _ => None,
        }
    }

    /// Fall back to the file extension when no MIME type is recorded.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = name.rsplit_once('.')?.1.to_lowercase();
        match ext.as_str() {
            "csv" => Some(PreviewFileType::Csv),
            "json" => Some(PreviewFileType::Json),
            _ => None,
        }
    }

    /// Decide whether a file record is previewable, preferring its
    /// recorded MIME type over its name.
    pub fn detect(file: &DatasetFileRecord) -> Option<Self> {
        match file.file_type.as_deref() {
            Some(mime) => Self::from_mime(mime),
            None => Self::from_file_name(&file.file_name),
        }
    }

    pub fn as_mime(&self) -> &'static str {
        match self {
            PreviewFileType::Csv => "text/csv",
            PreviewFileType::Json => "application/json",
        }
    }

    /// The payload shape this type parses into.
    pub fn payload_kind(&self) -> PayloadKind {
        match self {
            PreviewFileType::Csv => PayloadKind::Rows,
            PreviewFileType::Json => PayloadKind::Records,
        }
    }
}

impl fmt::Display for PreviewFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewFileType::Csv => write!(f, "csv"),
            PreviewFileType::Json => write!(f, "json"),
        }
    }
}

// ============================================================================
// Accumulated Window
// ============================================================================

/// The loaded portion of a file preview.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewWindow {
    pub file_type: PreviewFileType,
    /// Parsed content, in file order.
    pub data: PreviewPayload,
    /// CSV column headers. Only the offset-0 window carries them.
    pub headers: Option<Vec<String>>,
    /// Size of the whole file in bytes.
    pub total_size: u64,
    /// Byte cursor the next window must resume from.
    pub next_offset: u64,
    /// Whether the file extends past the loaded portion.
    pub has_more: bool,
}

impl PreviewWindow {
    /// Build the initial window from the first response.
    ///
    /// An empty payload deserializes without shape information; it is
    /// normalized to the shape the file type parses into so later appends
    /// line up.
    #[must_use]
    pub fn from_response(file_type: PreviewFileType, response: PreviewWindowResponse) -> Self {
        let data = if response.data.is_empty() {
            PreviewPayload::empty(file_type.payload_kind())
        } else {
            response.data
        };
        Self {
            file_type,
            data,
            headers: response.headers,
            total_size: response.total_size,
            next_offset: response.current_offset,
            has_more: response.has_more,
        }
    }

    /// Append a continuation window, advancing the cursor.
    ///
    /// Returns the number of appended rows. On a shape mismatch the
    /// loaded data and cursor are left untouched.
    pub fn append(
        &mut self,
        response: PreviewWindowResponse,
    ) -> std::result::Result<usize, PayloadKindMismatch> {
        let added = response.data.len();
        self.data.try_append(response.data)?;
        if self.headers.is_none() {
            self.headers = response.headers;
        }
        self.total_size = response.total_size;
        self.next_offset = response.current_offset;
        self.has_more = response.has_more;
        Ok(added)
    }

    /// Number of loaded rows or records.
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
