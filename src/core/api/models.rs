//! Datamere API Wire Models
//!
//! Request/response data structures for the dataset search, preview, and
//! platform endpoints. Field names follow the backend contract exactly.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

// ============================================================================
// Dataset Records
// ============================================================================

/// A dataset record as returned by search and listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatasetSummary {
    /// Backend-assigned stable ID.
    pub dataset_id: i64,
    pub dataset_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_description: Option<String>,
    #[serde(default)]
    pub downloads_count: u64,
    pub uploader_id: i64,
    /// ISO-8601 creation timestamp.
    pub date_of_creation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_last_updated: Option<String>,
    /// User IDs with owner rights on this dataset.
    #[serde(default)]
    pub owners: Vec<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geographic_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_time_period: Option<String>,
    /// Moderation state: "pending", "approved" or "rejected".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_date: Option<String>,
    /// Distinct file extensions present, e.g. ["csv", "json"].
    #[serde(default)]
    pub file_types: Vec<String>,
}

impl DatasetSummary {
    /// Whether moderation has approved this dataset.
    pub fn is_approved(&self) -> bool {
        self.approval_status.as_deref() == Some("approved")
    }

    /// Whether the given user uploaded or co-owns this dataset.
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.uploader_id == user_id || self.owners.contains(&user_id)
    }
}

/// One page of dataset search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetListResponse {
    pub datasets: Vec<DatasetSummary>,
    /// Total records matching the filter, independent of page size.
    pub total_count: u64,
    pub page: u32,
    pub limit: u32,
    /// True iff additional pages exist beyond this one.
    pub has_next: bool,
    pub has_prev: bool,
}

/// Owner identity details included in dataset detail responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetOwner {
    pub user_id: i64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl DatasetOwner {
    /// "First Last" when both names are present, otherwise the username.
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            _ => self.username.clone(),
        }
    }
}

/// Tag vocabulary entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagEntry {
    pub tag_id: i64,
    pub tag_category_name: String,
}

/// Full dataset detail, a summary plus expanded relations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetDetailResponse {
    #[serde(flatten)]
    pub summary: DatasetSummary,
    #[serde(default)]
    pub owner_details: Vec<DatasetOwner>,
    #[serde(default)]
    pub tag_details: Vec<TagEntry>,
    #[serde(default)]
    pub file_count: u64,
    /// Total size of all files in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_size: Option<u64>,
}

/// A file attached to a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetFileRecord {
    pub file_id: i64,
    pub file_name: String,
    /// Size in bytes, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Declared MIME type, e.g. "text/csv".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    /// ISO-8601 upload timestamp.
    pub file_date_of_upload: String,
    pub file_url: String,
    pub dataset_id: i64,
}

// ============================================================================
// Preview Payload
// ============================================================================

/// Payload mode of a preview window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Ordered row-arrays (delimited-text files).
    Rows,
    /// Ordered field-maps (structured/record files).
    Records,
}

impl std::fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadKind::Rows => write!(f, "rows"),
            PayloadKind::Records => write!(f, "records"),
        }
    }
}

/// Two row shapes can come back for a preview window: CSV rows arrive as
/// string arrays, JSON records as field maps. Exactly one mode applies per
/// file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PreviewPayload {
    Rows(Vec<Vec<String>>),
    Records(Vec<Map<String, Value>>),
}

/// Attempted to concatenate windows of different payload modes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot append {got} data to a {expected} window")]
pub struct PayloadKindMismatch {
    pub expected: PayloadKind,
    pub got: PayloadKind,
}

impl PreviewPayload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            PreviewPayload::Rows(_) => PayloadKind::Rows,
            PreviewPayload::Records(_) => PayloadKind::Records,
        }
    }

    /// Empty payload of the given mode.
    pub fn empty(kind: PayloadKind) -> Self {
        match kind {
            PayloadKind::Rows => PreviewPayload::Rows(Vec::new()),
            PayloadKind::Records => PreviewPayload::Records(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PreviewPayload::Rows(rows) => rows.len(),
            PreviewPayload::Records(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Type-correct concatenation: rows append to rows, records to records.
    ///
    /// An empty window carries no mode information (untagged JSON `[]`
    /// parses as rows), so appending onto an empty payload adopts the
    /// incoming mode, and appending an empty payload is a no-op.
    pub fn try_append(&mut self, other: PreviewPayload) -> Result<(), PayloadKindMismatch> {
        if other.is_empty() {
            return Ok(());
        }
        if self.is_empty() {
            *self = other;
            return Ok(());
        }
        match (self, other) {
            (PreviewPayload::Rows(rows), PreviewPayload::Rows(more)) => {
                rows.extend(more);
                Ok(())
            }
            (PreviewPayload::Records(records), PreviewPayload::Records(more)) => {
                records.extend(more);
                Ok(())
            }
            (current, other) => Err(PayloadKindMismatch {
                expected: current.kind(),
                got: other.kind(),
            }),
        }
    }
}

/// One chunk of parsed file content from the preview endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewWindowResponse {
    pub data: PreviewPayload,
    /// Column names, present for delimited-text files at offset 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,
    /// Size of the source file in bytes.
    pub total_size: u64,
    /// True iff `current_offset < total_size`.
    pub has_more: bool,
    /// Cursor just past this window; echo it back as `offset` to resume.
    pub current_offset: u64,
    /// Declared MIME type of the previewed file.
    pub file_type: String,
}

// ============================================================================
// Platform Responses
// ============================================================================

/// Platform-wide dataset statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetStatsResponse {
    pub total_datasets: u64,
    pub total_downloads: u64,
    pub datasets_this_month: u64,
    #[serde(default)]
    pub top_tags: Vec<TagCount>,
}

/// Tag usage frequency entry in the stats response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

/// Bearer token minted by the login endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub access_token: String,
    pub token_type: String,
}

/// Backend error body shape (`{"detail": "..."}`).
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: String,
}
