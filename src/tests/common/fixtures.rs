//! Test Fixtures
//!
//! Builders for the wire models the backend serves: dataset summaries,
//! paginated result pages, file records, and preview windows. Pages
//! compute `has_next` with the backend's own formula so pagination tests
//! agree with production behavior.

use serde_json::json;

use crate::core::api::models::{
    DatasetFileRecord, DatasetListResponse, DatasetSummary, PreviewPayload,
    PreviewWindowResponse,
};

// =============================================================================
// Dataset Fixtures
// =============================================================================

/// A minimal approved dataset, deserialized the way a response would be.
pub fn dataset(id: i64, name: &str) -> DatasetSummary {
    serde_json::from_value(json!({
        "dataset_id": id,
        "dataset_name": name,
        "dataset_description": format!("{name} observations"),
        "downloads_count": 3,
        "uploader_id": 1,
        "date_of_creation": "2024-01-15T10:30:00",
        "tags": ["climate"],
        "approval_status": "approved",
        "file_types": ["text/csv"],
    }))
    .expect("fixture dataset must deserialize")
}

/// One page of search results. `has_next` uses the backend's formula:
/// `page * limit < total_count`.
pub fn dataset_page(ids: &[i64], total_count: u64, page: u32, limit: u32) -> DatasetListResponse {
    DatasetListResponse {
        datasets: ids
            .iter()
            .map(|&id| dataset(id, &format!("dataset-{id}")))
            .collect(),
        total_count,
        page,
        limit,
        has_next: u64::from(page) * u64::from(limit) < total_count,
        has_prev: page > 1,
    }
}

// =============================================================================
// File & Preview Fixtures
// =============================================================================

/// A file record attached to a dataset.
pub fn file_record(id: i64, name: &str, mime: Option<&str>) -> DatasetFileRecord {
    DatasetFileRecord {
        file_id: id,
        file_name: name.to_string(),
        size: Some(4096),
        file_type: mime.map(String::from),
        file_date_of_upload: "2024-02-01T08:00:00".to_string(),
        file_url: format!("/files/{id}"),
        dataset_id: 7,
    }
}

/// A CSV preview window of single-column rows.
pub fn csv_window(
    rows: &[&str],
    headers: Option<&[&str]>,
    current_offset: u64,
    has_more: bool,
) -> PreviewWindowResponse {
    PreviewWindowResponse {
        data: PreviewPayload::Rows(rows.iter().map(|r| vec![r.to_string()]).collect()),
        headers: headers.map(|h| h.iter().map(|s| s.to_string()).collect()),
        total_size: 4096,
        has_more,
        current_offset,
        file_type: "text/csv".to_string(),
    }
}

/// A JSON preview window of `{"id": n}` records.
pub fn json_window(ids: &[i64], current_offset: u64, has_more: bool) -> PreviewWindowResponse {
    let records: Vec<_> = ids.iter().map(|id| json!({ "id": id })).collect();
    PreviewWindowResponse {
        data: serde_json::from_value(json!(records)).expect("fixture records must deserialize"),
        headers: None,
        total_size: 2048,
        has_more,
        current_offset,
        file_type: "application/json".to_string(),
    }
}
