//! Wire and report types for media batches

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

/// Default number of items fetched concurrently per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 8;

/// Default per-fetch timeout in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

// ============================================================================
// Request Types
// ============================================================================

/// A remote media item to fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Caller-assigned id, unique within a request
    #[serde(rename = "ID")]
    pub id: String,

    /// Source URL
    #[serde(rename = "mediaLink", default)]
    pub media_link: String,
}

impl MediaItem {
    pub fn new(id: impl Into<String>, media_link: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            media_link: media_link.into(),
        }
    }
}

/// Body shared by `/download` and `/compare`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRequest {
    /// Reference payload text (base64, possibly partial)
    #[serde(default)]
    pub url: String,

    /// Items to fetch, or candidate ids to compare
    #[serde(default)]
    pub data: Vec<MediaItem>,

    /// Phase flag for split payloads (0, 1 or 2)
    #[serde(default)]
    pub is_big_url_done: i64,
}

// ============================================================================
// Response Types
// ============================================================================

/// Matching ids, in the order the caller listed them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompareResponse {
    pub results: Vec<String>,
}

// ============================================================================
// Batch Report
// ============================================================================

/// Outcome of one fetch batch
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Correlation id for log lines of this batch
    pub batch_id: Uuid,

    /// Items in the request
    pub total: usize,

    /// Chunk barriers passed
    pub chunks: usize,

    /// Items fetched and stored by this batch
    pub fetched: usize,

    /// Items already stored or in flight elsewhere
    pub skipped: usize,

    /// Items whose fetch failed
    pub failed: usize,

    /// Entries in the store after the batch
    pub stored_items: usize,

    /// Bytes in the store after the batch
    pub stored_bytes: usize,
}

impl BatchReport {
    /// Stored size in mebibytes
    pub fn stored_mb(&self) -> f64 {
        self.stored_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Number of chunks a batch of `total` items is split into
pub fn chunk_count(total: usize, chunk_size: usize) -> usize {
    total.div_ceil(chunk_size.max(1))
}
