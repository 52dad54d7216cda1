//! Chunked Fetch Orchestrator
//!
//! Downloads a batch of media items into a [`ContentStore`] a chunk at a
//! time. Items inside a chunk are fetched concurrently; the next chunk only
//! starts once every fetch of the current one has settled, so at most
//! `chunk_size` downloads are ever in flight for a batch.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::join_all;
use uuid::Uuid;

use super::store::ContentStore;
use super::types::{chunk_count, BatchReport, MediaItem, DEFAULT_CHUNK_SIZE};

// ============================================================================
// Errors
// ============================================================================

/// Why a single item could not be fetched
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to download file: {0}")]
    Request(String),

    #[error("failed to download file: received status code {0}")]
    Status(u16),

    #[error("failed to read response body: {0}")]
    Body(String),
}

// ============================================================================
// Media Source Trait
// ============================================================================

/// Something that can turn a media link into bytes
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Fetch the full body behind `url`
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// HTTP GET via reqwest
pub struct HttpMediaSource {
    client: reqwest::Client,
}

impl HttpMediaSource {
    /// Build a client whose requests give up after `timeout`
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl MediaSource for HttpMediaSource {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .bytes()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Fetches batches in bounded chunks
#[derive(Clone)]
pub struct ChunkedFetcher {
    source: Arc<dyn MediaSource>,
    chunk_size: usize,
}

/// Result of one item fetch inside a chunk
enum Outcome {
    Fetched,
    Failed,
}

impl ChunkedFetcher {
    /// Create a fetcher with the default chunk size
    pub fn new(source: Arc<dyn MediaSource>) -> Self {
        Self::with_chunk_size(source, DEFAULT_CHUNK_SIZE)
    }

    /// Create a fetcher with a custom chunk size (minimum 1)
    pub fn with_chunk_size(source: Arc<dyn MediaSource>, chunk_size: usize) -> Self {
        Self {
            source,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Fetch every item not yet in `store`
    ///
    /// Individual failures are logged and leave the item absent; they never
    /// abort the batch.
    pub async fn fetch_batch(&self, store: &ContentStore, items: &[MediaItem]) -> BatchReport {
        let batch_id = Uuid::new_v4();
        let total = items.len();
        let mut report = BatchReport {
            batch_id,
            total,
            chunks: 0,
            fetched: 0,
            skipped: 0,
            failed: 0,
            stored_items: 0,
            stored_bytes: 0,
        };

        tracing::info!(
            batch_id = %batch_id,
            total = total,
            chunks = chunk_count(total, self.chunk_size),
            "Starting download of {} videos",
            total
        );

        for (index, chunk) in items.chunks(self.chunk_size).enumerate() {
            let start = index * self.chunk_size;

            // Reserved fetches run as detached tasks: a dropped batch still
            // lets each one store its bytes or release its reservation.
            let mut tasks = Vec::with_capacity(chunk.len());
            for item in chunk {
                if store.reserve(&item.id).await {
                    let task = tokio::spawn(fetch_item(
                        self.source.clone(),
                        batch_id,
                        store.clone(),
                        item.clone(),
                    ));
                    tasks.push((item.id.clone(), task));
                } else {
                    tracing::debug!(
                        batch_id = %batch_id,
                        item_id = %item.id,
                        "Item already stored or in flight, skipping"
                    );
                    report.skipped += 1;
                }
            }

            let (ids, handles): (Vec<String>, Vec<_>) = tasks.into_iter().unzip();
            let mut chunk_fetched = 0;
            let mut chunk_failed = 0;
            for (id, joined) in ids.iter().zip(join_all(handles).await) {
                match joined {
                    Ok(Outcome::Fetched) => chunk_fetched += 1,
                    Ok(Outcome::Failed) => chunk_failed += 1,
                    Err(e) => {
                        tracing::error!(
                            batch_id = %batch_id,
                            item_id = %id,
                            "Fetch task failed: {}",
                            e
                        );
                        store.release(id).await;
                        chunk_failed += 1;
                    }
                }
            }

            report.fetched += chunk_fetched;
            report.failed += chunk_failed;
            report.chunks += 1;
            tracing::info!(
                batch_id = %batch_id,
                chunk = index,
                fetched = chunk_fetched,
                failed = chunk_failed,
                "Chunk {}-{} processed",
                start + 1,
                start + chunk.len()
            );
        }

        report.stored_items = store.len().await;
        report.stored_bytes = store.total_bytes().await;

        tracing::info!(
            batch_id = %batch_id,
            fetched = report.fetched,
            skipped = report.skipped,
            failed = report.failed,
            "Downloaded {}/{} videos, {:.2} MB stored",
            report.stored_items,
            total,
            report.stored_mb()
        );

        report
    }
}

/// Fetch one reserved item and either store it or release the reservation
async fn fetch_item(
    source: Arc<dyn MediaSource>,
    batch_id: Uuid,
    store: ContentStore,
    item: MediaItem,
) -> Outcome {
    match source.fetch(&item.media_link).await {
        Ok(data) => {
            tracing::debug!(
                batch_id = %batch_id,
                item_id = %item.id,
                size = data.len(),
                "Fetched item"
            );
            store.put(item.id, data).await;
            Outcome::Fetched
        }
        Err(e) => {
            tracing::warn!(
                batch_id = %batch_id,
                item_id = %item.id,
                media_link = %item.media_link,
                "Error downloading video: {}",
                e
            );
            store.release(&item.id).await;
            Outcome::Failed
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
