//! Content Store
//!
//! In-memory mapping from item id to fetched media bytes.
//!
//! Readers and existence checks share the lock; writes are exclusive.
//! Fetches claim an id with [`ContentStore::reserve`] so two concurrent
//! batches naming the same new id issue a single download.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::RwLock;

/// A slot in the store
#[derive(Debug, Clone)]
enum Slot {
    /// A fetch owns this id and has not finished yet
    Pending,
    /// Fetched bytes, never mutated afterwards
    Ready(Bytes),
}

/// Concurrent id -> buffer store
#[derive(Clone, Default)]
pub struct ContentStore {
    inner: Arc<RwLock<HashMap<String, Slot>>>,
}

impl ContentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether bytes are stored for an id
    pub async fn has(&self, id: &str) -> bool {
        let slots = self.inner.read().await;
        matches!(slots.get(id), Some(Slot::Ready(_)))
    }

    /// Get the bytes stored for an id
    pub async fn get(&self, id: &str) -> Option<Bytes> {
        let slots = self.inner.read().await;
        match slots.get(id) {
            Some(Slot::Ready(data)) => Some(data.clone()),
            _ => None,
        }
    }

    /// Store bytes for an id, replacing any pending reservation
    pub async fn put(&self, id: impl Into<String>, data: Bytes) {
        let mut slots = self.inner.write().await;
        slots.insert(id.into(), Slot::Ready(data));
    }

    /// Claim an id for fetching
    ///
    /// Returns `true` when the caller now owns the fetch. Returns `false`
    /// if the id is already stored or another fetch holds it.
    pub async fn reserve(&self, id: &str) -> bool {
        let mut slots = self.inner.write().await;
        if slots.contains_key(id) {
            return false;
        }
        slots.insert(id.to_string(), Slot::Pending);
        true
    }

    /// Drop a pending reservation after a failed fetch
    ///
    /// Stored bytes are left untouched.
    pub async fn release(&self, id: &str) {
        let mut slots = self.inner.write().await;
        if matches!(slots.get(id), Some(Slot::Pending)) {
            slots.remove(id);
        }
    }

    /// Number of stored entries (pending reservations excluded)
    pub async fn len(&self) -> usize {
        let slots = self.inner.read().await;
        slots.values().filter(|s| matches!(s, Slot::Ready(_))).count()
    }

    /// Whether nothing has been stored yet
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Total size of stored buffers in bytes
    pub async fn total_bytes(&self) -> usize {
        let slots = self.inner.read().await;
        slots
            .values()
            .map(|s| match s {
                Slot::Ready(data) => data.len(),
                Slot::Pending => 0,
            })
            .sum()
    }
}
