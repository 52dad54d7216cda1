//! Session Manager
//!
//! Each session owns its content store, its download-completeness flag and
//! its split-payload assembler, so concurrent clients never share
//! single-slot state. Idle sessions are dropped together with their
//! buffers by a background cleanup task.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::{Mutex, MutexGuard, RwLock};

use super::reassembly::PayloadAssembler;
use crate::error::AppError;
use crate::media::ContentStore;

/// Session used by requests without an `X-Session-Id` header
pub const DEFAULT_SESSION_ID: &str = "default";

/// Idle time after which a session is dropped: 24 hours
pub const SESSION_TTL_HOURS: i64 = 24;

// ============================================================================
// Session
// ============================================================================

/// State for one client correlation id
pub struct Session {
    id: String,
    store: ContentStore,
    download_complete: AtomicBool,
    batch_lock: Mutex<()>,
    assembler: Mutex<PayloadAssembler>,
    created_at: DateTime<Utc>,
    last_active_ms: AtomicI64,
}

impl Session {
    fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            store: ContentStore::new(),
            download_complete: AtomicBool::new(false),
            batch_lock: Mutex::new(()),
            assembler: Mutex::new(PayloadAssembler::new()),
            created_at: now,
            last_active_ms: AtomicI64::new(now.timestamp_millis()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_active(&self) -> DateTime<Utc> {
        let ms = self.last_active_ms.load(Ordering::Relaxed);
        Utc.timestamp_millis_opt(ms).single().unwrap_or(self.created_at)
    }

    /// Record activity now
    pub fn touch(&self) {
        self.last_active_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// Whether the session has been idle longer than `ttl`
    pub fn is_expired(&self, ttl: chrono::Duration) -> bool {
        self.last_active() + ttl < Utc::now()
    }

    /// Whether the most recent batch processed all of its chunks
    pub fn is_download_complete(&self) -> bool {
        self.download_complete.load(Ordering::Acquire)
    }

    /// Start a batch: waits for any running batch of this session and
    /// clears the completeness flag
    ///
    /// The flag is set again by [`Session::finish_batch`] while the returned
    /// guard is still held.
    pub async fn begin_batch(&self) -> MutexGuard<'_, ()> {
        let guard = self.batch_lock.lock().await;
        self.download_complete.store(false, Ordering::Release);
        guard
    }

    /// Mark the running batch as having processed its final chunk
    pub fn finish_batch(&self, _guard: MutexGuard<'_, ()>) {
        self.download_complete.store(true, Ordering::Release);
    }

    /// Exclusive access to the split-payload assembler
    pub async fn assembler(&self) -> MutexGuard<'_, PayloadAssembler> {
        self.assembler.lock().await
    }
}

// ============================================================================
// Session Manager
// ============================================================================

/// Owns all live sessions
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionManagerInner>,
}

struct SessionManagerInner {
    /// Sessions indexed by correlation id
    sessions: RwLock<HashMap<String, Arc<Session>>>,

    /// Idle time before a session is dropped
    ttl: chrono::Duration,
}

impl SessionManager {
    /// Create a manager with the default TTL
    pub fn new() -> Self {
        Self::with_ttl(chrono::Duration::hours(SESSION_TTL_HOURS))
    }

    /// Create a manager with a custom idle TTL
    pub fn with_ttl(ttl: chrono::Duration) -> Self {
        Self {
            inner: Arc::new(SessionManagerInner {
                sessions: RwLock::new(HashMap::new()),
                ttl,
            }),
        }
    }

    // ========================================================================
    // Session Lifecycle
    // ========================================================================

    /// Get a session, creating it on first use
    pub async fn get_or_create(&self, id: &str) -> Arc<Session> {
        if let Some(session) = self.get(id).await {
            return session;
        }

        let mut sessions = self.inner.sessions.write().await;
        let session = sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                tracing::info!(session_id = %id, "Created session");
                Arc::new(Session::new(id.to_string()))
            })
            .clone();
        session.touch();
        session
    }

    /// Get an existing session
    pub async fn get(&self, id: &str) -> Option<Arc<Session>> {
        let sessions = self.inner.sessions.read().await;
        let session = sessions.get(id).cloned();
        if let Some(session) = &session {
            session.touch();
        }
        session
    }

    /// Drop a session and its stored buffers
    pub async fn remove(&self, id: &str) -> Result<Arc<Session>, AppError> {
        let session = {
            let mut sessions = self.inner.sessions.write().await;
            sessions
                .remove(id)
                .ok_or_else(|| AppError::SessionNotFound(id.to_string()))?
        };

        let stored_items = session.store().len().await;
        let age_secs = (Utc::now() - session.created_at()).num_seconds();
        tracing::info!(
            session_id = %id,
            stored_items = stored_items,
            age_secs = age_secs,
            "Session removed"
        );

        Ok(session)
    }

    /// Number of live sessions
    pub async fn session_count(&self) -> usize {
        let sessions = self.inner.sessions.read().await;
        sessions.len()
    }

    // ========================================================================
    // Cleanup
    // ========================================================================

    /// Drop sessions idle longer than the TTL
    ///
    /// Returns the number of sessions removed
    pub async fn cleanup_expired(&self) -> usize {
        let expired: Vec<String> = {
            let sessions = self.inner.sessions.read().await;
            sessions
                .values()
                .filter(|s| s.is_expired(self.inner.ttl))
                .map(|s| s.id().to_string())
                .collect()
        };

        let mut count = 0;
        for id in expired {
            if self.remove(&id).await.is_ok() {
                count += 1;
            }
        }

        if count > 0 {
            tracing::info!(count = count, "Cleaned up expired sessions");
        }

        count
    }

    /// Start background cleanup task
    pub fn start_cleanup_task(self, every: std::time::Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);

            loop {
                interval.tick().await;
                self.cleanup_expired().await;
            }
        })
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn test_get_or_create_reuses_session() {
        let manager = SessionManager::new();

        let a = manager.get_or_create("s1").await;
        a.store().put("x", Bytes::from_static(b"1")).await;

        let b = manager.get_or_create("s1").await;
        assert!(b.store().has("x").await);
        assert_eq!(manager.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let manager = SessionManager::new();

        let a = manager.get_or_create("a").await;
        let b = manager.get_or_create("b").await;
        a.store().put("x", Bytes::from_static(b"1")).await;

        let guard = a.begin_batch().await;
        a.finish_batch(guard);

        assert!(!b.store().has("x").await);
        assert!(a.is_download_complete());
        assert!(!b.is_download_complete());
    }

    #[tokio::test]
    async fn test_batch_flag_lifecycle() {
        let manager = SessionManager::new();
        let session = manager.get_or_create("s").await;
        assert!(!session.is_download_complete());

        let guard = session.begin_batch().await;
        assert!(!session.is_download_complete());
        session.finish_batch(guard);
        assert!(session.is_download_complete());

        // A new batch clears the flag until it finishes
        let _guard = session.begin_batch().await;
        assert!(!session.is_download_complete());
    }

    #[tokio::test]
    async fn test_remove_session() {
        let manager = SessionManager::new();
        manager.get_or_create("s").await;

        manager.remove("s").await.unwrap();
        assert!(manager.get("s").await.is_none());
        assert!(matches!(
            manager.remove("s").await,
            Err(AppError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let manager = SessionManager::with_ttl(chrono::Duration::zero());
        manager.get_or_create("old").await;

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        assert_eq!(manager.cleanup_expired().await, 1);
        assert_eq!(manager.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_cleanup_task_drops_idle_sessions() {
        let manager = SessionManager::with_ttl(chrono::Duration::zero());
        manager.get_or_create("idle").await;

        let task = manager
            .clone()
            .start_cleanup_task(std::time::Duration::from_millis(10));

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        task.abort();

        assert_eq!(manager.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_removal_from_spawned_task() {
        let manager = SessionManager::new();
        manager.get_or_create("s").await;

        let handle = tokio::spawn({
            let manager = manager.clone();
            async move { manager.remove("s").await.is_ok() }
        });

        assert!(handle.await.unwrap());
        assert_eq!(manager.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_cleanup_keeps_active() {
        let manager = SessionManager::new();
        manager.get_or_create("fresh").await;

        assert_eq!(manager.cleanup_expired().await, 0);
        assert_eq!(manager.session_count().await, 1);
    }
}
