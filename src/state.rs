//! Application state management

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::media::{ChunkedFetcher, HttpMediaSource, MediaSource};
use crate::session::SessionManager;

/// Error type for state initialization
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    sessions: SessionManager,
    fetcher: ChunkedFetcher,
}

impl AppState {
    /// Create application state fetching media over HTTP
    pub fn new(config: Config) -> Result<Self, StateError> {
        let source = HttpMediaSource::new(
            Duration::from_secs(config.fetch.timeout_secs),
            &config.fetch.user_agent,
        )?;
        Ok(Self::with_source(config, Arc::new(source)))
    }

    /// Create application state with a custom media source
    pub fn with_source(config: Config, source: Arc<dyn MediaSource>) -> Self {
        let fetcher = ChunkedFetcher::with_chunk_size(source, config.fetch.chunk_size);
        let sessions = SessionManager::with_ttl(chrono::Duration::hours(config.sessions.ttl_hours));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                sessions,
                fetcher,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the session manager
    pub fn sessions(&self) -> &SessionManager {
        &self.inner.sessions
    }

    /// Get the batch fetcher
    pub fn fetcher(&self) -> &ChunkedFetcher {
        &self.inner.fetcher
    }
}
