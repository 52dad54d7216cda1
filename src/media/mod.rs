//! Media Module
//!
//! Fetching remote media into memory and finding byte-identical copies:
//! - SHA-256 digests as an equality pre-filter
//! - Concurrent content store keyed by item id
//! - Chunked, bounded-concurrency batch fetching
//! - Exact comparison against a reference blob

pub mod comparator;
pub mod digest;
pub mod fetcher;
pub mod store;
pub mod types;

pub use comparator::{find_matches, is_identical, ReferenceBlob, DATA_URL_PREFIX};
pub use digest::compute_digest;
pub use fetcher::{ChunkedFetcher, FetchError, HttpMediaSource, MediaSource};
pub use store::ContentStore;
pub use types::*;
