//! Vidmatch Server Library
//!
//! Fetches batches of remote media into per-session memory stores and finds
//! which stored items are byte-identical to a reference payload. The server
//! binary is in main.rs.
//!
//! # Modules
//!
//! - `media`: digests, content store, chunked fetching, comparison
//! - `session`: per-client state and split-payload reassembly
//! - `routes`: HTTP surface

pub mod config;
pub mod error;
pub mod media;
pub mod routes;
pub mod session;
pub mod state;

pub use config::Config;
pub use error::AppError;
pub use state::AppState;
