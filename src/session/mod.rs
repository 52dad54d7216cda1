//! Session Module
//!
//! Correlation scopes for download/compare cycles. A session owns the
//! fetched buffers, the download-completeness flag and any half-delivered
//! reference payload of one client.

pub mod manager;
pub mod reassembly;

pub use manager::{Session, SessionManager, DEFAULT_SESSION_ID, SESSION_TTL_HOURS};
pub use reassembly::{Assembly, PayloadAssembler, Phase};
