//! Media Routes
//!
//! Endpoints:
//! - POST /download - Fetch a batch of media links into the session store
//! - POST /compare - Find stored items identical to a reference payload
//! - DELETE /session - Drop the session and its stored buffers

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, post},
    Router,
};

use super::{preflight, session_id};
use crate::error::{AppError, Result};
use crate::media::{find_matches, CompareResponse, MediaRequest, ReferenceBlob};
use crate::session::{Assembly, Phase};
use crate::state::AppState;

/// Acknowledgment sent for the first part of a split payload
pub const FIRST_PART_ACK: &str = "Processing big URL part 1";

/// Create the media router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/download", post(download).options(preflight))
        .route("/compare", post(compare).options(preflight))
        .route("/session", delete(delete_session))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /download
///
/// Fetches every listed item not yet stored, a chunk at a time, and
/// answers once all chunks have settled. Per-item failures are only logged.
async fn download(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode> {
    let request: MediaRequest = serde_json::from_slice(&body)?;
    let session = state.sessions().get_or_create(&session_id(&headers)).await;

    let batch = session.begin_batch().await;
    let report = state
        .fetcher()
        .fetch_batch(session.store(), &request.data)
        .await;
    session.finish_batch(batch);

    tracing::info!(
        session_id = %session.id(),
        batch_id = %report.batch_id,
        stored_items = report.stored_items,
        "All chunks processed, total size of downloaded videos: {:.2} MB",
        report.stored_mb()
    );

    Ok(StatusCode::OK)
}

/// POST /compare
///
/// `isBigUrlDone` selects the payload phase: 0 complete, 1 first part
/// (acknowledged, nothing compared), 2 final part (compared).
async fn compare(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let session = state
        .sessions()
        .get(&session_id(&headers))
        .await
        .filter(|s| s.is_download_complete())
        .ok_or(AppError::DownloadsIncomplete)?;

    let request: MediaRequest = serde_json::from_slice(&body)?;
    let phase = Phase::try_from(request.is_big_url_done)?;

    let assembly = session.assembler().await.accept(phase, request.url)?;
    let payload = match assembly {
        Assembly::Pending => {
            tracing::debug!(session_id = %session.id(), "Stored first part of split payload");
            return Ok((StatusCode::OK, FIRST_PART_ACK).into_response());
        }
        Assembly::Complete(payload) => payload,
    };

    let reference = ReferenceBlob::from_base64(&payload)?;
    let candidates: Vec<String> = request.data.into_iter().map(|item| item.id).collect();
    let results = find_matches(&reference, &candidates, session.store()).await;

    tracing::info!(
        session_id = %session.id(),
        candidates = candidates.len(),
        matches = results.len(),
        "Comparison complete"
    );

    let body = serde_json::to_vec(&CompareResponse { results }).map_err(AppError::Encode)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// DELETE /session
async fn delete_session(State(state): State<AppState>, headers: HeaderMap) -> Result<StatusCode> {
    state.sessions().remove(&session_id(&headers)).await?;
    Ok(StatusCode::NO_CONTENT)
}
