//! Route modules for Vidmatch Server

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderMap, StatusCode},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::session::DEFAULT_SESSION_ID;
use crate::state::AppState;

pub mod health;
pub mod media;

/// Header naming the session a request belongs to
pub const SESSION_HEADER: &str = "x-session-id";

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.config().server.max_body_bytes;

    Router::new()
        .merge(health::router())
        .merge(media::router())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Session id from the request headers, or the shared default session
pub fn session_id(headers: &HeaderMap) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_SESSION_ID)
        .to_string()
}

/// OPTIONS without CORS preflight headers
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_id_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static(" client-7 "));
        assert_eq!(session_id(&headers), "client-7");
    }

    #[test]
    fn test_session_id_default() {
        assert_eq!(session_id(&HeaderMap::new()), DEFAULT_SESSION_ID);

        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static(""));
        assert_eq!(session_id(&headers), DEFAULT_SESSION_ID);
    }
}
