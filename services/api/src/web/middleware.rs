//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::web::state::AppState;

/// Middleware that checks the bearer token against the active session.
///
/// If valid, inserts the current user's id into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Extract the bearer token
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Resolve the session user for this token
    let Some(user_id) = state.store.session_user_id(token.trim()) else {
        warn!("Rejected request to {} with a stale or unknown token", req.uri().path());
        return Err(StatusCode::UNAUTHORIZED);
    };

    // 3. Insert user_id into request extensions
    req.extensions_mut().insert(user_id);

    Ok(next.run(req).await)
}
