//! services/api/src/web/auth.rs
//!
//! Authentication endpoints backed by the mock session store.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use nihongo_core::domain::User;
use std::sync::Arc;

use crate::web::{
    protocol::{
        port_rejection, AuthResponse, ErrorBody, LoginRequest, Rejection, RegisterRequest,
    },
    state::AppState,
};

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/login - Log in with an email/username and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, Rejection> {
    let user = state
        .store
        .login(&req.identifier, &req.password)
        .await
        .map_err(port_rejection)?;
    Ok(Json(AuthResponse::from_user(user)))
}

/// POST /auth/register - Create a new learner account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 409, description = "Email already registered", body = ErrorBody)
    )
)]
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, Rejection> {
    let user = state
        .store
        .register(req.into())
        .await
        .map_err(port_rejection)?;
    Ok((StatusCode::CREATED, Json(AuthResponse::from_user(user))))
}

/// POST /auth/callback - Accept a user authenticated by an external provider
///
/// The body is the user profile returned by the identity provider.
#[utoipa::path(
    post,
    path = "/auth/callback",
    responses(
        (status = 200, description = "Session installed", body = AuthResponse)
    )
)]
pub async fn callback_handler(
    State(state): State<Arc<AppState>>,
    Json(user): Json<User>,
) -> Json<AuthResponse> {
    Json(AuthResponse::from_user(state.store.login_success(user)))
}

/// POST /auth/logout - End the current session
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Logged out (also when no session was active)")
    )
)]
pub async fn logout_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    state.store.logout();
    StatusCode::NO_CONTENT
}
