//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the lesson, profile and practice endpoints
//! and the master definition for the OpenAPI specification.

use crate::web::{
    auth,
    protocol::{
        port_rejection, reject, AuthResponse, ErrorBody, LoginRequest, PracticeRequest, PracticeResponse,
        Rejection, RegisterRequest, TutorStatus,
    },
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use nihongo_core::{
    domain::{Lesson, LessonId, Message, User, UserStats, UserUpdate},
    ports::PortError,
};
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::login_handler,
        auth::register_handler,
        auth::callback_handler,
        auth::logout_handler,
        get_profile_handler,
        update_profile_handler,
        stats_handler,
        list_lessons_handler,
        get_lesson_handler,
        complete_lesson_handler,
        conversation_handler,
        practice_handler,
        tutor_status_handler,
    ),
    components(
        schemas(
            LoginRequest,
            RegisterRequest,
            AuthResponse,
            PracticeRequest,
            PracticeResponse,
            TutorStatus,
            ErrorBody,
        )
    ),
    tags(
        (name = "Nihongo Tutor API", description = "Lessons, learner profile and the AI practice chat.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Profile ("profile" and "home" routes)
//=========================================================================================

/// The learner behind the current session.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Current user"),
        (status = 401, description = "No active session")
    )
)]
pub async fn get_profile_handler(State(state): State<Arc<AppState>>) -> Result<Json<User>, Rejection> {
    state
        .store
        .user()
        .map(Json)
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "No active session"))
}

/// Merge profile fields into the current user.
#[utoipa::path(
    patch,
    path = "/me",
    responses(
        (status = 200, description = "Updated user"),
        (status = 401, description = "No active session")
    )
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<User>, Rejection> {
    state.store.update_user(update);
    get_profile_handler(State(state)).await
}

/// Dashboard progress figures.
#[utoipa::path(
    get,
    path = "/me/stats",
    responses((status = 200, description = "Progress statistics"))
)]
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> Json<UserStats> {
    Json(state.store.user_stats())
}

//=========================================================================================
// Lessons
//=========================================================================================

#[utoipa::path(
    get,
    path = "/lessons",
    responses((status = 200, description = "All lessons in catalog order"))
)]
pub async fn list_lessons_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Lesson>> {
    Json(state.store.lessons().to_vec())
}

#[utoipa::path(
    get,
    path = "/lessons/{id}",
    params(("id" = u32, Path, description = "Lesson id")),
    responses(
        (status = 200, description = "The lesson"),
        (status = 404, description = "No such lesson", body = ErrorBody)
    )
)]
pub async fn get_lesson_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<LessonId>,
) -> Result<Json<Lesson>, Rejection> {
    state
        .store
        .lesson(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| port_rejection(PortError::NotFound(format!("lesson {}", id))))
}

/// Mark a lesson as completed. Unknown ids are ignored.
#[utoipa::path(
    post,
    path = "/lessons/{id}/complete",
    params(("id" = u32, Path, description = "Lesson id")),
    responses((status = 200, description = "Progress after the update"))
)]
pub async fn complete_lesson_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<LessonId>,
) -> Json<UserStats> {
    state.store.complete_lesson(id);
    Json(state.store.user_stats())
}

//=========================================================================================
// Practice
//=========================================================================================

#[utoipa::path(
    get,
    path = "/conversation",
    responses((status = 200, description = "The practice transcript"))
)]
pub async fn conversation_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Message>> {
    Json(state.store.conversation())
}

/// Send a message to the tutor and get its reply. Always succeeds.
#[utoipa::path(
    post,
    path = "/conversation/messages",
    request_body = PracticeRequest,
    responses((status = 200, description = "The recorded question and answer", body = PracticeResponse))
)]
pub async fn practice_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<PracticeRequest>,
) -> Json<PracticeResponse> {
    let (question, answer) = state
        .store
        .practice(&req.message, Some(user_id), &req.context)
        .await;
    info!("Practice turn {} answered for user {}", question.id, user_id);
    Json(PracticeResponse { question, answer })
}

#[utoipa::path(
    get,
    path = "/tutor/status",
    responses((status = 200, description = "Whether the remote tutor is configured", body = TutorStatus))
)]
pub async fn tutor_status_handler(State(state): State<Arc<AppState>>) -> Json<TutorStatus> {
    Json(TutorStatus {
        configured: state.store.is_tutor_configured(),
    })
}
