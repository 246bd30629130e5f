//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the browser client and the API.

use axum::{http::StatusCode, Json};
use nihongo_core::{
    domain::{Message, Registration, User},
    ports::PortError,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

//=========================================================================================
// Requests
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Email address or plain username.
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: String,
    pub name: Option<String>,
    pub native_language: Option<String>,
    pub learning_goal: Option<String>,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Self {
            email: req.email,
            phone: req.phone,
            password: req.password,
            name: req.name,
            native_language: req.native_language,
            learning_goal: req.learning_goal,
        }
    }
}

/// A learner message for the practice chat.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PracticeRequest {
    pub message: String,
    /// Free-form context appended to the tutor persona, e.g. the current lesson.
    #[serde(default)]
    pub context: String,
}

//=========================================================================================
// Responses
//=========================================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    #[schema(value_type = Object)]
    pub user: User,
    pub token: String,
}

impl AuthResponse {
    pub fn from_user(user: User) -> Self {
        let token = user.auth_token.clone().unwrap_or_default();
        Self { user, token }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PracticeResponse {
    #[schema(value_type = Object)]
    pub question: Message,
    #[schema(value_type = Object)]
    pub answer: Message,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TutorStatus {
    /// Whether replies come from the remote model rather than canned answers.
    pub configured: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// The error half of every handler's result.
pub type Rejection = (StatusCode, Json<ErrorBody>);

pub fn reject(status: StatusCode, message: impl Into<String>) -> Rejection {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

impl From<PortError> for ErrorBody {
    fn from(e: PortError) -> Self {
        Self {
            error: e.to_string(),
        }
    }
}

/// Maps a core error onto the HTTP status a client should see.
pub fn port_rejection(e: PortError) -> Rejection {
    let status = match &e {
        PortError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        PortError::DuplicateAccount => StatusCode::CONFLICT,
        PortError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(e.into()))
}
