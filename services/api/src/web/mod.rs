pub mod auth;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod state;

pub use middleware::require_auth;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::web::state::AppState;

/// A named client route and whether it needs a logged-in learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedRoute {
    pub name: &'static str,
    pub path: &'static str,
    pub requires_auth: bool,
}

/// The client's navigation table. Enforcement happens in [`require_auth`], per endpoint.
pub fn route_table() -> &'static [NamedRoute] {
    const ROUTES: &[NamedRoute] = &[
        NamedRoute { name: "home", path: "/", requires_auth: true },
        NamedRoute { name: "lessons", path: "/lessons", requires_auth: true },
        NamedRoute { name: "practice", path: "/practice", requires_auth: true },
        NamedRoute { name: "profile", path: "/profile", requires_auth: true },
        NamedRoute { name: "login", path: "/login", requires_auth: false },
    ];
    ROUTES
}

/// Builds the API router. CORS and other outer layers are added by the binary.
pub fn router(app_state: Arc<AppState>) -> Router {
    // "login" route: public
    let public_routes = Router::new()
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/callback", post(auth::callback_handler))
        .route("/auth/logout", post(auth::logout_handler));

    // "home", "lessons", "practice", "profile" routes: auth required
    let protected_routes = Router::new()
        .route(
            "/me",
            get(rest::get_profile_handler).patch(rest::update_profile_handler),
        )
        .route("/me/stats", get(rest::stats_handler))
        .route("/lessons", get(rest::list_lessons_handler))
        .route("/lessons/{id}", get(rest::get_lesson_handler))
        .route("/lessons/{id}/complete", post(rest::complete_lesson_handler))
        .route("/conversation", get(rest::conversation_handler))
        .route("/conversation/messages", post(rest::practice_handler))
        .route("/tutor/status", get(rest::tutor_status_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::protocol::{AuthResponse, PracticeResponse};
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use nihongo_core::{
        catalog::Catalog,
        domain::{Message, Sender, User, UserStats},
        fallback::{FallbackResponder, Topic},
        ports::NoDelay,
        store::StoreLatency,
    };
    use serde::de::DeserializeOwned;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use utoipa::OpenApi;

    fn test_router() -> Router {
        let state = AppState::new(
            Catalog::builtin(),
            Arc::new(FallbackResponder::seeded(11)),
            Arc::new(NoDelay),
            StoreLatency::default(),
        );
        router(Arc::new(state))
    }

    async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> T {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    async fn login(app: &Router) -> AuthResponse {
        let response = send(
            app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "identifier": "taro@example.jp", "password": "pw" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        read_json(response).await
    }

    #[test]
    fn route_table_flags_only_login_as_public() {
        let names: Vec<_> = route_table().iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["home", "lessons", "practice", "profile", "login"]);
        let public: Vec<_> = route_table()
            .iter()
            .filter(|r| !r.requires_auth)
            .map(|r| r.name)
            .collect();
        assert_eq!(public, vec!["login"]);
    }

    #[tokio::test]
    async fn login_then_fetch_profile() {
        let app = test_router();
        let auth = login(&app).await;
        assert!(auth.token.starts_with("mock_login_token_"));

        let response = send(&app, Method::GET, "/me", Some(&auth.token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let user: User = read_json(response).await;
        assert_eq!(user.name, "taro");
        assert_eq!(user.total_lessons, 20);
    }

    #[tokio::test]
    async fn rejected_credentials_are_401() {
        let app = test_router();
        let response = send(
            &app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "identifier": "fail@test.com", "password": "pw" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = read_json(response).await;
        assert_eq!(body["error"], "Invalid credentials. Please try again.");
    }

    #[tokio::test]
    async fn duplicate_registration_is_409() {
        let app = test_router();
        let response = send(
            &app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "duplicate@test.com", "password": "pw" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = send(
            &app,
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "email": "new@test.com", "password": "pw", "nativeLanguage": "French" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let auth: AuthResponse = read_json(response).await;
        assert_eq!(auth.user.native_language.as_deref(), Some("French"));
    }

    #[tokio::test]
    async fn protected_routes_need_current_token() {
        let app = test_router();
        let response = send(&app, Method::GET, "/lessons", None, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let auth = login(&app).await;
        let response = send(&app, Method::GET, "/lessons", Some("not-the-token"), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = send(&app, Method::GET, "/lessons", Some(&auth.token), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let lessons: Vec<Value> = read_json(response).await;
        assert_eq!(lessons.len(), 3);
    }

    #[tokio::test]
    async fn completing_lessons_updates_stats() {
        let app = test_router();
        let auth = login(&app).await;
        let token = Some(auth.token.as_str());

        let response = send(&app, Method::POST, "/lessons/1/complete", token, None).await;
        let stats: UserStats = read_json(response).await;
        assert_eq!(stats.completed_lessons, 1);
        assert_eq!(stats.progress_percentage, 5);

        let response = send(&app, Method::POST, "/lessons/77/complete", token, None).await;
        let stats: UserStats = read_json(response).await;
        assert_eq!(stats.completed_lessons, 1);

        let response = send(&app, Method::GET, "/lessons/77", token, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = read_json(response).await;
        assert_eq!(body["error"], "Item not found: lesson 77");
    }

    #[tokio::test]
    async fn practice_turn_appends_question_and_answer() {
        let app = test_router();
        let auth = login(&app).await;
        let token = Some(auth.token.as_str());

        let response = send(
            &app,
            Method::POST,
            "/conversation/messages",
            token,
            Some(json!({ "message": "Hello sensei" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let turn: PracticeResponse = read_json(response).await;
        assert_eq!(turn.answer.text, Topic::Greeting.reply());

        let response = send(&app, Method::GET, "/conversation", token, None).await;
        let log: Vec<Message> = read_json(response).await;
        assert_eq!(log.len(), 3);
        assert_eq!(log[1], turn.question);

        let response = send(&app, Method::GET, "/tutor/status", token, None).await;
        let status: Value = read_json(response).await;
        assert_eq!(status["configured"], false);
    }

    #[tokio::test]
    async fn logout_is_idempotent_and_revokes_token() {
        let app = test_router();
        let auth = login(&app).await;

        for _ in 0..2 {
            let response = send(&app, Method::POST, "/auth/logout", None, None).await;
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
        }

        let response = send(&app, Method::GET, "/me", Some(&auth.token), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn profile_update_and_federated_login() {
        let app = test_router();
        let response = send(
            &app,
            Method::POST,
            "/auth/callback",
            None,
            Some(json!({ "name": "Kenji", "email": "kenji@example.jp" })),
        )
        .await;
        let auth: AuthResponse = read_json(response).await;
        assert!(auth.token.starts_with("mock_token_"));
        assert!(!auth.user.id.is_nil());

        let response = send(
            &app,
            Method::PATCH,
            "/me",
            Some(&auth.token),
            Some(json!({ "learningGoal": "Business Japanese" })),
        )
        .await;
        let user: User = read_json(response).await;
        assert_eq!(user.name, "Kenji");
        assert_eq!(user.learning_goal.as_deref(), Some("Business Japanese"));

        // Practice messages carry the id assigned at callback time.
        let response = send(
            &app,
            Method::POST,
            "/conversation/messages",
            Some(&auth.token),
            Some(json!({ "message": "こんにちは" })),
        )
        .await;
        let turn: PracticeResponse = read_json(response).await;
        assert_eq!(turn.question.sender, Sender::User { user_id: Some(auth.user.id) });
    }

    #[test]
    fn api_doc_lists_every_routed_path() {
        let doc = rest::ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();
        for path in [
            "/auth/login",
            "/auth/callback",
            "/me",
            "/me/stats",
            "/lessons/{id}",
            "/lessons/{id}/complete",
            "/conversation/messages",
            "/tutor/status",
        ] {
            assert!(paths.contains(&path), "missing {}", path);
        }
    }
}
