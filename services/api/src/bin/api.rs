//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{QwenTutorAdapter, TokioDelay},
    config::Config,
    error::ApiError,
    web::{self, state::AppState},
};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use nihongo_core::{catalog::Catalog, fallback::FallbackResponder};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Load the Lesson Catalog ---
    let catalog = match &config.lessons_path {
        Some(path) => {
            info!("Loading lessons from {}", path.display());
            Catalog::from_json(&std::fs::read_to_string(path)?)?
        }
        None => Catalog::builtin(),
    };
    info!("{} lessons available.", catalog.lessons().len());

    // --- 3. Initialize Service Adapters ---
    let tutor = QwenTutorAdapter::new(config.tutor_settings(), FallbackResponder::new())?;
    if config.qwen_api_key.is_none() {
        warn!("QWEN_API_KEY is not set. The tutor will only give canned replies.");
    }

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(
        catalog,
        Arc::new(tutor),
        Arc::new(TokioDelay),
        config.store_latency(),
    ));

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS origin '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    let app = web::router(app_state).layer(cors);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
