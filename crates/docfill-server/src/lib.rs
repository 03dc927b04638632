//! HTTP boundary for Docfill.
//!
//! Every route lives under `/api`. Handlers are thin: they translate HTTP
//! into [`docfill_application::DocumentUseCase`] calls and map
//! [`docfill_core::DocfillError`] onto status codes in [`error`].

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;

pub use app::{AppState, build_state};

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use docfill_core::config::ServerConfig;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Default `tracing` filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "docfill_server=info,docfill_application=info,tower_http=info";

/// Builds the full router with all routes and middleware.
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/upload", post(handlers::upload::upload))
        .route(
            "/session/:id",
            get(handlers::session::get_session).delete(handlers::session::delete_session),
        )
        .route("/session/:id/next", get(handlers::session::next_question))
        .route("/session/:id/answers", post(handlers::session::submit_answer))
        .route(
            "/session/:id/ai/questions",
            post(handlers::ai::generate_questions),
        )
        .route("/session/:id/generate", post(handlers::generate::generate));

    Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(server.max_upload_bytes))
        .layer(cors_layer(&server.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the configured browser origins. Origins that are not valid
/// header values are skipped with a warning.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(300))
}
