// Router and shared state

use crate::config::ServerConfig;
use crate::handlers;
use crate::renderer::Renderer;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// State shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub renderer: Arc<dyn Renderer>,
}

impl AppState {
    pub fn new(config: ServerConfig, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            config: Arc::new(config),
            renderer,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    // Configure CORS (browser front ends on other origins)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Enforced by the Json and Multipart extractors, so an oversized body
    // surfaces as a handler error with a JSON body
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/list_dot_files", get(handlers::list_dot_files))
        .route(
            "/list_signal_generator_images",
            get(handlers::list_signal_generator_images),
        )
        .route("/generate", post(handlers::generate_from_upload))
        .route(
            "/generate_from_existing",
            post(handlers::generate_from_existing),
        )
        .route("/image/:filename", get(handlers::serve_image))
        .route("/download/:filename", get(handlers::download_file))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
