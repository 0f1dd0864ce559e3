//! HTTP adapter - REST API over the progression engine.

pub mod interview;

use axum::Router;

use crate::application::ProgressionEngine;

pub use interview::InterviewHandlers;

/// Builds the `/api` router.
pub fn api_router(engine: ProgressionEngine) -> Router {
    let handlers = InterviewHandlers::new(engine);
    Router::new()
        .nest("/api/sessions", interview::session_routes(handlers.clone()))
        .nest("/api/presets", interview::preset_routes(handlers))
}
