pub mod generate;
pub mod health;
pub mod upload;

pub use generate::*;
pub use health::*;
pub use upload::*;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the application router.
///
/// Cross-origin headers are attached to every response and the permissive
/// CORS layer answers preflight requests, so browser front-ends on any
/// origin can call the endpoints directly.
pub fn router(state: AppState) -> Router {
    let max_body_bytes = state.config.max_file_size_mb * 1024 * 1024;

    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/upload", post(upload_handler).options(upload_preflight))
        .route("/generate", post(generate_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .with_state(state)
}
