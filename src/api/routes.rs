use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::{request_id_middleware, request_span};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/genres", get(handlers::list_genres))
        .route("/genres/:name/movies", get(handlers::genre_movies))
        // Selection
        .route("/selection", get(handlers::get_selection))
        .route("/selection/genre", post(handlers::pick_genre))
        .route("/selection/mood", post(handlers::pick_mood))
        .route("/selection/replay", post(handlers::replay))
        .route("/selection/reset", post(handlers::reset))
        .route("/selection/extra", post(handlers::fetch_extra))
}
