//! HTTP surface
//!
//! Handler modules plus the route tree that mounts them. All endpoints
//! live under `/api/v1`; the only route outside it is the `/health`
//! probe. Register and login are public, everything else sits behind
//! the session middleware.

pub mod applications;
pub mod auth;
pub mod campaigns;
pub mod middleware;
pub mod notifications;
pub mod responses;
pub mod videos;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::get,
    Json, Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Assemble the `/api/v1` route tree
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Everything except register/login sits behind the auth middleware
    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .nest("/campaigns", campaigns::router())
        .nest("/applications", applications::router())
        .nest("/videos", videos::router())
        .nest("/notifications", notifications::router())
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::require_auth,
        ));

    Router::new()
        .nest("/auth", auth::public_router())
        .merge(protected_routes)
}

/// Full application router, ready to serve
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(cors_layer(cors_origin))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Credentials stay on so the session cookie can travel cross-origin.
fn cors_layer(origin: &str) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(origin.parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true)
}

/// Liveness probe, reachable without a session
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
