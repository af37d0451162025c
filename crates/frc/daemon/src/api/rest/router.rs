//! API Router configuration

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Create the main API router
pub fn create_router(state: AppState, enable_cors: bool) -> Router {
    let router = Router::new()
        // Platform information and liveness
        .route("/", get(handlers::platform_info))
        .route("/health", get(handlers::health_check))
        // Scoring
        .route("/api/calculate-sfrc", post(handlers::calculate_sfrc))
        // Users
        .route("/api/users", get(handlers::list_users))
        .route("/api/users", post(handlers::create_user))
        .route("/api/users/:id", get(handlers::get_user))
        .route("/api/users/:id", delete(handlers::delete_user))
        // Protocols
        .route("/api/protocols", get(handlers::list_protocols))
        .route("/api/protocols", post(handlers::create_protocol))
        .route("/api/protocols/:slug", get(handlers::get_protocol))
        .route("/api/protocols/:slug", delete(handlers::delete_protocol))
        // Protocol sessions
        .route("/api/sessions", get(handlers::list_sessions))
        .route("/api/sessions", post(handlers::start_session))
        .route("/api/sessions/:id", get(handlers::get_session))
        .route("/api/sessions/:id/complete", post(handlers::complete_session))
        // Coherence logs
        .route("/api/coherence-logs", get(handlers::list_coherence_logs))
        // Admin statistics
        .route("/admin/api/stats", get(handlers::admin_stats))
        // Session tokens
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/auth/verify", get(handlers::verify_token))
        .layer(TraceLayer::new_for_http());

    let router = if enable_cors {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    };

    router.with_state(state)
}
