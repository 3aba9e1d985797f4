//! Router configuration for the lending desk.

use super::health::{health_check, readiness_check};
use super::state::AppState;
use crate::api::{components, reports, requests, users};
use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Health checks at the root, everything else under `/api`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Catalog
        .route(
            "/components",
            get(components::list_components).post(components::create_component),
        )
        .route(
            "/components/:id",
            put(components::update_component).delete(components::delete_component),
        )
        // Request lifecycle
        .route(
            "/requests",
            get(requests::list_requests).post(requests::submit_request),
        )
        .route("/requests/:id", get(requests::get_request))
        .route("/requests/:id/approve", post(requests::approve_request))
        .route("/requests/:id/reject", post(requests::reject_request))
        .route("/requests/:id/returns", post(requests::register_return))
        // Users
        .route("/users", get(users::list_users))
        .route("/users/:id", put(users::update_user))
        .route("/users/:id/requests", get(users::user_requests))
        // Reports
        .route("/reports/weekly", get(reports::weekly_report));

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
