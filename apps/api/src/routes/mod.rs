pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::planner::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            delete(handlers::handle_delete_session),
        )
        // Learning plan
        .route(
            "/api/v1/sessions/:id/plan",
            post(handlers::handle_generate_plan).get(handlers::handle_get_plan),
        )
        .route(
            "/api/v1/sessions/:id/plan/export",
            get(handlers::handle_export_plan),
        )
        .with_state(state)
}
