use axum::routing::{get, post};
use axum::Router;

use super::handlers::{
    self, AppState,
};

/// Build the operator status surface
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/instances", get(handlers::list_instances))
        .route("/instances/:name", get(handlers::get_instance))
        .route("/instances/:name/start", post(handlers::start_instance))
        .route("/instances/:name/stop", post(handlers::stop_instance))
        .route("/instances/:name/restart", post(handlers::restart_instance))
        .with_state(state)
}
