use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::web::{handlers, state::AppState};

pub fn build_router(state: AppState) -> Router {
    let ajax_path = state.config.ajax_path.clone();

    Router::new()
        .route("/health", get(handlers::healthcheck))
        .route("/nav", get(handlers::navigation))
        .route("/cart-badge/config", get(handlers::client_config))
        .route(&ajax_path, post(handlers::ajax))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
