use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use atelier_core::health::{healthz, readyz};
use atelier_core::middleware::request_id_layer;

use crate::handlers::{
    code::request_code,
    profile::get_profile,
    token::{create_token, refresh_token, revoke_token},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Sign-in code
        .route("/auth/code", post(request_code))
        // Token
        .route("/auth/token", post(create_token))
        .route("/auth/token", patch(refresh_token))
        .route("/auth/token", delete(revoke_token))
        // Profile
        .route("/auth/profile", get(get_profile))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
