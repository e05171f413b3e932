//! HTTP API module
//!
//! The command/control boundary exposed to the presentation surfaces.

pub mod access;
pub mod handlers;
pub mod responses;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use access::require_access;
use handlers::*;

/// Create the HTTP router with all endpoints
///
/// Everything but `/health` sits behind the control token and origin check.
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .route("/unlock", post(unlock_handler))
        .route("/lock", post(lock_handler))
        .route(
            "/passcode",
            get(get_passcode_handler)
                .put(set_passcode_handler)
                .delete(reset_passcode_handler),
        )
        .route(
            "/idle-timeout",
            get(get_idle_timeout_handler).put(set_idle_timeout_handler),
        )
        .route("/panic", post(panic_handler))
        .route("/content-data/clear", post(clear_content_data_handler))
        .route("/development", get(development_handler))
        .route("/disguise/digits", post(digit_handler).delete(clear_digits_handler))
        .route("/content/keys", post(content_key_handler))
        .route("/events", post(surface_event_handler))
        .route("/settings/open", post(open_settings_handler))
        .route("/settings/close", post(close_settings_handler))
        .route("/notifications", get(notifications_handler))
        .route("/menu", get(menu_handler))
        .route("/status", get(status_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_access))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http());

    let router = match state.access.cors_layer() {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.with_state(state)
}
