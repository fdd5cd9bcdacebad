use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // OAuth redirects -- the provider sends the browser here
    let callback_routes = Router::new()
        .route(handlers::LOGIN_CALLBACK_PATH, get(handlers::login_callback))
        .route(handlers::BOT_CALLBACK_PATH, get(handlers::bot_callback));

    let user_routes = Router::new()
        .route("/v1/users/:id", delete(handlers::revoke_user))
        .route("/v1/users/:id/name", get(handlers::get_display_name))
        .route("/v1/users/:id/verify", post(handlers::verify_user))
        .route(
            "/v1/users/:id/bot",
            get(handlers::bot_status).put(handlers::revoke_bot),
        );

    let notify_routes = Router::new()
        .route("/v1/notify", post(handlers::trigger_notify))
        .route("/v1/history", get(handlers::list_history))
        .route("/health", get(handlers::health));

    let mut router = Router::new()
        .merge(callback_routes)
        .merge(user_routes)
        .merge(notify_routes)
        .layer(TraceLayer::new_for_http());

    match state.config.server.frontend_uri.parse::<HeaderValue>() {
        Ok(origin) => {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(origin)
                    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE]),
            );
        }
        Err(e) => {
            tracing::warn!(error = %e, "FRONTEND_URI is not a valid origin, CORS disabled");
        }
    }

    router.with_state(state)
}
