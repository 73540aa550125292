// src/routes/mod.rs
pub mod auth;
pub mod chat;
pub mod dashboard;

use std::path::Path;

use crate::state::SharedState;
use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::{services::ServeDir, trace::TraceLayer};

pub fn create_router() -> Router<SharedState> {
    let auth_routes = Router::new()
        .route("/login", post(auth::login_handler))
        .route("/register", post(auth::register_handler))
        .route("/federated", post(auth::federated_handler))
        .route("/logout", post(auth::logout_handler))
        .route("/status", get(auth::status_handler));

    let chat_routes = Router::new()
        .route("/", get(chat::snapshot_handler))
        .route("/open", post(chat::open_handler))
        .route("/close", post(chat::close_handler))
        .route("/messages", post(chat::send_handler))
        .route("/cancel", post(chat::cancel_handler))
        .route("/events", get(chat::events_handler));

    let api_routes = Router::new()
        .route("/session", get(dashboard::session_handler))
        .route("/theme", put(dashboard::set_theme_handler))
        .route("/theme/toggle", post(dashboard::toggle_theme_handler))
        .route("/pages/{page}", get(dashboard::page_handler))
        .route("/nav", get(dashboard::nav_handler))
        .route("/views/{name}", get(dashboard::view_handler))
        .route("/hire", post(dashboard::hire_handler))
        .nest("/auth", auth_routes)
        .nest("/chat", chat_routes);

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(|| async { "OK" }))
        .layer(TraceLayer::new_for_http())
}

/// Serve the front-end pages from `dir` for any path the API does not claim.
/// The pages ship separately; without them only the API is mounted.
pub fn with_static_files(router: Router<SharedState>, dir: &Path) -> Router<SharedState> {
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "front-end directory missing, serving the API only");
        return router;
    }
    router.fallback_service(ServeDir::new(dir))
}
