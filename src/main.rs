use std::sync::Arc;

use anyhow::Context;
use marketers_hub::{config::AppConfig, routes, state::AppState};
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let public_dir = config.public_dir.clone();

    let state = Arc::new(AppState::from_config(config));
    if let Some(banner) = state.auth.banner() {
        tracing::error!("{}", banner);
    }
    if let Some(err) = state.chat.last_error() {
        tracing::warn!(error = %err, "support chat disabled");
    }

    let cors = CorsLayer::very_permissive();

    let app = routes::with_static_files(routes::create_router(), &public_dir)
        .with_state(state)
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("🚀 Marketer's Hub running at http://{}", bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
