use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use persona_rag::core::config::{AppConfig, AppPaths};
use persona_rag::core::logging;
use persona_rag::server::router::router;
use persona_rag::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let paths = AppPaths::new();
    logging::init(&paths);

    let config = AppConfig::from_env()?;
    let port = config.port;
    let state = AppState::initialize(config, paths).await?;

    let bind_addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    println!("PERSONA_PORT={}", addr.port());
    tracing::info!("Listening on {}", addr);

    let app: Router = router(state.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    state.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to install ctrl-c handler");
    }
}
