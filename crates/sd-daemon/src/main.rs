//! sd-daemon entry point.
//!
//! This file is intentionally thin: it loads config, sets up tracing, builds
//! the shared state, wires middleware, and starts the HTTP server. All route
//! handlers live in `routes.rs`; all shared state types live in `state.rs`.

use std::sync::Arc;

use anyhow::Context;
use sd_daemon::{config::DaemonConfig, middleware, routes, state};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env.local / .env if present (dev convenience).
    // Silent if the files do not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = DaemonConfig::from_env().context("invalid configuration")?;
    info!(
        catalog = %cfg.catalog_path.display(),
        upstream = %cfg.yahoo_base_url,
        history_start = %cfg.stock_history_start,
        "config loaded"
    );

    // The catalog is not read here; the first /top-stocks request populates it.
    let shared = Arc::new(state::AppState::from_config(&cfg));

    let app = middleware::apply(routes::build_router(Arc::clone(&shared)), &cfg.cors_allow_origins);

    let addr = cfg.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!("Server running on port {}", cfg.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => {
            tracing::warn!(error = %e, "ctrl-c handler unavailable; running until killed");
            std::future::pending::<()>().await;
        }
    }
}
