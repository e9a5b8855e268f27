//! warden server binary.
//!
//! - Config from `$WARDEN_CONFIG` (default `warden.yaml`, optional)
//! - HTTP/JSON policy calls under `/v1/casbin/`
//! - Graceful shutdown on Ctrl-C

use std::net::SocketAddr;
use std::process::ExitCode;

use tracing_subscriber::{fmt, EnvFilter};

use warden_core::error::{Result, WardenError};
use warden_server::{app_state, config, notify::Notifier, router};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "warden-server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let path = std::env::var(config::CONFIG_ENV).ok();
    let cfg = config::load(path.as_deref())?;
    let listen: SocketAddr = cfg
        .server
        .listen
        .parse()
        .map_err(|e| WardenError::BadRequest(format!("server.listen: {e}")))?;

    let (notifier, listener_task) = Notifier::spawn(cfg.server.notify_queue);
    let state = app_state::AppState::new(cfg, notifier);
    let app = router::build_router(state);

    tracing::info!(%listen, "warden-server starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| WardenError::Internal(format!("bind {listen}: {e}")))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| WardenError::Internal(format!("server failed: {e}")))?;

    listener_task.abort();
    tracing::info!("warden-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable");
        std::future::pending::<()>().await;
    }
}
