use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use sup_engine::adapters::rest::build_router;
use sup_engine::application::Application;
use sup_engine::constants::http::DEFAULT_HTTP_ADDR;
use sup_engine::domain::commands::LoadConfigCommand;
use sup_engine::infrastructure::{InMemoryInstanceRepository, TokioProcessExecutor};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SUP_CONFIG").ok())
        .map(PathBuf::from)
        .ok_or("usage: supd <ecosystem-file> (or set SUP_CONFIG)")?;
    let env_mode = std::env::var("SUP_ENV").ok();

    let repository = Arc::new(InMemoryInstanceRepository::new());
    let executor = Arc::new(TokioProcessExecutor::new());
    let app = Arc::new(Application::new(repository, executor));

    let cancellation_token = CancellationToken::new();
    app.spawn_background_tasks(cancellation_token.clone());

    let response = app
        .load_config()
        .execute(LoadConfigCommand {
            path: config_path,
            env_mode,
        })
        .await?;
    info!(started = response.started.len(), "supervisor up");
    for failure in &response.failed {
        warn!(process = %failure.name, error = %failure.error, "entry not started");
    }

    let addr: SocketAddr = std::env::var("SUP_HTTP_ADDR")
        .unwrap_or_else(|_| DEFAULT_HTTP_ADDR.to_string())
        .parse()?;
    let router = build_router(app.clone());

    info!(addr = %addr, "status surface listening");
    let server = axum::Server::bind(&addr)
        .serve(router.into_make_service())
        .with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        error!(error = %e, "server error");
    }

    cancellation_token.cancel();
    info!("supervisor shut down");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
