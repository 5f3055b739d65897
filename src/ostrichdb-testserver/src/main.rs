use anyhow::Result;
use ostrichdb_testserver::{run, TestServerConfig};
use std::net::TcpListener;

mod telemetry;

#[actix_web::main]
async fn main() -> Result<()> {
    // Load configuration; the log directory it names is needed before
    // telemetry can start
    let loaded = TestServerConfig::load("testserver.json");
    let config = loaded.as_ref().cloned().unwrap_or_default();

    let _guard = telemetry::init_telemetry(config.log_dir.as_deref())?;

    if let Err(e) = &loaded {
        tracing::warn!("Failed to load testserver.json ({}), using defaults", e);
    }

    tracing::info!("ostrichdb-testserver starting");
    tracing::info!("  Bind address: {}", config.bind_addr());
    tracing::info!("  Workers: {}", config.workers);
    tracing::info!("  Token required: {}", config.token.is_some());

    let listener = TcpListener::bind(config.bind_addr())?;
    tracing::info!("Starting HTTP server on {}", listener.local_addr()?);

    run(listener, config)?.await?;

    tracing::info!("Server stopped");
    Ok(())
}
