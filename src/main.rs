//! Image relay server.
//!
//! ```text
//!   Browser                    ┌──────────────────────────────────────────┐
//!   ─────────────────────────▶ │ request id → trace → CORS                │
//!   GET  /health               │        │                                 │
//!   GET  /proxy-image?url=     │        ▼                                 │
//!   POST /download-image       │  handlers ──▶ relay::policy (allow-list) │
//!                              │        │                                 │
//!                              │        ▼                                 │
//!   ◀───────────────────────── │  relay::fetch ──────────────────────────┼──▶ Upstream
//!   bytes or data URI JSON     └──────────────────────────────────────────┘    image host
//! ```

use image_relay::config::{load_from_env, LoadedConfig};
use image_relay::lifecycle::startup;
use image_relay::observability::init_logging;
use image_relay::{HttpServer, Shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let LoadedConfig { config, source } = load_from_env()?;
    init_logging(&config.observability);

    tracing::info!("image-relay v{} starting", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &source {
        tracing::info!(path = %path.display(), "Loaded configuration file");
    }
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        allowed_hosts = ?config.upstream.allowed_hosts,
        host_match = ?config.upstream.host_match,
        timeout_secs = ?config.upstream.timeout_secs,
        "Configuration loaded"
    );

    let listener = startup::bind(&config).await?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
