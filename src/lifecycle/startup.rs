//! Startup orchestration.
//!
//! Config is loaded and validated first, then the listener is bound; any
//! failure along the way is fatal.

use tokio::net::TcpListener;

use crate::config::RelayConfig;

/// Bind the configured listener and announce where the relay is reachable.
pub async fn bind(config: &RelayConfig) -> Result<TcpListener, std::io::Error> {
    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(address = %local_addr, "Image relay listening on port {}", local_addr.port());
    tracing::info!("Health check: http://localhost:{}/health", local_addr.port());

    Ok(listener)
}
