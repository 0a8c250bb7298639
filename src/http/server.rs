//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the three relay endpoints
//! - Wire up middleware (request ID, tracing, CORS)
//! - Serve on a bound listener until shutdown

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::RelayConfig;
use crate::http::handlers;
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::signals::shutdown_signal;
use crate::relay::{FetchError, HostPolicy, HttpFetcher, ImageFetcher, Relay};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

/// HTTP server for the image relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a server that fetches through a pooled `reqwest` client.
    pub fn new(config: RelayConfig) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::from_config(&config.upstream)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Create a server around an arbitrary fetcher.
    pub fn with_fetcher(config: RelayConfig, fetcher: Arc<dyn ImageFetcher>) -> Self {
        let policy = HostPolicy::from_config(&config.upstream);
        tracing::debug!(
            allowed_hosts = ?config.upstream.allowed_hosts,
            host_match = ?policy.mode(),
            timeout_secs = ?config.upstream.timeout_secs,
            max_body_bytes = ?config.upstream.max_body_bytes,
            "Relay policy configured"
        );

        let state = AppState {
            relay: Arc::new(Relay::new(policy, fetcher)),
        };

        Self {
            router: Self::build_router(state),
            config,
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/health", get(handlers::health))
            .route("/proxy-image", get(handlers::proxy_image))
            .route("/download-image", post(handlers::download_image))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                    .layer(propagate_request_id_layer())
                    .layer(cors),
            )
    }

    /// Router with all layers applied, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Serve until Ctrl+C, SIGTERM, or a message on `shutdown`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown_signal() => {}
                    _ = shutdown.recv() => {
                        tracing::info!("Shutdown requested");
                    }
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
