//! Relay server listener
//!
//! Binds the HTTP listener, starts the dispatch loop and serves the router.

use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::error::{Error, Result};
use crate::registry::RelayConfig;
use crate::relay::StationRelay;
use crate::server::config::ServerConfig;
use crate::server::routes::create_router;

/// HTTP front end for a [`StationRelay`]
pub struct RelayServer {
    config: ServerConfig,
    relay: Arc<StationRelay>,
}

impl RelayServer {
    /// Create a new server with default relay configuration
    pub fn new(config: ServerConfig) -> Self {
        Self::with_relay_config(config, RelayConfig::default())
    }

    /// Create a new server with custom relay configuration
    pub fn with_relay_config(config: ServerConfig, relay_config: RelayConfig) -> Self {
        Self::with_relay(config, Arc::new(StationRelay::with_config(relay_config)))
    }

    /// Create a server around an existing relay
    pub fn with_relay(config: ServerConfig, relay: Arc<StationRelay>) -> Self {
        Self { config, relay }
    }

    /// Get a reference to the relay
    pub fn relay(&self) -> &Arc<StationRelay> {
        &self.relay
    }

    /// Build the router without binding
    pub fn router(&self) -> Router {
        create_router(Arc::clone(&self.relay), &self.config)
    }

    /// Run the server
    ///
    /// This method blocks until the listener fails.
    pub async fn run(&self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already-bound listener until `shutdown` resolves
    ///
    /// Open event streams are not drained; they end when the runtime does.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr = listener.local_addr()?;
        tracing::info!(addr = %addr, "Relay server listening");

        // Spawn the dispatch loop
        let dispatch_handle = self.relay.start_dispatch()?;

        let result = tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = axum::serve(listener, self.router()).into_future() => {
                result.map_err(Error::from)
            }
        };

        // Stop dispatching on shutdown
        dispatch_handle.abort();

        result
    }

    /// Get the bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }
}
