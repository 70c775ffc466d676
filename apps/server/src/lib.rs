//! # imghub server
//!
//! Wires configuration, storage and the images slice into an `Axum` application and serves it
//! with graceful shutdown.
//!
//! ## Example
//! ```no_run
//! use imghub_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(8080)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

mod router;
pub mod runtime;
mod state;

pub use router::DOCS_PATH;
pub use state::ApiState;

use anyhow::{Context, Result, anyhow};
use axum::Router;
use axum_server::Handle;
use imghub_domain::config::AppConfig;
use imghub_storage::Storage;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: AppConfig,
}

impl ServerBuilder {
    /// Set up the server's configuration.
    pub fn config(mut self, cfg: AppConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Consumes the builder and initializes the server.
    ///
    /// # Process
    /// 1. Validates the configuration
    /// 2. Opens the image store, creating the root directory if needed
    /// 3. Initializes the images slice (HTTP client, concurrency gate)
    /// 4. Constructs application state
    ///
    /// # Errors
    /// Returns an error if:
    /// * The configuration breaks an invariant (zero limits, empty public URL)
    /// * The storage root cannot be created or is not a directory
    /// * The HTTP client cannot be built
    pub async fn build(self) -> Result<Server> {
        self.cfg.validate().map_err(|e| anyhow!("Invalid configuration: {e}"))?;

        info!(address = %self.cfg.server.socket_addr(), "Initializing server");

        let storage = Storage::builder()
            .root(&self.cfg.storage.root)
            .connect()
            .await
            .context("Failed to open image storage")?;

        let images = imghub_images::init(&self.cfg, storage)
            .map_err(|e| anyhow!("Images slice bootstrap failed: {e}"))?;

        Ok(Server { state: ApiState { config: self.cfg, images } })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// The complete application router, without a listener.
    #[must_use]
    pub fn router(&self) -> Router {
        router::init(self.state.clone())
    }

    /// Starts the server and runs until the shutdown signal is received.
    ///
    /// In-flight requests get `server.shutdown_grace_secs` to finish once the signal arrives.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the configured address.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let address = cfg.server.socket_addr();
        let grace = cfg.server.shutdown_grace();

        let app = self.router();

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!(grace_secs = grace.as_secs(), "Shutdown signal received, draining requests");
            shutdown_handle.graceful_shutdown(Some(grace));
        });

        info!(
            address = %address,
            public_url = cfg.server.public_base(),
            storage = %self.state.images.storage().root().display(),
            docs = DOCS_PATH,
            "Starting HTTP server"
        );

        axum_server::bind(address)
            .handle(handle)
            .serve(app.into_make_service())
            .await
            .context("HTTP server failed")?;

        info!("Server shutdown complete");
        Ok(())
    }

    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }
}

/// Waits for SIGINT (Ctrl+C) or, on Unix, SIGTERM.
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => res?,
        res = terminate => res?,
    }

    Ok(())
}
