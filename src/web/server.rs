//! HTTP server for the blob API.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{BlobSettings, Config, WebConfig};
use crate::storage::BlobStore;
use crate::{BlobError, Result};

use super::handlers::AppState;
use super::router::create_router;

/// Web server for the blob API.
pub struct BlobServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Web configuration.
    web_config: WebConfig,
}

impl BlobServer {
    /// Create a new server from an opened store and loaded settings.
    pub fn new(config: &Config, store: BlobStore, settings: BlobSettings) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| BlobError::Config(format!("invalid server address: {e}")))?;

        Ok(Self {
            addr,
            app_state: Arc::new(AppState::new(store, settings)),
            web_config: config.web.clone(),
        })
    }

    /// Open the store under `config.storage.root` and load its `.env`
    /// settings.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = BlobStore::open(&config.storage.root)?;
        let settings = BlobSettings::load(config.storage.env_path());
        Self::new(config, store, settings)
    }

    /// Get the configured server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    async fn bind(self) -> std::io::Result<(TcpListener, axum::Router)> {
        if !self.app_state.settings.has_key() {
            tracing::warn!("HALAL_BLOB_KEY is not set; every request will be rejected");
        }

        let router = create_router(self.app_state, &self.web_config);
        let listener = TcpListener::bind(self.addr).await?;
        tracing::info!("Blob server listening on http://{}", listener.local_addr()?);
        Ok((listener, router))
    }

    /// Run the server until it fails.
    pub async fn run(self) -> std::io::Result<()> {
        let (listener, router) = self.bind().await?;
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    }

    /// Run the server in the background and return the bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let (listener, router) = self.bind().await?;
        let local_addr = listener.local_addr()?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            {
                tracing::error!("Blob server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
