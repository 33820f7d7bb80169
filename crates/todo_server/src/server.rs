//! HTTP server.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handlers::AppState;
use crate::routes::{create_app, App};
use axum::extract::Request;
use axum::ServiceExt;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use todo_store::Notebook;

/// The to-do HTTP server.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use todo_server::{ServerConfig, TodoServer};
/// use todo_store::{Notebook, Store};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let notebook = Notebook::new(Arc::new(Store::open_in_memory()?));
/// let server = TodoServer::new(ServerConfig::default().with_base_path("/to-do"), notebook);
/// server.serve(async { let _ = tokio::signal::ctrl_c().await; }).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TodoServer {
    config: ServerConfig,
    notebook: Notebook,
}

impl TodoServer {
    /// Creates a new server.
    pub fn new(config: ServerConfig, notebook: Notebook) -> Self {
        Self { config, notebook }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the notebook the server operates on.
    pub fn notebook(&self) -> &Notebook {
        &self.notebook
    }

    /// Builds the application service without binding a socket.
    pub fn app(&self) -> ServerResult<App> {
        create_app(&self.config, AppState::new(self.notebook.clone()))
    }

    /// Binds the configured address and serves until `shutdown` completes.
    pub async fn serve<F>(self, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.bind_addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.serve_on(listener, shutdown).await
    }

    /// Serves on an already bound listener until `shutdown` completes.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> ServerResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.app()?;
        let local: SocketAddr = listener.local_addr()?;
        tracing::info!(
            addr = %local,
            base_path = %self.config.base_path,
            "listening"
        );

        axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("server stopped");
        Ok(())
    }
}
