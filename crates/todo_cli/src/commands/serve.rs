//! Serve command implementation.

use super::CliError;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use todo_server::{ServerConfig, TodoServer};
use todo_store::{Notebook, Store, StoreConfig};

/// Options for the serve command.
#[derive(Debug)]
pub struct ServeOptions {
    /// Data directory; `None` serves from memory.
    pub data_dir: Option<PathBuf>,
    /// Address to listen on.
    pub bind: SocketAddr,
    /// Route prefix.
    pub base_path: String,
    /// Request body limit in bytes.
    pub body_limit: usize,
    /// Whether to fsync on every commit.
    pub sync_on_commit: bool,
}

/// Runs the serve command until Ctrl-C or SIGTERM.
pub fn run(options: ServeOptions) -> Result<(), CliError> {
    let store_config = match &options.data_dir {
        Some(path) => StoreConfig::at(path),
        None => StoreConfig::in_memory(),
    }
    .sync_on_commit(options.sync_on_commit);

    let server_config = ServerConfig::new(options.bind)
        .with_base_path(options.base_path)
        .with_body_limit(options.body_limit);
    server_config.validate()?;

    let store = Arc::new(Store::open(store_config)?);
    if store.config().is_in_memory() {
        tracing::warn!("no data directory given, data will not survive a restart");
    }
    let server = TodoServer::new(server_config, Notebook::new(Arc::clone(&store)));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let served = runtime.block_on(server.serve(shutdown_signal()));

    // Close even if serving failed, so the last snapshot is flushed.
    let closed = store.close();
    served?;
    closed?;
    Ok(())
}

/// Completes on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(%error, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
