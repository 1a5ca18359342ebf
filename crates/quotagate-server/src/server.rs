//! Listener setup and graceful shutdown.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use quotagate_account::sql::{SqlStore, SqlStoreConfig};
use quotagate_account::{AccountStore, MemoryStore};
use quotagate_config::{Config, StoreConfig};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api;
use crate::error::ServerError;
use crate::state::AppState;

/// Default graceful shutdown timeout.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration =
    Duration::from_secs(quotagate_core::DEFAULT_SHUTDOWN_TIMEOUT_SECS);

/// Open the account store selected by `store.backend`.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn AccountStore>, ServerError> {
    match config.backend.as_str() {
        "memory" => {
            warn!("using in-memory account store, state is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        "sql" => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| ServerError::Config("store.database_url is required".into()))?;
            let store = SqlStore::connect(
                SqlStoreConfig::new(url)
                    .max_connections(config.max_connections)
                    .min_connections(config.min_connections)
                    .connect_timeout(Duration::from_secs(config.connect_timeout_secs)),
            )
            .await?;
            if config.auto_migrate {
                store.migrate().await?;
            }
            info!(db_type = ?store.database_type(), "sql account store ready");
            Ok(Arc::new(store))
        }
        other => Err(ServerError::Config(format!("unknown store backend: {other}"))),
    }
}

/// Serve the API on `listener` until `shutdown` is cancelled.
///
/// In-flight requests get `grace` to finish after cancellation.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    grace: Duration,
    shutdown: CancellationToken,
) -> Result<(), ServerError> {
    let addr = listener.local_addr()?;
    info!(%addr, "quotagate listening");

    let token = shutdown.clone();
    let server = axum::serve(listener, api::router(state))
        .with_graceful_shutdown(async move { token.cancelled().await })
        .into_future();

    let deadline = async {
        shutdown.cancelled().await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => result?,
        _ = deadline => warn!(?grace, "shutdown timeout, dropping in-flight requests"),
    }

    info!("server stopped");
    Ok(())
}

/// Run the server with a cancellation token for graceful shutdown.
pub async fn run_with_shutdown(config: Config, shutdown: CancellationToken) -> Result<(), ServerError> {
    let store = open_store(&config.store).await?;
    let state = AppState::from_config(&config, store)?;
    let listener = TcpListener::bind(&config.server.listen).await?;
    serve(
        listener,
        state,
        Duration::from_secs(config.server.shutdown_timeout_secs),
        shutdown,
    )
    .await
}

/// Run the server (blocking until error, no graceful shutdown).
pub async fn run(config: Config) -> Result<(), ServerError> {
    run_with_shutdown(config, CancellationToken::new()).await
}
