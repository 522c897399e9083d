//! HTTP server lifecycle.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use crate::config::ServerConfig;
use crate::server::{ServerError, ServerResult, shutdown_signal};
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Binds the configured address and serves `app` until a shutdown signal.
///
/// After the signal the server stops accepting connections and waits for
/// in-flight requests for at most [`ServerConfig::shutdown_timeout`].
pub async fn serve(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    if let Err(error) = server_config.validate() {
        return Err(ServerError::invalid_config(&error));
    }

    let server_addr = server_config.server_addr();
    let listener = TcpListener::bind(server_addr).await.map_err(|source| {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %server_addr,
            error = %source,
            "Failed to bind to address"
        );
        ServerError::bind_error(&server_addr.to_string(), source)
    })?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_addr,
        "Server is ready and listening for connections"
    );

    if server_config.binds_to_all_interfaces() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "Server is bound to all interfaces. Ensure firewall rules are properly configured."
        );
    }

    let shutdown_started = Arc::new(Notify::new());
    let signal = {
        let shutdown_started = Arc::clone(&shutdown_started);
        async move {
            shutdown_signal().await;
            shutdown_started.notify_one();
        }
    };

    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(signal)
    .into_future();

    let shutdown_timeout = server_config.shutdown_timeout();
    let deadline = async {
        shutdown_started.notified().await;
        tokio::time::sleep(shutdown_timeout).await;
    };

    tokio::select! {
        result = server => {
            result.map_err(|error| {
                tracing::error!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    error = %error,
                    "Server encountered an error"
                );
                ServerError::Runtime(error)
            })?;
            tracing::info!(target: TRACING_TARGET_SERVER_SHUTDOWN, "Server shut down gracefully");
        }
        () = deadline => {
            tracing::warn!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                timeout_secs = shutdown_timeout.as_secs(),
                "Shutdown timeout elapsed, dropping remaining connections"
            );
        }
    }

    Ok(())
}
