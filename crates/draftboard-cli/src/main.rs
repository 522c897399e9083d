#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use draftboard_server::handler::{CustomRoutes, routes};
use draftboard_server::middleware::{
    RouterObservabilityExt, RouterOpenApiExt, RouterRecoveryExt, RouterSecurityExt,
    SecurityHeadersConfig,
};
use draftboard_server::service::ServiceState;

use crate::config::{Cli, MiddlewareConfig};
use crate::server::ServerError;

// Tracing target constants
pub const TRACING_TARGET_SERVER_STARTUP: &str = "draftboard_cli::server::startup";
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "draftboard_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "draftboard_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "Application terminated successfully"
        );
        process::exit(0);
    };

    let server_error = error.downcast_ref::<ServerError>();
    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %error,
            error_code = server_error.map(ServerError::error_code),
            suggestion = server_error.and_then(ServerError::suggestion),
            "Application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
        if let Some(suggestion) = server_error.and_then(ServerError::suggestion) {
            eprintln!("Hint: {suggestion}");
        }
    }

    process::exit(1);
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "Starting draftboard server"
    );

    cli.log();
    cli.validate()?;

    let state = ServiceState::from_config(&cli.service)
        .await
        .context("failed to create service state")?;
    let router = create_router(state, &cli.middleware);

    server::serve(router, cli.server).await?;

    Ok(())
}

/// Creates the router with all middleware layers applied.
///
/// Layers added last run first: recovery wraps observability, which wraps
/// the security layers around the routes.
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    let api_routes: Router = routes(CustomRoutes::new())
        .with_open_api(middleware.openapi.clone())
        .with_state(state);

    api_routes
        .with_security(&middleware.cors, &SecurityHeadersConfig::default())
        .with_observability()
        .with_recovery(&middleware.recovery)
}
