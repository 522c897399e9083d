//! Health check handlers.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use draftboard_postgres::PgClient;

use crate::extract::Json;
use crate::handler::Result;
use crate::handler::response::{DatabaseStatus, MonitorStatus, ServiceStatus};
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "draftboard_server::handler::monitors";

/// Reports whether the server and its database answer.
#[tracing::instrument(skip_all)]
async fn health_status(
    State(postgres): State<Option<PgClient>>,
) -> Result<(StatusCode, Json<MonitorStatus>)> {
    let mut response = MonitorStatus::default();

    if let Some(postgres) = postgres {
        let pool_status = postgres.pool_status();

        response.status = match postgres.ping().await {
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    "Database health check failed",
                );
                ServiceStatus::Unhealthy
            }
            Ok(()) if pool_status.is_under_pressure() => ServiceStatus::Degraded,
            Ok(()) => ServiceStatus::Healthy,
        };

        response.database = Some(DatabaseStatus::from(pool_status));
    }

    let status_code = match response.status {
        ServiceStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        ServiceStatus::Healthy | ServiceStatus::Degraded => StatusCode::OK,
    };

    tracing::debug!(
        target: TRACING_TARGET,
        status = ?response.status,
        status_code = status_code.as_u16(),
        "Health status response prepared",
    );

    Ok((status_code, Json(response)))
}

fn health_status_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get health status")
        .description("Reports the server status and database connection pool usage.")
        .response::<200, Json<MonitorStatus>>()
        .response::<503, Json<MonitorStatus>>()
}

/// Returns a [`Router`] with the health check route.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/api/health", get_with(health_status, health_status_docs))
        .with_path_items(|item| item.tag("Monitors"))
}
