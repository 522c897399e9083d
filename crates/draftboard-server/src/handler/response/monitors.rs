//! Health check response types.

use draftboard_postgres::PgPoolStatus;
use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Overall health of the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// Every dependency answers.
    Healthy,
    /// Requests are served but the connection pool is saturated.
    Degraded,
    /// The database does not answer.
    Unhealthy,
}

/// Connection pool usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStatus {
    pub max_size: usize,
    pub size: usize,
    pub available: usize,
    pub waiting: usize,
    /// Share of the pool in use, from 0 to 1.
    pub utilization: f64,
}

impl From<PgPoolStatus> for DatabaseStatus {
    fn from(status: PgPoolStatus) -> Self {
        Self {
            utilization: status.utilization(),
            max_size: status.max_size,
            size: status.size,
            available: status.available,
            waiting: status.waiting,
        }
    }
}

/// Health check response.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatus {
    /// Timestamp when this status was generated.
    pub checked_at: Timestamp,
    pub status: ServiceStatus,
    /// Application version.
    pub version: String,
    /// Pool usage, absent when the server runs without a database.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseStatus>,
}

impl Default for MonitorStatus {
    fn default() -> Self {
        Self {
            checked_at: Timestamp::now(),
            status: ServiceStatus::Healthy,
            version: env!("CARGO_PKG_VERSION").to_owned(),
            database: None,
        }
    }
}
