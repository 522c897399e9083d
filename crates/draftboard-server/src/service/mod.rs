//! Application state and dependency injection.

mod auth_keys;
mod config;
mod service_state;

pub use crate::service::auth_keys::{AuthConfig, AuthKeys};
pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder};
pub use crate::service::service_state::ServiceState;
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};
