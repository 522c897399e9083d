//! Middleware for `axum::Router` and HTTP request processing.
//!
//! Each concern is an extension trait on the router:
//!
//! - [`RouterRecoveryExt`] converts panics and timeouts into error responses.
//! - [`RouterObservabilityExt`] adds request ids and tracing spans.
//! - [`RouterSecurityExt`] applies CORS, security headers and body limits.
//! - [`RouterOpenApiExt`] serves the OpenAPI document and the Scalar UI.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use axum::Router;
//! use draftboard_server::middleware::{
//!     CorsConfig, RecoveryConfig, RouterObservabilityExt, RouterRecoveryExt, RouterSecurityExt,
//!     SecurityHeadersConfig,
//! };
//!
//! let app: Router = Router::new()
//!     .with_security(&CorsConfig::default(), &SecurityHeadersConfig::default())
//!     .with_observability()
//!     .with_recovery(&RecoveryConfig::default());
//! ```

mod observability;
mod recovery;
mod security;
mod specification;

pub use observability::RouterObservabilityExt;
pub use recovery::{RecoveryConfig, RouterRecoveryExt};
pub use security::{
    CorsConfig, FrameOptions, ReferrerPolicy, RouterSecurityExt, SecurityHeadersConfig,
};
pub use specification::{OpenApiConfig, RouterOpenApiExt};
