//! Bearer token authentication.
//!
//! [`AuthHeader`] verifies the token alone. [`AuthState`] additionally
//! resolves the token subject to a stored account and is what handlers use.

mod auth_claims;
mod auth_state;

pub use self::auth_claims::{AuthClaims, AuthHeader};
pub use self::auth_state::AuthState;

/// Tracing target for authentication.
pub(crate) const TRACING_TARGET_AUTHENTICATION: &str = "draftboard_server::extract::auth";
