//! Request extractors.
//!
//! - [`AuthHeader`] decodes and verifies the bearer token.
//! - [`AuthState`] resolves the token's subject to an [`Account`].
//! - [`Json`], [`ValidateJson`] and [`Path`] replace their axum counterparts
//!   and reject with the server's JSON error body.
//!
//! [`Account`]: draftboard_core::types::Account

pub mod auth;
pub mod reject;

pub use crate::extract::auth::{AuthClaims, AuthHeader, AuthState};
pub use crate::extract::reject::{Json, Path, ValidateJson};
