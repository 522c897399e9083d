//! JWT claims and the `Authorization: Bearer` extractor.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::TypedHeaderRejectionReason;
use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use jsonwebtoken::{Algorithm, Header, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::AuthKeys;

/// Registered JWT claims carried by every bearer token.
///
/// | Claim | Field        |
/// |-------|--------------|
/// | `iss` | `issued_by`  |
/// | `aud` | `audience`   |
/// | `jti` | `token_id`   |
/// | `sub` | `account_id` |
/// | `iat` | `issued_at`  |
/// | `exp` | `expires_at` |
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AuthClaims {
    #[serde(rename = "iss")]
    pub issued_by: String,
    #[serde(rename = "aud")]
    pub audience: String,
    #[serde(rename = "jti")]
    pub token_id: Uuid,
    #[serde(rename = "sub")]
    pub account_id: Uuid,
    #[serde(rename = "iat")]
    #[serde(with = "jiff::fmt::serde::timestamp::second::required")]
    pub issued_at: Timestamp,
    #[serde(rename = "exp")]
    #[serde(with = "jiff::fmt::serde::timestamp::second::required")]
    pub expires_at: Timestamp,
}

impl AuthClaims {
    /// Creates claims for `account_id`, valid for `lifetime` from now.
    pub fn new(keys: &AuthKeys, account_id: Uuid, lifetime: SignedDuration) -> Self {
        let issued_at = Timestamp::now();
        Self {
            issued_by: keys.issuer().to_owned(),
            audience: keys.audience().to_owned(),
            token_id: Uuid::now_v7(),
            account_id,
            issued_at,
            expires_at: issued_at.saturating_add(lifetime).unwrap_or(issued_at),
        }
    }

    /// Returns true once the expiration time has passed.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Timestamp::now()
    }

    /// Signs the claims into a compact token.
    pub fn encode(&self, keys: &AuthKeys) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), self, keys.encoding_key()).map_err(|error| {
            tracing::error!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %error,
                account_id = %self.account_id,
                "failed to sign token"
            );
            ErrorKind::InternalServerError.with_message("Authentication token generation failed")
        })
    }

    /// Verifies `token` and returns its claims.
    pub fn decode(token: &str, keys: &AuthKeys) -> Result<Self> {
        let claims = decode::<Self>(token, keys.decoding_key(), &keys.validation())?.claims;

        if claims.is_expired() {
            return Err(ErrorKind::Unauthorized.with_message("Authentication token has expired"));
        }

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            token_id = %claims.token_id,
            account_id = %claims.account_id,
            "token verified"
        );

        Ok(claims)
    }
}

/// Verified claims of the request's bearer token.
///
/// Only checks the token itself; use [`AuthState`] to also require an
/// existing account.
///
/// [`AuthState`]: crate::extract::AuthState
#[must_use]
#[derive(Debug, Clone)]
pub struct AuthHeader(pub AuthClaims);

impl AuthHeader {
    /// Returns the verified claims.
    #[inline]
    pub fn into_auth_claims(self) -> AuthClaims {
        self.0
    }
}

impl<S> FromRequestParts<S> for AuthHeader
where
    S: Send + Sync,
    AuthKeys: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_header) = parts.extensions.get::<Self>() {
            return Ok(auth_header.clone());
        }

        type AuthBearerHeader = TypedHeader<Authorization<Bearer>>;
        let bearer = match AuthBearerHeader::from_request_parts(parts, state).await {
            Ok(TypedHeader(bearer)) => bearer,
            Err(rejection) => {
                let error = match rejection.reason() {
                    TypedHeaderRejectionReason::Missing => ErrorKind::MissingAuthToken
                        .with_context("Missing Authorization header with Bearer token"),
                    _ => ErrorKind::MalformedAuthToken
                        .with_context("Authorization header must contain a Bearer token"),
                };
                return Err(error.with_resource("authentication"));
            }
        };

        let auth_keys = AuthKeys::from_ref(state);
        let auth_header = Self(AuthClaims::decode(bearer.token(), &auth_keys)?);
        parts.extensions.insert(auth_header.clone());
        Ok(auth_header)
    }
}

impl From<JwtError> for Error<'static> {
    fn from(error: JwtError) -> Self {
        let error = match error.kind() {
            JwtErrorKind::ExpiredSignature => {
                ErrorKind::Unauthorized.with_message("Authentication token has expired")
            }
            JwtErrorKind::InvalidSignature => ErrorKind::Unauthorized
                .with_message("Authentication token verification failed"),
            JwtErrorKind::InvalidAudience => ErrorKind::Unauthorized
                .with_message("Authentication token is not valid for this service"),
            JwtErrorKind::InvalidIssuer => ErrorKind::Unauthorized
                .with_message("Authentication token is from an untrusted issuer"),
            JwtErrorKind::MissingRequiredClaim(claim) => ErrorKind::MalformedAuthToken
                .with_context(format!("Token is missing required claim: {claim}")),
            JwtErrorKind::InvalidToken
            | JwtErrorKind::InvalidAlgorithm
            | JwtErrorKind::Base64(_)
            | JwtErrorKind::Json(_) => ErrorKind::MalformedAuthToken
                .with_context("The provided token could not be decoded"),
            _ => ErrorKind::InternalServerError
                .with_message("Authentication processing failed"),
        };

        error.with_resource("authentication")
    }
}
