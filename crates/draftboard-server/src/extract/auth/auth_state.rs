//! Authenticated account extractor.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use derive_more::Deref;
use draftboard_core::DraftService;
use draftboard_core::types::Account;

use super::{AuthHeader, TRACING_TARGET_AUTHENTICATION};
use crate::handler::{Error, ErrorKind, Result};
use crate::service::AuthKeys;

/// The account a verified bearer token belongs to.
///
/// Rejects with `401 unauthorized` when the token's subject is not a stored
/// account. The result is cached in the request extensions.
#[derive(Debug, Clone, Deref, PartialEq, Eq)]
pub struct AuthState(pub Account);

impl AuthState {
    /// Resolves the subject of an already verified token.
    pub async fn from_verified_header(auth_header: AuthHeader, drafts: &DraftService) -> Result<Self> {
        let claims = auth_header.into_auth_claims();

        let account = drafts
            .entities()
            .find_account(claims.account_id)
            .await
            .map_err(|error| {
                tracing::error!(
                    target: TRACING_TARGET_AUTHENTICATION,
                    error = %error,
                    account_id = %claims.account_id,
                    "account lookup failed during authentication"
                );
                ErrorKind::InternalServerError
                    .with_message("Authentication verification is temporarily unavailable")
            })?;

        let Some(account) = account else {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                account_id = %claims.account_id,
                token_id = %claims.token_id,
                "token subject is not a known account"
            );
            return Err(ErrorKind::Unauthorized
                .with_message("Account does not exist")
                .with_resource("authentication"));
        };

        Ok(Self(account))
    }

    /// Returns the authenticated account.
    #[inline]
    pub fn into_account(self) -> Account {
        self.0
    }
}

impl<S> FromRequestParts<S> for AuthState
where
    S: Send + Sync,
    AuthKeys: FromRef<S>,
    DraftService: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth_state) = parts.extensions.get::<Self>() {
            return Ok(auth_state.clone());
        }

        let auth_header = AuthHeader::from_request_parts(parts, state).await?;
        let drafts = DraftService::from_ref(state);
        let auth_state = Self::from_verified_header(auth_header, &drafts).await?;

        parts.extensions.insert(auth_state.clone());
        Ok(auth_state)
    }
}

impl aide::OperationInput for AuthState {}
