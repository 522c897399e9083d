//! Shared-secret keys for bearer token verification.

use std::fmt;
use std::sync::Arc;

#[cfg(any(test, feature = "config"))]
use clap::Args;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Tracing target for key setup.
const TRACING_TARGET: &str = "draftboard_server::service::auth_keys";

/// Shortest accepted HS256 secret, in bytes.
const MIN_SECRET_LEN: usize = 32;

/// Bearer token configuration.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "config"), derive(Args))]
pub struct AuthConfig {
    /// Shared secret used to verify HS256 signed tokens.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "AUTH_SECRET", hide_env_values = true)
    )]
    pub auth_secret: String,

    /// Expected `iss` claim.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "AUTH_ISSUER", default_value = "draftboard")
    )]
    #[serde(default = "AuthConfig::default_issuer")]
    pub auth_issuer: String,

    /// Expected `aud` claim.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "AUTH_AUDIENCE", default_value = "draftboard:server")
    )]
    #[serde(default = "AuthConfig::default_audience")]
    pub auth_audience: String,

    /// Create accounts on first reference by username.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "AUTH_PROVISION_ACCOUNTS", default_value_t = false)
    )]
    #[serde(default)]
    pub auth_provision_accounts: bool,
}

impl AuthConfig {
    fn default_issuer() -> String {
        "draftboard".to_owned()
    }

    fn default_audience() -> String {
        "draftboard:server".to_owned()
    }

    /// Creates a configuration with default issuer and audience.
    pub fn new(auth_secret: impl Into<String>) -> Self {
        Self {
            auth_secret: auth_secret.into(),
            auth_issuer: Self::default_issuer(),
            auth_audience: Self::default_audience(),
            auth_provision_accounts: false,
        }
    }

    /// Enables account provisioning.
    pub fn with_provision_accounts(mut self, enabled: bool) -> Self {
        self.auth_provision_accounts = enabled;
        self
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("auth_secret", &"****")
            .field("auth_issuer", &self.auth_issuer)
            .field("auth_audience", &self.auth_audience)
            .field("auth_provision_accounts", &self.auth_provision_accounts)
            .finish()
    }
}

/// Keys and expectations used to verify and, in tests, sign tokens.
#[derive(Clone)]
pub struct AuthKeys {
    inner: Arc<AuthKeysInner>,
}

struct AuthKeysInner {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    issuer: String,
    audience: String,
}

impl AuthKeys {
    /// Derives the keys from the configured secret.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let secret = config.auth_secret.as_bytes();
        if secret.len() < MIN_SECRET_LEN {
            return Err(Error::auth(format!(
                "AUTH_SECRET must be at least {MIN_SECRET_LEN} bytes long"
            )));
        }

        if config.auth_issuer.is_empty() || config.auth_audience.is_empty() {
            return Err(Error::auth("token issuer and audience must not be empty"));
        }

        tracing::debug!(
            target: TRACING_TARGET,
            issuer = %config.auth_issuer,
            audience = %config.auth_audience,
            "authentication keys initialized"
        );

        Ok(Self {
            inner: Arc::new(AuthKeysInner {
                decoding_key: DecodingKey::from_secret(secret),
                encoding_key: EncodingKey::from_secret(secret),
                issuer: config.auth_issuer.clone(),
                audience: config.auth_audience.clone(),
            }),
        })
    }

    /// Returns the key used to verify token signatures.
    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
    }

    /// Returns the key used to sign tokens.
    #[inline]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.inner.encoding_key
    }

    /// Returns the expected `iss` claim.
    #[inline]
    pub fn issuer(&self) -> &str {
        &self.inner.issuer
    }

    /// Returns the expected `aud` claim.
    #[inline]
    pub fn audience(&self) -> &str {
        &self.inner.audience
    }

    /// Returns the validation rules every token must pass.
    pub fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.set_audience(&[self.audience()]);
        validation.set_issuer(&[self.issuer()]);
        validation.set_required_spec_claims(&["iss", "aud", "sub", "iat", "exp"]);
        validation
    }
}

impl fmt::Debug for AuthKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthKeys")
            .field("issuer", &self.inner.issuer)
            .field("audience", &self.inner.audience)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn rejects_short_secret() {
        let error = AuthKeys::from_config(&AuthConfig::new("short")).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Auth);
    }

    #[test]
    fn debug_hides_secret() {
        let config = AuthConfig::new("a-very-long-secret-that-nobody-should-see");
        assert!(!format!("{config:?}").contains("nobody"));
    }

    #[test]
    fn validation_expects_configured_claims() {
        let keys = AuthKeys::from_config(&AuthConfig::new("0123456789abcdef0123456789abcdef"))
            .unwrap();
        assert_eq!(keys.issuer(), "draftboard");
        assert_eq!(keys.audience(), "draftboard:server");
        assert!(keys.validation().validate_exp);
    }
}
