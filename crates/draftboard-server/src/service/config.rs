use derive_builder::Builder;
use draftboard_core::AuthBackendChain;
use draftboard_postgres::{PgClient, PgClientExt, PgConfig, ProvisioningBackend};
use serde::{Deserialize, Serialize};

use crate::service::{AuthConfig, AuthKeys, Error, Result};

/// Tracing target for service setup.
const TRACING_TARGET: &str = "draftboard_server::service::config";

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "config", derive(clap::Args))]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, strip_option, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct ServiceConfig {
    /// Postgres connection and pool settings.
    #[cfg_attr(feature = "config", command(flatten))]
    pub postgres_config: PgConfig,

    /// Bearer token settings.
    #[cfg_attr(feature = "config", command(flatten))]
    pub auth_config: AuthConfig,
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Connects to Postgres and applies pending migrations.
    pub async fn connect_postgres(&self) -> Result<PgClient> {
        let pg_client = self.postgres_config.clone().build().map_err(|e| {
            Error::config("invalid database configuration").with_source(e)
        })?;

        let migrations = pg_client.run_pending_migrations().await.map_err(|e| {
            Error::external("postgres", "failed to apply database migrations").with_source(e)
        })?;

        tracing::info!(
            target: TRACING_TARGET,
            database_url = %self.postgres_config.database_url_masked(),
            migrations = ?migrations,
            "database ready"
        );

        Ok(pg_client)
    }

    /// Loads the bearer token verification keys.
    pub fn load_auth_keys(&self) -> Result<AuthKeys> {
        AuthKeys::from_config(&self.auth_config)
    }

    /// Returns the auth backends consulted for unknown usernames.
    pub fn auth_backends(&self, pg_client: &PgClient) -> AuthBackendChain {
        let backends = AuthBackendChain::new();
        if !self.auth_config.auth_provision_accounts {
            return backends;
        }

        tracing::info!(target: TRACING_TARGET, "account provisioning enabled");
        backends.with_backend(ProvisioningBackend::new(pg_client.clone()))
    }
}

impl ServiceConfigBuilder {
    /// Wrapper for builder validation that returns String errors.
    fn validate(builder: &ServiceConfigBuilder) -> Result<(), String> {
        if let Some(postgres_config) = &builder.postgres_config {
            postgres_config.validate().map_err(|e| e.to_string())?;
        }

        if let Some(auth_config) = &builder.auth_config {
            AuthKeys::from_config(auth_config).map_err(|e| e.to_string())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn builder_accepts_valid_config() {
        let config = ServiceConfig::builder()
            .with_postgres_config(PgConfig::new("postgresql://localhost/draftboard"))
            .with_auth_config(AuthConfig::new(SECRET))
            .build();

        assert!(config.is_ok());
    }

    #[test]
    fn builder_rejects_short_secret() {
        let error = ServiceConfig::builder()
            .with_postgres_config(PgConfig::new("postgresql://localhost/draftboard"))
            .with_auth_config(AuthConfig::new("short"))
            .build()
            .unwrap_err();

        assert!(error.to_string().contains("AUTH_SECRET"));
    }

    #[tokio::test]
    async fn connect_reports_invalid_database_config() {
        let config = ServiceConfig {
            postgres_config: PgConfig::new("postgresql://localhost/draftboard")
                .with_max_connections(64),
            auth_config: AuthConfig::new(SECRET),
        };

        let error = config.connect_postgres().await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Config);
    }

    #[tokio::test]
    async fn connect_reports_unreachable_database() {
        let config = ServiceConfig {
            postgres_config: PgConfig::new("postgresql://draftboard@127.0.0.1:1/draftboard")
                .with_connection_timeout_secs(1),
            auth_config: AuthConfig::new(SECRET),
        };

        let error = config.connect_postgres().await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::External);
        assert!(error.message().starts_with("postgres:"));
    }

    #[test]
    fn builder_rejects_invalid_pool_size() {
        let config = ServiceConfig::builder()
            .with_postgres_config(
                PgConfig::new("postgresql://localhost/draftboard").with_max_connections(64),
            )
            .with_auth_config(AuthConfig::new(SECRET))
            .build();

        assert!(config.is_err());
    }
}
