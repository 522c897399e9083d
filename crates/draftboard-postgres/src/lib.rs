#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Embeds all migrations into the final binary.
pub(crate) const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
    diesel_migrations::embed_migrations!("./migrations");

// Tracing target constants for consistent logging.

/// Tracing target for client-related operations.
pub const TRACING_TARGET_CLIENT: &str = "draftboard_postgres::client";

/// Tracing target for database query operations.
pub const TRACING_TARGET_QUERY: &str = "draftboard_postgres::queries";

/// Tracing target for database migration operations.
///
/// Use this target for logging migration application and status checks.
pub const TRACING_TARGET_MIGRATION: &str = "draftboard_postgres::migrations";

/// Tracing target for database connection operations.
///
/// Use this target for logging connection establishment and pool management.
pub const TRACING_TARGET_CONNECTION: &str = "draftboard_postgres::connection";

mod backend;
mod client;
pub mod model;
pub mod query;
mod schema;
mod store;

use std::borrow::Cow;

use deadpool::managed::TimeoutType;
use diesel::ConnectionError;
use diesel::result::{DatabaseErrorKind, Error};
pub use diesel_async::AsyncPgConnection as PgConnection;

pub use crate::backend::ProvisioningBackend;
pub use crate::client::{
    ConnectionPool, MigrationResult, MigrationStatus, PgClient, PgClientExt, PgConfig, PgConn,
    PgPoolStatus, PooledConnection, get_applied_migrations, get_migration_status,
    run_pending_migrations, verify_schema_integrity,
};

pub mod error {
    //! Error types and utilities for database operations.
    //!
    //! See [`PgError`] for the main error type used throughout this crate.
    //!
    //! [`PgError`]: crate::PgError

    /// Type-erased error type for dynamic error handling.
    pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

    use std::borrow::Cow;

    pub use deadpool::managed::TimeoutType;
    pub use diesel::result::{ConnectionError as DieselConnectionError, Error as DieselError};
    pub use diesel_async::pooled_connection::PoolError as DieselPoolError;
    pub use diesel_async::pooled_connection::deadpool::PoolError as DeadpoolError;

    /// Provides contextual hints for error types to aid in debugging and user messaging.
    pub trait ErrorHint {
        /// Returns an additional hint for an error type.
        fn hint(&self) -> Cow<'static, str>;
    }

    impl ErrorHint for TimeoutType {
        fn hint(&self) -> Cow<'static, str> {
            match self {
                TimeoutType::Wait => Cow::Borrowed(
                    "Connection pool is exhausted, consider increasing POSTGRES_MAX_CONNECTIONS",
                ),
                TimeoutType::Create => Cow::Borrowed(
                    "Unable to establish new database connection, check POSTGRES_URL and database availability",
                ),
                TimeoutType::Recycle => Cow::Borrowed(
                    "Failed to recycle database connection, connection may be in invalid state",
                ),
            }
        }
    }
}

/// Error type for all PostgreSQL operations of this crate.
#[derive(Debug, thiserror::Error)]
#[must_use = "database errors should be handled appropriately"]
pub enum PgError {
    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection creation, checkout or recycling timed out.
    #[error("Database operation timed out")]
    Timeout(TimeoutType),

    /// Failed to establish or maintain a database connection.
    #[error("Database connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Applying the embedded schema migrations failed.
    #[error("Database migration error: {0}")]
    Migration(error::BoxError),

    /// Query execution failed, including constraint violations.
    #[error("Database query error: {0}")]
    Query(#[from] Error),

    /// Unexpected error occurred.
    #[error("Unexpected error: {0}")]
    Unexpected(Cow<'static, str>),
}

impl PgError {
    /// Extracts the constraint name from a constraint violation error.
    ///
    /// # Returns
    ///
    /// - `Some(constraint_name)` if this error represents a constraint violation
    /// - `None` if this error is not related to a constraint violation
    pub fn constraint(&self) -> Option<&str> {
        let PgError::Query(err) = self else {
            return None;
        };

        let Error::DatabaseError(_, err) = err else {
            return None;
        };

        err.constraint_name()
    }

    /// Returns true if the error is a unique or foreign key violation.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            PgError::Query(Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::ForeignKeyViolation,
                _
            ))
        )
    }

    /// Returns whether this error indicates a transient failure that might succeed on retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PgError::Timeout(_)
                | PgError::Connection(ConnectionError::BadConnection(_))
                | PgError::Query(Error::DatabaseError(
                    DatabaseErrorKind::SerializationFailure,
                    _
                ))
        )
    }

    /// Returns whether this error indicates a permanent failure that won't succeed on retry.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }
}

impl From<error::DeadpoolError> for PgError {
    fn from(value: error::DeadpoolError) -> Self {
        use error::{DeadpoolError, DieselPoolError};

        match value {
            DeadpoolError::Timeout(timeout) => Self::Timeout(timeout),
            DeadpoolError::Backend(DieselPoolError::QueryError(error)) => Self::Query(error),
            DeadpoolError::Backend(DieselPoolError::ConnectionError(error)) => {
                Self::Connection(error)
            }
            DeadpoolError::PostCreateHook(err) => {
                tracing::warn!("Unexpected post-create hook error: {}", err);
                Self::Unexpected(err.to_string().into())
            }
            DeadpoolError::NoRuntimeSpecified => {
                tracing::error!("No tokio runtime specified for connection pool");
                Self::Unexpected("No runtime specified".into())
            }
            DeadpoolError::Closed => Self::Connection(ConnectionError::InvalidConnectionUrl(
                "Connection pool is closed".into(),
            )),
        }
    }
}

impl From<PgError> for draftboard_core::Error {
    fn from(error: PgError) -> Self {
        let kind = if error.is_conflict() {
            draftboard_core::ErrorKind::Conflict
        } else {
            draftboard_core::ErrorKind::Storage
        };

        let message = match error.constraint() {
            Some(constraint) => format!("Database constraint {constraint} was violated"),
            None => "Database operation failed".to_owned(),
        };

        draftboard_core::Error::new(kind)
            .with_message(message)
            .with_source(error)
    }
}

/// Specialized [`Result`] type for database operations.
pub type PgResult<T, E = PgError> = Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_are_transient() {
        assert!(PgError::Timeout(TimeoutType::Wait).is_transient());
        assert!(PgError::Config("missing url".into()).is_permanent());
    }

    #[test]
    fn converts_into_storage_error() {
        let error: draftboard_core::Error = PgError::Query(Error::NotFound).into();
        assert_eq!(error.kind(), draftboard_core::ErrorKind::Storage);
        assert!(PgError::Query(Error::NotFound).constraint().is_none());
    }
}
