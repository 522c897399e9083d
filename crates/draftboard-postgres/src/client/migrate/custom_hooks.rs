//! Hooks run around [`run_pending_migrations`].
//!
//! [`run_pending_migrations`]: super::run_pending_migrations

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::PoolableConnection;

use crate::{PgError, PgResult, TRACING_TARGET_MIGRATION};

/// Refuses to run migrations on a broken connection.
pub async fn pre_migrate(conn: &mut AsyncPgConnection) -> PgResult<()> {
    if conn.is_broken() {
        tracing::error!(
            target: TRACING_TARGET_MIGRATION,
            hook = "pre_migrate",
            "connection is broken before migrations"
        );
        return Err(PgError::Unexpected(
            "connection is broken before migrations".into(),
        ));
    }

    Ok(())
}

/// Reports a connection left broken by the migrations.
pub async fn post_migrate(conn: &mut AsyncPgConnection) -> PgResult<()> {
    if conn.is_broken() {
        tracing::error!(
            target: TRACING_TARGET_MIGRATION,
            hook = "post_migrate",
            "connection is broken after migrations"
        );
    }

    Ok(())
}
