//! Migration entry points on [`PgClient`].

use std::future::Future;

use crate::client::migrate::{
    MigrationResult, MigrationStatus, get_migration_status, run_pending_migrations,
    verify_schema_integrity,
};
use crate::{PgClient, PgResult};

/// Extension trait adding migration management to [`PgClient`].
pub trait PgClientExt {
    /// Applies all pending migrations. Safe to call repeatedly.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<MigrationResult>> + Send;

    /// Returns the applied and pending migration versions.
    fn get_migration_status(&self) -> impl Future<Output = PgResult<MigrationStatus>> + Send;

    /// Fails unless the migration table exists and nothing is pending.
    fn verify_schema_integrity(&self) -> impl Future<Output = PgResult<()>> + Send;
}

impl PgClientExt for PgClient {
    async fn run_pending_migrations(&self) -> PgResult<MigrationResult> {
        run_pending_migrations(self).await
    }

    async fn get_migration_status(&self) -> PgResult<MigrationStatus> {
        let mut conn = self.get_connection().await?;
        get_migration_status(&mut conn).await
    }

    async fn verify_schema_integrity(&self) -> PgResult<()> {
        let mut conn = self.get_connection().await?;
        verify_schema_integrity(&mut conn).await
    }
}
