use diesel::migration::MigrationSource;
use diesel::pg::Pg;
use diesel::sql_query;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::instrument;

use super::MigrationStatus;
use crate::{MIGRATIONS, PgError, PgResult, TRACING_TARGET_MIGRATION};

#[derive(diesel::QueryableByName)]
struct ExistsResult {
    #[diesel(sql_type = diesel::sql_types::Bool)]
    exists: bool,
}

#[derive(diesel::QueryableByName)]
struct MigrationVersion {
    #[diesel(sql_type = diesel::sql_types::Text)]
    version: String,
}

/// Compares the embedded migrations with the ones recorded in the database.
#[instrument(skip(conn), target = TRACING_TARGET_MIGRATION)]
pub async fn get_migration_status(conn: &mut AsyncPgConnection) -> PgResult<MigrationStatus> {
    let applied_versions = if migration_table_exists(conn).await? {
        get_applied_migrations(conn).await?
    } else {
        Vec::new()
    };

    let pending_versions = embedded_versions()?
        .into_iter()
        .filter(|version| !applied_versions.contains(version))
        .collect();

    let status = MigrationStatus::new(applied_versions, pending_versions);

    tracing::debug!(
        target: TRACING_TARGET_MIGRATION,
        applied = status.applied_migrations(),
        pending = status.pending_migrations(),
        "migration status retrieved"
    );

    Ok(status)
}

/// Verifies that migrations were run and none is pending.
#[instrument(skip(conn), target = TRACING_TARGET_MIGRATION)]
pub async fn verify_schema_integrity(conn: &mut AsyncPgConnection) -> PgResult<()> {
    if !migration_table_exists(conn).await? {
        tracing::warn!(target: TRACING_TARGET_MIGRATION, "migration table does not exist");
        return Err(PgError::Migration(
            "migration table __diesel_schema_migrations does not exist".into(),
        ));
    }

    let status = get_migration_status(conn).await?;
    if !status.is_up_to_date() {
        return Err(PgError::Migration(
            format!(
                "{} migrations are pending, first pending version is {}",
                status.pending_migrations(),
                status.pending_versions[0],
            )
            .into(),
        ));
    }

    Ok(())
}

/// Lists the migration versions recorded in the database, oldest first.
#[instrument(skip(conn), target = TRACING_TARGET_MIGRATION)]
pub async fn get_applied_migrations(conn: &mut AsyncPgConnection) -> PgResult<Vec<String>> {
    let versions = sql_query("SELECT version FROM __diesel_schema_migrations ORDER BY version")
        .get_results::<MigrationVersion>(conn)
        .await
        .map_err(|e| PgError::Migration(format!("Failed to get applied migrations: {e}").into()))?
        .into_iter()
        .map(|row| row.version)
        .collect();

    Ok(versions)
}

async fn migration_table_exists(conn: &mut AsyncPgConnection) -> PgResult<bool> {
    let result = sql_query(
        "SELECT EXISTS (
            SELECT FROM information_schema.tables
            WHERE table_name = '__diesel_schema_migrations'
         ) AS exists",
    )
    .get_result::<ExistsResult>(conn)
    .await
    .map_err(|e| PgError::Migration(format!("Failed to check migration table: {e}").into()))?;

    Ok(result.exists)
}

fn embedded_versions() -> PgResult<Vec<String>> {
    let migrations = MigrationSource::<Pg>::migrations(&MIGRATIONS).map_err(PgError::Migration)?;
    let mut versions: Vec<String> = migrations
        .iter()
        .map(|migration| migration.name().version().to_string())
        .collect();
    versions.sort();
    Ok(versions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_initial_migration() {
        let versions = embedded_versions().unwrap();
        assert_eq!(versions.len(), 1);
        assert!(versions[0].replace('-', "").starts_with("20250101"));
    }
}
