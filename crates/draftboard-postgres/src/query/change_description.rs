//! Change descriptions.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::model::{ChangeDescription, NewChangeDescription, UpdateChangeDescription};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for change description database operations.
pub trait ChangeDescriptionRepository {
    /// Creates a new change description.
    fn create_change_description(
        &mut self,
        new_changedesc: NewChangeDescription,
    ) -> impl Future<Output = PgResult<ChangeDescription>> + Send;

    /// Finds a change description by identifier.
    fn find_change_description_by_id(
        &mut self,
        changedesc_id: i64,
    ) -> impl Future<Output = PgResult<Option<ChangeDescription>>> + Send;

    /// Updates an existing change description.
    fn update_change_description(
        &mut self,
        changedesc_id: i64,
        updates: UpdateChangeDescription,
    ) -> impl Future<Output = PgResult<ChangeDescription>> + Send;

    /// Deletes a change description unless it has been published.
    ///
    /// Returns true if a row was deleted.
    fn delete_unpublished_change_description(
        &mut self,
        changedesc_id: i64,
    ) -> impl Future<Output = PgResult<bool>> + Send;
}

impl ChangeDescriptionRepository for PgConnection {
    async fn create_change_description(
        &mut self,
        new_changedesc: NewChangeDescription,
    ) -> PgResult<ChangeDescription> {
        use schema::change_descriptions;

        diesel::insert_into(change_descriptions::table)
            .values(&new_changedesc)
            .returning(ChangeDescription::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_change_description_by_id(
        &mut self,
        changedesc_id: i64,
    ) -> PgResult<Option<ChangeDescription>> {
        use schema::change_descriptions::{self, dsl};

        change_descriptions::table
            .filter(dsl::id.eq(changedesc_id))
            .select(ChangeDescription::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn update_change_description(
        &mut self,
        changedesc_id: i64,
        updates: UpdateChangeDescription,
    ) -> PgResult<ChangeDescription> {
        use schema::change_descriptions::{self, dsl};

        diesel::update(change_descriptions::table.filter(dsl::id.eq(changedesc_id)))
            .set(&updates)
            .returning(ChangeDescription::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn delete_unpublished_change_description(&mut self, changedesc_id: i64) -> PgResult<bool> {
        use schema::change_descriptions::{self, dsl};

        let deleted = diesel::delete(
            change_descriptions::table
                .filter(dsl::id.eq(changedesc_id))
                .filter(dsl::public.eq(false)),
        )
        .execute(self)
        .await
        .map_err(PgError::from)?;

        Ok(deleted > 0)
    }
}
