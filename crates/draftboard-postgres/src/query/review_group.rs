//! Review groups.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use super::escape_like;
use crate::model::{NewReviewGroup, ReviewGroup};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for review group database operations.
pub trait ReviewGroupRepository {
    /// Creates a new review group.
    fn create_review_group(
        &mut self,
        new_group: NewReviewGroup,
    ) -> impl Future<Output = PgResult<ReviewGroup>> + Send;

    /// Finds a group of the local site (or a global group when `None`)
    /// whose name or display name equals `name`, ignoring case.
    fn find_review_group_by_name(
        &mut self,
        local_site_id: Option<Uuid>,
        name: &str,
    ) -> impl Future<Output = PgResult<Option<ReviewGroup>>> + Send;
}

impl ReviewGroupRepository for PgConnection {
    async fn create_review_group(&mut self, new_group: NewReviewGroup) -> PgResult<ReviewGroup> {
        use schema::review_groups;

        diesel::insert_into(review_groups::table)
            .values(&new_group)
            .returning(ReviewGroup::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_review_group_by_name(
        &mut self,
        local_site_id: Option<Uuid>,
        name: &str,
    ) -> PgResult<Option<ReviewGroup>> {
        use schema::review_groups::{self, dsl};

        let pattern = escape_like(name);
        review_groups::table
            .filter(dsl::local_site_id.is_not_distinct_from(local_site_id))
            .filter(dsl::name.ilike(&pattern).or(dsl::display_name.ilike(&pattern)))
            .order(dsl::created_at.asc())
            .select(ReviewGroup::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }
}

#[cfg(test)]
mod tests {
    use diesel::debug_query;
    use diesel::pg::Pg;
    use diesel::prelude::*;
    use uuid::Uuid;

    use crate::schema::review_groups::{self, dsl};

    #[test]
    fn global_groups_match_null_site() {
        let query = review_groups::table
            .filter(dsl::local_site_id.is_not_distinct_from(None::<Uuid>))
            .select(dsl::id);

        let sql = debug_query::<Pg, _>(&query).to_string();
        assert!(sql.contains("IS NOT DISTINCT FROM"));
    }
}
