//! Review requests and their reviewer and dependency relations.

use std::future::Future;

use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{
    Account, NewReviewRequest, NewReviewRequestDependency, NewReviewRequestTargetGroup,
    NewReviewRequestTargetPerson, ReviewGroup, ReviewRequest, ReviewRequestSummary,
    UpdateReviewRequest,
};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for review request database operations.
pub trait ReviewRequestRepository {
    /// Creates a new review request without relations.
    fn create_review_request(
        &mut self,
        new_review_request: NewReviewRequest,
    ) -> impl Future<Output = PgResult<ReviewRequest>> + Send;

    /// Finds a review request by the identifier users of the site see:
    /// the per-site `local_id` within a local site, the global id otherwise.
    fn find_review_request_by_display_id(
        &mut self,
        local_site_id: Option<Uuid>,
        display_id: i64,
    ) -> impl Future<Output = PgResult<Option<ReviewRequest>>> + Send;

    /// Overwrites the published fields of a review request.
    fn update_review_request(
        &mut self,
        review_request_id: i64,
        updates: UpdateReviewRequest,
    ) -> impl Future<Output = PgResult<ReviewRequest>> + Send;

    /// Lists target groups in the order they were entered.
    fn list_review_request_target_groups(
        &mut self,
        review_request_id: i64,
    ) -> impl Future<Output = PgResult<Vec<ReviewGroup>>> + Send;

    /// Lists target people in the order they were entered.
    fn list_review_request_target_people(
        &mut self,
        review_request_id: i64,
    ) -> impl Future<Output = PgResult<Vec<Account>>> + Send;

    /// Lists the review requests this one depends on.
    fn list_review_request_dependencies(
        &mut self,
        review_request_id: i64,
    ) -> impl Future<Output = PgResult<Vec<ReviewRequestSummary>>> + Send;

    /// Replaces all relations of a review request.
    fn set_review_request_relations(
        &mut self,
        review_request_id: i64,
        group_ids: &[Uuid],
        account_ids: &[Uuid],
        dependency_ids: &[i64],
    ) -> impl Future<Output = PgResult<()>> + Send;

    /// Returns true if a change description was published for the review request.
    fn has_public_change_descriptions(
        &mut self,
        review_request_id: i64,
    ) -> impl Future<Output = PgResult<bool>> + Send;
}

impl ReviewRequestRepository for PgConnection {
    async fn create_review_request(
        &mut self,
        new_review_request: NewReviewRequest,
    ) -> PgResult<ReviewRequest> {
        use schema::review_requests;

        diesel::insert_into(review_requests::table)
            .values(&new_review_request)
            .returning(ReviewRequest::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_review_request_by_display_id(
        &mut self,
        local_site_id: Option<Uuid>,
        display_id: i64,
    ) -> PgResult<Option<ReviewRequest>> {
        use schema::review_requests::{self, dsl};

        let query: review_requests::BoxedQuery<'_, Pg> = match local_site_id {
            Some(local_site_id) => review_requests::table
                .filter(dsl::local_site_id.eq(local_site_id))
                .filter(dsl::local_id.eq(display_id))
                .into_boxed(),
            None => review_requests::table
                .filter(dsl::local_site_id.is_null())
                .filter(dsl::id.eq(display_id))
                .into_boxed(),
        };

        query
            .select(ReviewRequest::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn update_review_request(
        &mut self,
        review_request_id: i64,
        updates: UpdateReviewRequest,
    ) -> PgResult<ReviewRequest> {
        use schema::review_requests::{self, dsl};

        diesel::update(review_requests::table.filter(dsl::id.eq(review_request_id)))
            .set(&updates)
            .returning(ReviewRequest::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_review_request_target_groups(
        &mut self,
        review_request_id: i64,
    ) -> PgResult<Vec<ReviewGroup>> {
        use schema::{review_groups, review_request_target_groups as targets};

        targets::table
            .inner_join(review_groups::table)
            .filter(targets::review_request_id.eq(review_request_id))
            .order(targets::position.asc())
            .select(ReviewGroup::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_review_request_target_people(
        &mut self,
        review_request_id: i64,
    ) -> PgResult<Vec<Account>> {
        use schema::{accounts, review_request_target_people as targets};

        targets::table
            .inner_join(accounts::table)
            .filter(targets::review_request_id.eq(review_request_id))
            .order(targets::position.asc())
            .select(Account::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_review_request_dependencies(
        &mut self,
        review_request_id: i64,
    ) -> PgResult<Vec<ReviewRequestSummary>> {
        use schema::{review_request_dependencies as dependencies, review_requests};

        // Both columns reference `review_requests`, so the join is explicit.
        dependencies::table
            .inner_join(
                review_requests::table.on(review_requests::id.eq(dependencies::dependency_id)),
            )
            .filter(dependencies::review_request_id.eq(review_request_id))
            .order(dependencies::position.asc())
            .select(ReviewRequestSummary::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn set_review_request_relations(
        &mut self,
        review_request_id: i64,
        group_ids: &[Uuid],
        account_ids: &[Uuid],
        dependency_ids: &[i64],
    ) -> PgResult<()> {
        use schema::{
            review_request_dependencies, review_request_target_groups,
            review_request_target_people,
        };

        diesel::delete(
            review_request_target_groups::table
                .filter(review_request_target_groups::review_request_id.eq(review_request_id)),
        )
        .execute(self)
        .await?;
        diesel::delete(
            review_request_target_people::table
                .filter(review_request_target_people::review_request_id.eq(review_request_id)),
        )
        .execute(self)
        .await?;
        diesel::delete(
            review_request_dependencies::table
                .filter(review_request_dependencies::review_request_id.eq(review_request_id)),
        )
        .execute(self)
        .await?;

        let groups: Vec<_> = (0..)
            .zip(group_ids)
            .map(|(position, &group_id)| NewReviewRequestTargetGroup {
                review_request_id,
                group_id,
                position,
            })
            .collect();
        if !groups.is_empty() {
            diesel::insert_into(review_request_target_groups::table)
                .values(&groups)
                .execute(self)
                .await?;
        }

        let people: Vec<_> = (0..)
            .zip(account_ids)
            .map(|(position, &account_id)| NewReviewRequestTargetPerson {
                review_request_id,
                account_id,
                position,
            })
            .collect();
        if !people.is_empty() {
            diesel::insert_into(review_request_target_people::table)
                .values(&people)
                .execute(self)
                .await?;
        }

        let dependencies: Vec<_> = (0..)
            .zip(dependency_ids)
            .map(|(position, &dependency_id)| NewReviewRequestDependency {
                review_request_id,
                dependency_id,
                position,
            })
            .collect();
        if !dependencies.is_empty() {
            diesel::insert_into(review_request_dependencies::table)
                .values(&dependencies)
                .execute(self)
                .await?;
        }

        Ok(())
    }

    async fn has_public_change_descriptions(&mut self, review_request_id: i64) -> PgResult<bool> {
        use diesel::dsl::exists;
        use schema::change_descriptions::{self, dsl};

        diesel::select(exists(
            change_descriptions::table
                .filter(dsl::review_request_id.eq(review_request_id))
                .filter(dsl::public.eq(true)),
        ))
        .get_result(self)
        .await
        .map_err(PgError::from)
    }
}
