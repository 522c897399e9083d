//! Review request drafts and their relations.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{
    Account, NewDraftDependency, NewDraftTargetGroup, NewDraftTargetPerson, NewReviewRequestDraft,
    ReviewGroup, ReviewRequestDraft, ReviewRequestSummary,
};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for draft database operations.
pub trait ReviewRequestDraftRepository {
    /// Finds the draft of a review request.
    fn find_draft_by_review_request(
        &mut self,
        review_request_id: i64,
    ) -> impl Future<Output = PgResult<Option<ReviewRequestDraft>>> + Send;

    /// Inserts the draft of a review request, or overwrites the existing one.
    fn upsert_draft(
        &mut self,
        draft: NewReviewRequestDraft,
    ) -> impl Future<Output = PgResult<ReviewRequestDraft>> + Send;

    /// Deletes the draft of a review request and, through the foreign keys,
    /// its relations. Returns the deleted row.
    fn delete_draft_by_review_request(
        &mut self,
        review_request_id: i64,
    ) -> impl Future<Output = PgResult<Option<ReviewRequestDraft>>> + Send;

    /// Lists target groups in the order they were entered.
    fn list_draft_target_groups(
        &mut self,
        draft_id: i64,
    ) -> impl Future<Output = PgResult<Vec<ReviewGroup>>> + Send;

    /// Lists target people in the order they were entered.
    fn list_draft_target_people(
        &mut self,
        draft_id: i64,
    ) -> impl Future<Output = PgResult<Vec<Account>>> + Send;

    /// Lists the review requests the draft depends on.
    fn list_draft_dependencies(
        &mut self,
        draft_id: i64,
    ) -> impl Future<Output = PgResult<Vec<ReviewRequestSummary>>> + Send;

    /// Replaces all relations of a draft.
    fn set_draft_relations(
        &mut self,
        draft_id: i64,
        group_ids: &[Uuid],
        account_ids: &[Uuid],
        dependency_ids: &[i64],
    ) -> impl Future<Output = PgResult<()>> + Send;
}

impl ReviewRequestDraftRepository for PgConnection {
    async fn find_draft_by_review_request(
        &mut self,
        review_request_id: i64,
    ) -> PgResult<Option<ReviewRequestDraft>> {
        use schema::review_request_drafts::{self, dsl};

        review_request_drafts::table
            .filter(dsl::review_request_id.eq(review_request_id))
            .select(ReviewRequestDraft::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn upsert_draft(&mut self, draft: NewReviewRequestDraft) -> PgResult<ReviewRequestDraft> {
        use schema::review_request_drafts::{self, dsl};

        diesel::insert_into(review_request_drafts::table)
            .values(&draft)
            .on_conflict(dsl::review_request_id)
            .do_update()
            .set(&draft)
            .returning(ReviewRequestDraft::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn delete_draft_by_review_request(
        &mut self,
        review_request_id: i64,
    ) -> PgResult<Option<ReviewRequestDraft>> {
        use schema::review_request_drafts::{self, dsl};

        diesel::delete(review_request_drafts::table.filter(dsl::review_request_id.eq(review_request_id)))
            .returning(ReviewRequestDraft::as_returning())
            .get_result(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn list_draft_target_groups(&mut self, draft_id: i64) -> PgResult<Vec<ReviewGroup>> {
        use schema::{draft_target_groups as targets, review_groups};

        targets::table
            .inner_join(review_groups::table)
            .filter(targets::draft_id.eq(draft_id))
            .order(targets::position.asc())
            .select(ReviewGroup::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_draft_target_people(&mut self, draft_id: i64) -> PgResult<Vec<Account>> {
        use schema::{accounts, draft_target_people as targets};

        targets::table
            .inner_join(accounts::table)
            .filter(targets::draft_id.eq(draft_id))
            .order(targets::position.asc())
            .select(Account::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn list_draft_dependencies(&mut self, draft_id: i64) -> PgResult<Vec<ReviewRequestSummary>> {
        use schema::{draft_dependencies as dependencies, review_requests};

        dependencies::table
            .inner_join(review_requests::table)
            .filter(dependencies::draft_id.eq(draft_id))
            .order(dependencies::position.asc())
            .select(ReviewRequestSummary::as_select())
            .load(self)
            .await
            .map_err(PgError::from)
    }

    async fn set_draft_relations(
        &mut self,
        draft_id: i64,
        group_ids: &[Uuid],
        account_ids: &[Uuid],
        dependency_ids: &[i64],
    ) -> PgResult<()> {
        use schema::{draft_dependencies, draft_target_groups, draft_target_people};

        diesel::delete(draft_target_groups::table.filter(draft_target_groups::draft_id.eq(draft_id)))
            .execute(self)
            .await?;
        diesel::delete(draft_target_people::table.filter(draft_target_people::draft_id.eq(draft_id)))
            .execute(self)
            .await?;
        diesel::delete(draft_dependencies::table.filter(draft_dependencies::draft_id.eq(draft_id)))
            .execute(self)
            .await?;

        let groups: Vec<_> = (0..)
            .zip(group_ids)
            .map(|(position, &group_id)| NewDraftTargetGroup {
                draft_id,
                group_id,
                position,
            })
            .collect();
        if !groups.is_empty() {
            diesel::insert_into(draft_target_groups::table)
                .values(&groups)
                .execute(self)
                .await?;
        }

        let people: Vec<_> = (0..)
            .zip(account_ids)
            .map(|(position, &account_id)| NewDraftTargetPerson {
                draft_id,
                account_id,
                position,
            })
            .collect();
        if !people.is_empty() {
            diesel::insert_into(draft_target_people::table)
                .values(&people)
                .execute(self)
                .await?;
        }

        let dependencies: Vec<_> = (0..)
            .zip(dependency_ids)
            .map(|(position, &dependency_id)| NewDraftDependency {
                draft_id,
                dependency_id,
                position,
            })
            .collect();
        if !dependencies.is_empty() {
            diesel::insert_into(draft_dependencies::table)
                .values(&dependencies)
                .execute(self)
                .await?;
        }

        Ok(())
    }
}
