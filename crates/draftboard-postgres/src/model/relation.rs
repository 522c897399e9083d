//! Join table rows. `position` keeps the order the user entered.

use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::{
    draft_dependencies, draft_target_groups, draft_target_people, review_request_dependencies,
    review_request_target_groups, review_request_target_people,
};

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = review_request_target_groups)]
pub struct NewReviewRequestTargetGroup {
    pub review_request_id: i64,
    pub group_id: Uuid,
    pub position: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = review_request_target_people)]
pub struct NewReviewRequestTargetPerson {
    pub review_request_id: i64,
    pub account_id: Uuid,
    pub position: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = review_request_dependencies)]
pub struct NewReviewRequestDependency {
    pub review_request_id: i64,
    pub dependency_id: i64,
    pub position: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = draft_target_groups)]
pub struct NewDraftTargetGroup {
    pub draft_id: i64,
    pub group_id: Uuid,
    pub position: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = draft_target_people)]
pub struct NewDraftTargetPerson {
    pub draft_id: i64,
    pub account_id: Uuid,
    pub position: i32,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = draft_dependencies)]
pub struct NewDraftDependency {
    pub draft_id: i64,
    pub dependency_id: i64,
    pub position: i32,
}
