use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::review_requests;

/// A review request row, without its relations.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = review_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReviewRequest {
    pub id: i64,
    /// Per-site identifier, set iff `local_site_id` is.
    pub local_id: Option<i64>,
    pub local_site_id: Option<Uuid>,
    pub submitter_id: Uuid,
    pub summary: String,
    pub description: String,
    pub testing_done: String,
    pub bugs_closed: String,
    pub branch: String,
    pub public: bool,
    pub time_added: Timestamp,
    pub last_updated: Timestamp,
}

impl ReviewRequest {
    /// Converts the row, attaching relations loaded separately.
    pub fn into_domain(
        self,
        has_change_descriptions: bool,
        target_groups: Vec<draftboard_core::types::Group>,
        target_people: Vec<draftboard_core::types::Account>,
        depends_on: Vec<draftboard_core::types::ReviewRequestRef>,
    ) -> draftboard_core::types::ReviewRequest {
        draftboard_core::types::ReviewRequest {
            id: self.id,
            local_id: self.local_id,
            local_site_id: self.local_site_id,
            submitter_id: self.submitter_id,
            summary: self.summary,
            description: self.description,
            testing_done: self.testing_done,
            bugs_closed: self.bugs_closed,
            branch: self.branch,
            public: self.public,
            has_change_descriptions,
            target_groups,
            target_people,
            depends_on,
            time_added: self.time_added.into(),
            last_updated: self.last_updated.into(),
        }
    }
}

/// The columns needed to reference a review request from another one.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = review_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReviewRequestSummary {
    pub id: i64,
    pub local_id: Option<i64>,
    pub summary: String,
}

impl From<ReviewRequestSummary> for draftboard_core::types::ReviewRequestRef {
    fn from(row: ReviewRequestSummary) -> Self {
        Self {
            id: row.id,
            display_id: row.local_id.unwrap_or(row.id),
            summary: row.summary,
        }
    }
}

/// Data for creating a new review request.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = review_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewReviewRequest {
    pub local_id: Option<i64>,
    pub local_site_id: Option<Uuid>,
    pub submitter_id: Uuid,
    pub summary: String,
    pub description: String,
    pub testing_done: String,
    pub bugs_closed: String,
    pub branch: String,
    pub public: bool,
}

/// Field values written when a draft is published.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = review_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UpdateReviewRequest {
    pub summary: String,
    pub description: String,
    pub testing_done: String,
    pub bugs_closed: String,
    pub branch: String,
    pub public: bool,
    pub time_added: Timestamp,
    pub last_updated: Timestamp,
}

impl From<&draftboard_core::types::ReviewRequest> for UpdateReviewRequest {
    fn from(review_request: &draftboard_core::types::ReviewRequest) -> Self {
        Self {
            summary: review_request.summary.clone(),
            description: review_request.description.clone(),
            testing_done: review_request.testing_done.clone(),
            bugs_closed: review_request.bugs_closed.clone(),
            branch: review_request.branch.clone(),
            public: review_request.public,
            time_added: review_request.time_added.into(),
            last_updated: review_request.last_updated.into(),
        }
    }
}
