use diesel::prelude::*;
use jiff_diesel::Timestamp;

use crate::schema::review_request_drafts;

/// A draft row, without its relations.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = review_request_drafts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReviewRequestDraft {
    pub id: i64,
    /// Unique: a review request has at most one draft.
    pub review_request_id: i64,
    pub changedesc_id: Option<i64>,
    pub summary: String,
    pub description: String,
    pub testing_done: String,
    pub bugs_closed: String,
    pub branch: String,
    pub last_updated: Timestamp,
}

impl ReviewRequestDraft {
    /// Converts the row, attaching relations loaded separately.
    pub fn into_domain(
        self,
        changedesc: Option<draftboard_core::types::ChangeDescription>,
        target_groups: Vec<draftboard_core::types::Group>,
        target_people: Vec<draftboard_core::types::Account>,
        depends_on: Vec<draftboard_core::types::ReviewRequestRef>,
    ) -> draftboard_core::types::Draft {
        draftboard_core::types::Draft {
            id: Some(self.id),
            review_request_id: self.review_request_id,
            summary: self.summary,
            description: self.description,
            testing_done: self.testing_done,
            branch: self.branch,
            bugs_closed: self.bugs_closed,
            target_groups,
            target_people,
            depends_on,
            changedesc,
            last_updated: self.last_updated.into(),
        }
    }
}

/// Data for inserting or overwriting the draft of a review request.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = review_request_drafts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct NewReviewRequestDraft {
    pub review_request_id: i64,
    pub changedesc_id: Option<i64>,
    pub summary: String,
    pub description: String,
    pub testing_done: String,
    pub bugs_closed: String,
    pub branch: String,
    pub last_updated: Timestamp,
}

impl From<&draftboard_core::types::Draft> for NewReviewRequestDraft {
    fn from(draft: &draftboard_core::types::Draft) -> Self {
        Self {
            review_request_id: draft.review_request_id,
            changedesc_id: draft.changedesc.as_ref().and_then(|changedesc| changedesc.id),
            summary: draft.summary.clone(),
            description: draft.description.clone(),
            testing_done: draft.testing_done.clone(),
            bugs_closed: draft.bugs_closed.clone(),
            branch: draft.branch.clone(),
            last_updated: draft.last_updated.into(),
        }
    }
}
