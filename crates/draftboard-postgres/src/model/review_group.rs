use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::review_groups;

/// A review group row.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = review_groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReviewGroup {
    pub id: Uuid,
    /// Owning local site, null for global groups.
    pub local_site_id: Option<Uuid>,
    pub name: String,
    pub display_name: String,
    pub created_at: Timestamp,
}

/// Data for creating a new review group.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = review_groups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewReviewGroup {
    pub local_site_id: Option<Uuid>,
    pub name: String,
    pub display_name: String,
}

impl From<ReviewGroup> for draftboard_core::types::Group {
    fn from(row: ReviewGroup) -> Self {
        Self {
            id: row.id,
            local_site_id: row.local_site_id,
            name: row.name,
            display_name: row.display_name,
        }
    }
}
