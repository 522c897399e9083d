use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Account, Group};
use crate::field::bug_list;

/// A lightweight reference to a review request, used for dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ReviewRequestRef {
    /// Global identifier.
    pub id: i64,
    /// Identifier as seen by users of the owning site.
    pub display_id: i64,
    /// Current summary of the referenced review request.
    pub summary: String,
}

/// A review request, the published entity a draft edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ReviewRequest {
    /// Global identifier.
    pub id: i64,
    /// Per-site identifier, present iff the request belongs to a local site.
    pub local_id: Option<i64>,
    /// Owning local site.
    pub local_site_id: Option<Uuid>,
    /// Account that submitted the review request.
    pub submitter_id: Uuid,
    pub summary: String,
    pub description: String,
    pub testing_done: String,
    /// Comma separated bug identifiers.
    pub bugs_closed: String,
    pub branch: String,
    /// Whether the review request has been published at least once.
    pub public: bool,
    /// Whether any change description was published for this request.
    pub has_change_descriptions: bool,
    pub target_groups: Vec<Group>,
    pub target_people: Vec<Account>,
    pub depends_on: Vec<ReviewRequestRef>,
    pub time_added: Timestamp,
    pub last_updated: Timestamp,
}

impl ReviewRequest {
    /// Creates an unpublished review request owned by `submitter_id`.
    pub fn new(id: i64, submitter_id: Uuid, summary: impl Into<String>) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            local_id: None,
            local_site_id: None,
            submitter_id,
            summary: summary.into(),
            description: String::new(),
            testing_done: String::new(),
            bugs_closed: String::new(),
            branch: String::new(),
            public: false,
            has_change_descriptions: false,
            target_groups: Vec::new(),
            target_people: Vec::new(),
            depends_on: Vec::new(),
            time_added: now,
            last_updated: now,
        }
    }

    /// Places the review request in a local site under `local_id`.
    pub fn with_local_site(mut self, local_site_id: Uuid, local_id: i64) -> Self {
        self.local_site_id = Some(local_site_id);
        self.local_id = Some(local_id);
        self
    }

    /// Marks the review request as published.
    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Returns the identifier users of the owning site know it by.
    pub fn display_id(&self) -> i64 {
        self.local_id.unwrap_or(self.id)
    }

    /// Returns a reference to this review request.
    pub fn to_ref(&self) -> ReviewRequestRef {
        ReviewRequestRef {
            id: self.id,
            display_id: self.display_id(),
            summary: self.summary.clone(),
        }
    }

    /// Returns the sorted list of closed bugs.
    pub fn bug_list(&self) -> Vec<String> {
        bug_list(&self.bugs_closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_id_prefers_local_id() {
        let submitter = Uuid::now_v7();
        let global = ReviewRequest::new(42, submitter, "Fix parser");
        assert_eq!(global.display_id(), 42);

        let local = global.with_local_site(Uuid::now_v7(), 3);
        assert_eq!(local.display_id(), 3);
        assert_eq!(local.to_ref().id, 42);
        assert_eq!(local.to_ref().display_id, 3);
    }
}
