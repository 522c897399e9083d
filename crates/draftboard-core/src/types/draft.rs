use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Account, Group, ReviewRequest, ReviewRequestRef};
use crate::field::bug_list;

/// Free text describing what changed in a publish.
///
/// Only attached to drafts of review requests that were published before.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ChangeDescription {
    /// Storage identifier, `None` until first saved.
    pub id: Option<i64>,
    pub text: String,
    /// Set once the owning draft is published.
    pub public: bool,
    pub timestamp: Timestamp,
    /// Per-field `{old, new, added, removed}` records, filled at publish.
    pub fields_changed: Map<String, Value>,
}

impl ChangeDescription {
    /// Creates an empty, unsaved change description.
    pub fn new() -> Self {
        Self {
            id: None,
            text: String::new(),
            public: false,
            timestamp: Timestamp::now(),
            fields_changed: Map::new(),
        }
    }
}

impl Default for ChangeDescription {
    fn default() -> Self {
        Self::new()
    }
}

/// Pending edits of a review request.
///
/// At most one draft exists per review request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Draft {
    /// Storage identifier, `None` until first saved.
    pub id: Option<i64>,
    pub review_request_id: i64,
    pub summary: String,
    pub description: String,
    pub testing_done: String,
    pub branch: String,
    /// Comma separated bug identifiers.
    pub bugs_closed: String,
    pub target_groups: Vec<Group>,
    pub target_people: Vec<Account>,
    pub depends_on: Vec<ReviewRequestRef>,
    pub changedesc: Option<ChangeDescription>,
    pub last_updated: Timestamp,
}

impl Draft {
    /// Creates a draft holding a copy of the review request's fields.
    ///
    /// Drafts of published review requests get an empty change description.
    pub fn from_review_request(review_request: &ReviewRequest) -> Self {
        Self {
            id: None,
            review_request_id: review_request.id,
            summary: review_request.summary.clone(),
            description: review_request.description.clone(),
            testing_done: review_request.testing_done.clone(),
            branch: review_request.branch.clone(),
            bugs_closed: review_request.bugs_closed.clone(),
            target_groups: review_request.target_groups.clone(),
            target_people: review_request.target_people.clone(),
            depends_on: review_request.depends_on.clone(),
            changedesc: review_request.public.then(ChangeDescription::new),
            last_updated: Timestamp::now(),
        }
    }

    /// Returns true once the draft has been saved.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Returns the sorted list of closed bugs.
    pub fn bug_list(&self) -> Vec<String> {
        bug_list(&self.bugs_closed)
    }

    /// Returns the change description text, or an empty string.
    pub fn changedescription(&self) -> &str {
        self.changedesc
            .as_ref()
            .map(|changedesc| changedesc.text.as_str())
            .unwrap_or_default()
    }
}
