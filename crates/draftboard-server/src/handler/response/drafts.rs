//! Draft response types.
//!
//! Field names follow the names clients submit, so a response can be edited
//! and sent back as an update.

use draftboard_core::types::{self, Account, Group, ReviewRequestRef};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Format of `last_updated`, always in UTC.
const LAST_UPDATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A review request as referenced from a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReviewRequestLink {
    /// Identifier as seen by users of the site the request was made under.
    pub id: i64,
    pub summary: String,
}

impl From<&ReviewRequestRef> for ReviewRequestLink {
    fn from(reference: &ReviewRequestRef) -> Self {
        Self {
            id: reference.display_id,
            summary: reference.summary.clone(),
        }
    }
}

/// A targeted review group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GroupLink {
    pub name: String,
    pub display_name: String,
}

impl From<&Group> for GroupLink {
    fn from(group: &Group) -> Self {
        Self {
            name: group.name.clone(),
            display_name: group.display_name.clone(),
        }
    }
}

/// A targeted reviewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UserLink {
    pub username: String,
    pub display_name: String,
}

impl From<&Account> for UserLink {
    fn from(account: &Account) -> Self {
        Self {
            username: account.username.clone(),
            display_name: account.display_name.clone(),
        }
    }
}

/// Pending edits of a review request.
#[must_use]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Draft {
    /// `null` until the draft was first saved.
    pub id: Option<i64>,
    pub review_request: ReviewRequestLink,
    /// Last modification, formatted as `YYYY-MM-DD HH:MM:SS` in UTC.
    pub last_updated: String,
    pub branch: String,
    pub bugs_closed: Vec<String>,
    pub depends_on: Vec<ReviewRequestLink>,
    /// Change description text, empty when there is none.
    pub changedescription: String,
    pub description: String,
    /// Always `false`. A published draft no longer exists.
    pub public: bool,
    pub summary: String,
    pub target_groups: Vec<GroupLink>,
    pub target_people: Vec<UserLink>,
    pub testing_done: String,
}

impl Draft {
    /// Creates a response from a stored or unsaved draft.
    pub fn from_draft(draft: &types::Draft, review_request: ReviewRequestLink) -> Self {
        Self {
            id: draft.id,
            review_request,
            last_updated: draft.last_updated.strftime(LAST_UPDATED_FORMAT).to_string(),
            branch: draft.branch.clone(),
            bugs_closed: draft.bug_list(),
            depends_on: draft.depends_on.iter().map(ReviewRequestLink::from).collect(),
            changedescription: draft.changedescription().to_owned(),
            description: draft.description.clone(),
            public: false,
            summary: draft.summary.clone(),
            target_groups: draft.target_groups.iter().map(GroupLink::from).collect(),
            target_people: draft.target_people.iter().map(UserLink::from).collect(),
            testing_done: draft.testing_done.clone(),
        }
    }
}

/// Body of every successful draft response.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DraftEnvelope {
    pub draft: Draft,
}

impl From<Draft> for DraftEnvelope {
    fn from(draft: Draft) -> Self {
        Self { draft }
    }
}

#[cfg(test)]
mod tests {
    use draftboard_core::types::{ChangeDescription, ReviewRequest};
    use jiff::Timestamp;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn serializes_draft_fields() {
        let mut review_request = ReviewRequest::new(3, Uuid::now_v7(), "Fix crash");
        review_request.public = true;
        let mut draft = types::Draft::from_review_request(&review_request);
        draft.bugs_closed = "12,4".into();
        draft.target_groups = vec![Group::new("core", "Core Team")];
        draft.target_people = vec![Account::new("alice").with_display_name("Alice")];
        draft.depends_on = vec![ReviewRequestRef {
            id: 40,
            display_id: 2,
            summary: "Refactor".into(),
        }];
        draft.changedesc = Some(ChangeDescription {
            text: "Addressed comments".into(),
            ..ChangeDescription::new()
        });
        draft.last_updated = "2024-03-09T14:05:07Z".parse::<Timestamp>().unwrap();

        let response = Draft::from_draft(&draft, ReviewRequestLink::from(&review_request.to_ref()));
        let json = serde_json::to_value(DraftEnvelope::from(response)).unwrap();
        let draft = &json["draft"];

        assert!(draft["id"].is_null());
        assert_eq!(draft["review_request"]["id"], 3);
        assert_eq!(draft["last_updated"], "2024-03-09 14:05:07");
        assert_eq!(draft["bugs_closed"], serde_json::json!(["4", "12"]));
        assert_eq!(draft["depends_on"][0]["id"], 2);
        assert_eq!(draft["changedescription"], "Addressed comments");
        assert_eq!(draft["public"], false);
        assert_eq!(draft["target_groups"][0]["display_name"], "Core Team");
        assert_eq!(draft["target_people"][0]["username"], "alice");
    }
}
