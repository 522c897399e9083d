//! Merging a draft into its review request.

use std::collections::BTreeSet;

use jiff::Timestamp;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::field::DraftField;
use crate::types::{ChangeDescription, Draft, ReviewRequest};

/// A field whose value differs between a review request and its draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    #[serde(skip)]
    pub field: DraftField,
    pub old: Vec<String>,
    pub new: Vec<String>,
    /// Names added to a set-valued field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added: Option<Vec<String>>,
    /// Names removed from a set-valued field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<Vec<String>>,
}

impl FieldChange {
    fn scalar(field: DraftField, old: &str, new: &str) -> Self {
        Self {
            field,
            old: vec![old.to_owned()],
            new: vec![new.to_owned()],
            added: None,
            removed: None,
        }
    }
}

/// The state a publish writes.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishPlan {
    /// The review request with the draft merged in.
    pub review_request: ReviewRequest,
    /// The change description to publish, with its field changes recorded.
    pub change_description: Option<ChangeDescription>,
    /// Fields that differ between the review request and the draft.
    pub changes: Vec<FieldChange>,
}

impl PublishPlan {
    /// Computes the result of publishing `draft` onto `review_request`.
    pub fn compute(review_request: &ReviewRequest, draft: &Draft, now: Timestamp) -> Self {
        let mut merged = review_request.clone();
        let mut changes = Vec::new();

        merge_text(&mut changes, DraftField::Summary, &mut merged.summary, &draft.summary);
        merge_text(
            &mut changes,
            DraftField::Description,
            &mut merged.description,
            &draft.description,
        );
        merge_text(
            &mut changes,
            DraftField::TestingDone,
            &mut merged.testing_done,
            &draft.testing_done,
        );
        merge_text(&mut changes, DraftField::Branch, &mut merged.branch, &draft.branch);

        merge_set(
            &mut changes,
            DraftField::TargetGroups,
            &mut merged.target_groups,
            &draft.target_groups,
            |group| group.id.to_string(),
            |group| group.name.clone(),
        );
        merge_set(
            &mut changes,
            DraftField::TargetPeople,
            &mut merged.target_people,
            &draft.target_people,
            |account| account.id.to_string(),
            |account| account.username.clone(),
        );
        merge_set(
            &mut changes,
            DraftField::DependsOn,
            &mut merged.depends_on,
            &draft.depends_on,
            |reference| reference.id.to_string(),
            |reference| reference.summary.clone(),
        );

        let old_bugs = merged.bug_list();
        let new_bugs = draft.bug_list();
        let old_set: BTreeSet<&String> = old_bugs.iter().collect();
        let new_set: BTreeSet<&String> = new_bugs.iter().collect();
        if old_set != new_set {
            merged.bugs_closed = draft.bugs_closed.clone();
            changes.push(FieldChange {
                field: DraftField::BugsClosed,
                old: old_bugs,
                new: new_bugs,
                added: None,
                removed: None,
            });
        }

        if !merged.public && !merged.has_change_descriptions {
            merged.time_added = now;
        }

        let change_description = draft
            .changedesc
            .clone()
            .or_else(|| review_request.public.then(ChangeDescription::new))
            .map(|mut changedesc| {
                changedesc.public = true;
                changedesc.timestamp = now;
                changedesc.fields_changed = record_changes(&changes);
                changedesc
            });

        merged.public = true;
        merged.last_updated = now;
        merged.has_change_descriptions |= change_description.is_some();

        Self {
            review_request: merged,
            change_description,
            changes,
        }
    }

    /// Returns the fields the publish changes.
    pub fn changed_fields(&self) -> impl Iterator<Item = DraftField> + '_ {
        self.changes.iter().map(|change| change.field)
    }
}

fn merge_text(changes: &mut Vec<FieldChange>, field: DraftField, old: &mut String, new: &str) {
    if old.as_str() != new {
        changes.push(FieldChange::scalar(field, old, new));
        *old = new.to_owned();
    }
}

fn merge_set<T: Clone>(
    changes: &mut Vec<FieldChange>,
    field: DraftField,
    old: &mut Vec<T>,
    new: &[T],
    id: impl Fn(&T) -> String,
    name: impl Fn(&T) -> String,
) {
    let old_ids: BTreeSet<String> = old.iter().map(&id).collect();
    let new_ids: BTreeSet<String> = new.iter().map(&id).collect();
    if old_ids == new_ids {
        return;
    }

    changes.push(FieldChange {
        field,
        old: old.iter().map(&name).collect(),
        new: new.iter().map(&name).collect(),
        added: Some(
            new.iter()
                .filter(|item| !old_ids.contains(&id(*item)))
                .map(&name)
                .collect(),
        ),
        removed: Some(
            old.iter()
                .filter(|item| !new_ids.contains(&id(*item)))
                .map(&name)
                .collect(),
        ),
    });
    *old = new.to_vec();
}

fn record_changes(changes: &[FieldChange]) -> Map<String, Value> {
    changes
        .iter()
        .filter_map(|change| {
            let record = serde_json::to_value(change).ok()?;
            Some((change.field.to_string(), record))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::types::{Account, Group};

    fn published_request() -> ReviewRequest {
        let mut review_request =
            ReviewRequest::new(7, Uuid::now_v7(), "Add retries").with_public(true);
        review_request.bugs_closed = "12,4".into();
        review_request.target_people = vec![Account::new("alice")];
        review_request
    }

    #[test]
    fn unchanged_draft_records_nothing() {
        let review_request = published_request();
        let draft = Draft::from_review_request(&review_request);

        let plan = PublishPlan::compute(&review_request, &draft, Timestamp::now());

        assert!(plan.changes.is_empty());
        let changedesc = plan.change_description.unwrap();
        assert!(changedesc.public);
        assert!(changedesc.fields_changed.is_empty());
    }

    #[test]
    fn records_scalar_set_and_bug_changes() {
        let review_request = published_request();
        let mut draft = Draft::from_review_request(&review_request);
        let bob = Account::new("bob");
        draft.summary = "Add retries with backoff".into();
        draft.target_people = vec![bob.clone()];
        draft.bugs_closed = "4,12,9".into();

        let plan = PublishPlan::compute(&review_request, &draft, Timestamp::now());

        let fields: Vec<_> = plan.changed_fields().collect();
        assert_eq!(
            fields,
            vec![
                DraftField::Summary,
                DraftField::TargetPeople,
                DraftField::BugsClosed
            ]
        );

        let recorded = plan.change_description.unwrap().fields_changed;
        assert_eq!(
            recorded["summary"],
            json!({"old": ["Add retries"], "new": ["Add retries with backoff"]})
        );
        assert_eq!(
            recorded["target_people"],
            json!({"old": ["alice"], "new": ["bob"], "added": ["bob"], "removed": ["alice"]})
        );
        assert_eq!(
            recorded["bugs_closed"],
            json!({"old": ["4", "12"], "new": ["4", "9", "12"]})
        );

        assert_eq!(plan.review_request.summary, "Add retries with backoff");
        assert_eq!(plan.review_request.target_people, vec![bob]);
        assert_eq!(plan.review_request.bugs_closed, "4,12,9");
    }

    #[test]
    fn reordered_bugs_are_not_a_change() {
        let review_request = published_request();
        let mut draft = Draft::from_review_request(&review_request);
        draft.bugs_closed = "4, 12".into();

        let plan = PublishPlan::compute(&review_request, &draft, Timestamp::now());

        assert!(plan.changes.is_empty());
        assert_eq!(plan.review_request.bugs_closed, "12,4");
    }

    #[test]
    fn first_publish_resets_time_added() {
        let mut review_request = ReviewRequest::new(7, Uuid::now_v7(), "Add retries");
        review_request.time_added = Timestamp::UNIX_EPOCH;
        let mut draft = Draft::from_review_request(&review_request);
        draft.target_groups = vec![Group::new("core", "Core Team")];
        let now = Timestamp::now();

        let plan = PublishPlan::compute(&review_request, &draft, now);

        assert!(plan.review_request.public);
        assert_eq!(plan.review_request.time_added, now);
        assert!(plan.change_description.is_none());
        assert!(!plan.review_request.has_change_descriptions);
    }

    #[test]
    fn republish_keeps_time_added() {
        let mut review_request = published_request();
        review_request.time_added = Timestamp::UNIX_EPOCH;
        let draft = Draft::from_review_request(&review_request);

        let plan = PublishPlan::compute(&review_request, &draft, Timestamp::now());

        assert_eq!(plan.review_request.time_added, Timestamp::UNIX_EPOCH);
        assert!(plan.review_request.has_change_descriptions);
    }
}
