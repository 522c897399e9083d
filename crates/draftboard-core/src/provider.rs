//! Storage, permission and notification seams.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::field::SideEffect;
use crate::types::{
    Account, ChangeDescription, Draft, Group, LocalSite, ReviewRequest, ReviewRequestRef,
    SiteScope,
};
use crate::{PublishPlan, Result, TRACING_TARGET_PUBLISH};

/// A permission that can be granted site-wide or for a single local site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, AsRefStr, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Permission {
    /// Edit review requests submitted by other accounts.
    #[serde(rename = "can_edit_review_request")]
    #[strum(serialize = "can_edit_review_request")]
    EditReviewRequest,
}

/// Lookup of the entities draft fields refer to.
///
/// Lookups are restricted to the given [`SiteScope`].
#[async_trait::async_trait]
pub trait EntityStore: Send + Sync {
    /// Finds an account by identifier.
    async fn find_account(&self, account_id: Uuid) -> Result<Option<Account>>;

    /// Finds a local site by its URL name.
    async fn find_local_site(&self, name: &str) -> Result<Option<LocalSite>>;

    /// Finds a group whose name or display name matches, ignoring case.
    async fn find_group(&self, site: &SiteScope, name: &str) -> Result<Option<Group>>;

    /// Finds an account by exact username.
    ///
    /// Within a local site only members of that site match.
    async fn find_user(&self, site: &SiteScope, username: &str) -> Result<Option<Account>>;

    /// Finds a review request by the identifier users of the site see.
    async fn find_review_request_ref(
        &self,
        site: &SiteScope,
        display_id: i64,
    ) -> Result<Option<ReviewRequestRef>>;
}

/// Permission and membership checks.
#[async_trait::async_trait]
pub trait AuthzProvider: Send + Sync {
    /// Returns true if `account` holds `permission` site-wide, or for
    /// `local_site_id` when given.
    async fn has_permission(
        &self,
        account: &Account,
        permission: Permission,
        local_site_id: Option<Uuid>,
    ) -> Result<bool>;

    /// Returns true if `account` is a member of the local site.
    async fn is_site_member(&self, account: &Account, local_site_id: Uuid) -> Result<bool>;
}

/// Everything a single update writes, applied atomically.
#[derive(Debug, Clone)]
pub struct DraftCommit {
    /// The draft to save.
    pub draft: Draft,
    /// Side objects modified by the update.
    pub modified: Vec<SideEffect>,
    /// Publish the draft after saving it.
    pub publish: Option<PublishPlan>,
}

impl DraftCommit {
    /// Returns true if the draft's change description must be written
    /// before the draft.
    pub fn saves_change_description(&self) -> bool {
        match &self.draft.changedesc {
            Some(changedesc) => {
                changedesc.id.is_none() || self.modified.contains(&SideEffect::ChangeDescription)
            }
            None => false,
        }
    }
}

/// Persistence of review requests and their drafts.
#[async_trait::async_trait]
pub trait DraftStore: Send + Sync {
    /// Loads a review request by the identifier users of the site see.
    async fn load_review_request(
        &self,
        site: &SiteScope,
        display_id: i64,
    ) -> Result<Option<ReviewRequest>>;

    /// Loads the draft of a review request.
    async fn find_draft(&self, review_request: &ReviewRequest) -> Result<Option<Draft>>;

    /// Saves modified side objects, then the draft, then applies the
    /// publish plan if any, in one transaction.
    ///
    /// Returns the draft as saved, with identifiers assigned.
    async fn commit(&self, commit: DraftCommit) -> Result<Draft>;

    /// Deletes the draft of a review request together with its unpublished
    /// change description. Returns false if there was no draft.
    async fn delete_draft(&self, review_request_id: i64) -> Result<bool>;
}

/// Receives review request publish events after they were committed.
#[async_trait::async_trait]
pub trait PublishNotifier: Send + Sync {
    async fn review_request_published(
        &self,
        publisher: &Account,
        review_request: &ReviewRequest,
        changedesc: Option<&ChangeDescription>,
    );
}

/// A [`PublishNotifier`] that only emits a log event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl PublishNotifier for LogNotifier {
    async fn review_request_published(
        &self,
        publisher: &Account,
        review_request: &ReviewRequest,
        changedesc: Option<&ChangeDescription>,
    ) {
        let changed_fields = changedesc.map_or(0, |c| c.fields_changed.len());
        tracing::info!(
            target: TRACING_TARGET_PUBLISH,
            review_request_id = review_request.id,
            publisher = %publisher.username,
            changed_fields,
            "review request published"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn permission_name() {
        assert_eq!(
            Permission::EditReviewRequest.as_ref(),
            "can_edit_review_request"
        );
        assert_eq!(
            Permission::from_str("can_edit_review_request").ok(),
            Some(Permission::EditReviewRequest)
        );
    }

    #[test]
    fn new_change_description_is_always_saved() {
        let review_request = ReviewRequest::new(1, Uuid::now_v7(), "Summary").with_public(true);
        let mut draft = Draft::from_review_request(&review_request);

        let commit = DraftCommit {
            draft: draft.clone(),
            modified: Vec::new(),
            publish: None,
        };
        assert!(commit.saves_change_description());

        draft.changedesc = Some(ChangeDescription {
            id: Some(4),
            ..ChangeDescription::new()
        });
        let unchanged = DraftCommit {
            draft: draft.clone(),
            modified: Vec::new(),
            publish: None,
        };
        assert!(!unchanged.saves_change_description());

        let modified = DraftCommit {
            draft,
            modified: vec![SideEffect::ChangeDescription],
            publish: None,
        };
        assert!(modified.saves_change_description());
    }
}
