//! In-memory store implementations for testing.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! draftboard-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! [`MemoryStore`] implements [`EntityStore`], [`DraftStore`] and
//! [`AuthzProvider`] on top of plain collections and records every write as
//! an [`Operation`], so tests can assert on write order and on the absence
//! of writes.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::types::{
    Account, ChangeDescription, Draft, Group, LocalSite, ReviewRequest, ReviewRequestRef,
    SiteScope,
};
use crate::{
    AuthzProvider, DraftCommit, DraftStore, EntityStore, Permission, PublishNotifier, Result,
};

/// A write performed by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    SaveChangeDescription { id: i64 },
    SaveDraft { id: i64, review_request_id: i64 },
    PublishReviewRequest { review_request_id: i64 },
    DeleteDraft { review_request_id: i64 },
}

#[derive(Debug, Default)]
struct State {
    accounts: BTreeMap<Uuid, Account>,
    sites: BTreeMap<Uuid, LocalSite>,
    members: HashSet<(Uuid, Uuid)>,
    grants: HashSet<(Uuid, Permission, Option<Uuid>)>,
    groups: Vec<Group>,
    review_requests: BTreeMap<i64, ReviewRequest>,
    drafts: BTreeMap<i64, Draft>,
    change_descriptions: BTreeMap<i64, ChangeDescription>,
    last_id: i64,
    operations: Vec<Operation>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn review_request_in(&self, site: &SiteScope, display_id: i64) -> Option<&ReviewRequest> {
        self.review_requests.values().find(|review_request| {
            site.contains(review_request.local_site_id)
                && review_request.display_id() == display_id
        })
    }
}

/// Thread-safe in-memory store for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account and returns it.
    pub async fn insert_account(&self, account: Account) -> Account {
        let mut state = self.state.lock().await;
        state.accounts.insert(account.id, account.clone());
        account
    }

    /// Adds a local site and returns it.
    pub async fn insert_local_site(&self, site: LocalSite) -> LocalSite {
        let mut state = self.state.lock().await;
        state.sites.insert(site.id, site.clone());
        site
    }

    /// Makes an account a member of a local site.
    pub async fn add_site_member(&self, local_site_id: Uuid, account_id: Uuid) {
        let mut state = self.state.lock().await;
        state.members.insert((local_site_id, account_id));
    }

    /// Grants a permission site-wide, or for one local site.
    pub async fn grant_permission(
        &self,
        account_id: Uuid,
        permission: Permission,
        local_site_id: Option<Uuid>,
    ) {
        let mut state = self.state.lock().await;
        state.grants.insert((account_id, permission, local_site_id));
    }

    /// Adds a group and returns it.
    pub async fn insert_group(&self, group: Group) -> Group {
        let mut state = self.state.lock().await;
        state.groups.push(group.clone());
        group
    }

    /// Adds or replaces a review request and returns it.
    pub async fn insert_review_request(&self, review_request: ReviewRequest) -> ReviewRequest {
        let mut state = self.state.lock().await;
        let last_id = state.last_id.max(review_request.id);
        state.last_id = last_id;
        state
            .review_requests
            .insert(review_request.id, review_request.clone());
        review_request
    }

    /// Returns a review request by global identifier.
    pub async fn review_request(&self, review_request_id: i64) -> Option<ReviewRequest> {
        let state = self.state.lock().await;
        state.review_requests.get(&review_request_id).cloned()
    }

    /// Returns the stored draft of a review request.
    pub async fn draft(&self, review_request_id: i64) -> Option<Draft> {
        let state = self.state.lock().await;
        state.drafts.get(&review_request_id).cloned()
    }

    /// Returns a stored change description.
    pub async fn change_description(&self, id: i64) -> Option<ChangeDescription> {
        let state = self.state.lock().await;
        state.change_descriptions.get(&id).cloned()
    }

    /// Returns every write performed so far, oldest first.
    pub async fn operations(&self) -> Vec<Operation> {
        let state = self.state.lock().await;
        state.operations.clone()
    }
}

#[async_trait::async_trait]
impl EntityStore for MemoryStore {
    async fn find_account(&self, account_id: Uuid) -> Result<Option<Account>> {
        let state = self.state.lock().await;
        Ok(state.accounts.get(&account_id).cloned())
    }

    async fn find_local_site(&self, name: &str) -> Result<Option<LocalSite>> {
        let state = self.state.lock().await;
        Ok(state.sites.values().find(|site| site.name == name).cloned())
    }

    async fn find_group(&self, site: &SiteScope, name: &str) -> Result<Option<Group>> {
        let name = name.to_lowercase();
        let state = self.state.lock().await;
        let group = state.groups.iter().find(|group| {
            site.contains(group.local_site_id)
                && (group.name.to_lowercase() == name || group.display_name.to_lowercase() == name)
        });
        Ok(group.cloned())
    }

    async fn find_user(&self, site: &SiteScope, username: &str) -> Result<Option<Account>> {
        let state = self.state.lock().await;
        let account = state.accounts.values().find(|account| {
            account.username == username
                && site
                    .local_site_id()
                    .is_none_or(|site_id| state.members.contains(&(site_id, account.id)))
        });
        Ok(account.cloned())
    }

    async fn find_review_request_ref(
        &self,
        site: &SiteScope,
        display_id: i64,
    ) -> Result<Option<ReviewRequestRef>> {
        let state = self.state.lock().await;
        Ok(state
            .review_request_in(site, display_id)
            .map(ReviewRequest::to_ref))
    }
}

#[async_trait::async_trait]
impl AuthzProvider for MemoryStore {
    async fn has_permission(
        &self,
        account: &Account,
        permission: Permission,
        local_site_id: Option<Uuid>,
    ) -> Result<bool> {
        let state = self.state.lock().await;
        let site_wide = state.grants.contains(&(account.id, permission, None));
        let site_scoped = local_site_id
            .is_some_and(|site_id| state.grants.contains(&(account.id, permission, Some(site_id))));
        Ok(site_wide || site_scoped)
    }

    async fn is_site_member(&self, account: &Account, local_site_id: Uuid) -> Result<bool> {
        let state = self.state.lock().await;
        Ok(state.members.contains(&(local_site_id, account.id)))
    }
}

#[async_trait::async_trait]
impl DraftStore for MemoryStore {
    async fn load_review_request(
        &self,
        site: &SiteScope,
        display_id: i64,
    ) -> Result<Option<ReviewRequest>> {
        let state = self.state.lock().await;
        Ok(state.review_request_in(site, display_id).cloned())
    }

    async fn find_draft(&self, review_request: &ReviewRequest) -> Result<Option<Draft>> {
        let state = self.state.lock().await;
        Ok(state.drafts.get(&review_request.id).cloned())
    }

    async fn commit(&self, commit: DraftCommit) -> Result<Draft> {
        let saves_change_description = commit.saves_change_description();
        let DraftCommit { mut draft, publish, .. } = commit;
        let mut state = self.state.lock().await;

        if saves_change_description && let Some(changedesc) = draft.changedesc.as_mut() {
            let id = match changedesc.id {
                Some(id) => id,
                None => state.next_id(),
            };
            changedesc.id = Some(id);
            state.change_descriptions.insert(id, changedesc.clone());
            state
                .operations
                .push(Operation::SaveChangeDescription { id });
        }

        let existing = state
            .drafts
            .get(&draft.review_request_id)
            .and_then(|stored| stored.id);
        let id = match draft.id.or(existing) {
            Some(id) => id,
            None => state.next_id(),
        };
        draft.id = Some(id);
        state.drafts.insert(draft.review_request_id, draft.clone());
        state.operations.push(Operation::SaveDraft {
            id,
            review_request_id: draft.review_request_id,
        });

        if let Some(plan) = publish {
            let review_request_id = plan.review_request.id;
            if let Some(mut changedesc) = plan.change_description {
                let saved_id = draft.changedesc.as_ref().and_then(|saved| saved.id);
                let id = match changedesc.id.or(saved_id) {
                    Some(id) => id,
                    None => state.next_id(),
                };
                changedesc.id = Some(id);
                state.change_descriptions.insert(id, changedesc);
            }

            state
                .review_requests
                .insert(review_request_id, plan.review_request);
            state.drafts.remove(&review_request_id);
            state
                .operations
                .push(Operation::PublishReviewRequest { review_request_id });
            state
                .operations
                .push(Operation::DeleteDraft { review_request_id });
        }

        Ok(draft)
    }

    async fn delete_draft(&self, review_request_id: i64) -> Result<bool> {
        let mut state = self.state.lock().await;
        let Some(draft) = state.drafts.remove(&review_request_id) else {
            return Ok(false);
        };

        if let Some(id) = draft.changedesc.and_then(|changedesc| changedesc.id) {
            state.change_descriptions.remove(&id);
        }
        state
            .operations
            .push(Operation::DeleteDraft { review_request_id });

        Ok(true)
    }
}

/// A [`PublishNotifier`] that counts publish events.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    published: AtomicUsize,
}

impl RecordingNotifier {
    /// Returns the number of publish events received.
    pub fn count(&self) -> usize {
        self.published.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PublishNotifier for RecordingNotifier {
    async fn review_request_published(
        &self,
        _publisher: &Account,
        _review_request: &ReviewRequest,
        _changedesc: Option<&ChangeDescription>,
    ) {
        self.published.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn review_requests_are_scoped_by_site() {
        let store = MemoryStore::new();
        let site = store.insert_local_site(LocalSite::new("acme")).await;
        let owner = Uuid::now_v7();
        store
            .insert_review_request(ReviewRequest::new(1, owner, "Global"))
            .await;
        store
            .insert_review_request(ReviewRequest::new(2, owner, "Local").with_local_site(site.id, 1))
            .await;

        let global = store.find_review_request_ref(&SiteScope::Global, 1).await;
        let local = store.find_review_request_ref(&SiteScope::Local(site), 1).await;
        let hidden = store.find_review_request_ref(&SiteScope::Global, 2).await;

        assert_eq!(global.unwrap().unwrap().summary, "Global");
        assert_eq!(local.unwrap().unwrap().summary, "Local");
        assert!(hidden.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_reports_missing_draft() {
        let store = MemoryStore::new();
        assert!(!store.delete_draft(1).await.unwrap());
        assert!(store.operations().await.is_empty());
    }
}
