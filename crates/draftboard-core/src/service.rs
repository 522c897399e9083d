//! Draft operations composed from the store, permission and lookup seams.

use std::sync::Arc;

use jiff::Timestamp;

use crate::field::{DraftFieldInputs, DraftFieldUpdater, FieldErrors};
use crate::types::{Draft, RequestContext, ReviewRequest, SiteScope};
use crate::{
    AuthBackendChain, AuthzProvider, DraftCommit, DraftStore, EntityStore, Error, LogNotifier,
    PublishNotifier, PublishPlan, Result, TRACING_TARGET_SERVICE, check_draft_access,
    check_site_access,
};

/// Flags accompanying a field update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Publish the draft once it was saved without errors.
    pub publish: bool,
    /// Save valid fields even when other fields were rejected.
    pub always_save: bool,
}

impl UpdateOptions {
    /// Options that publish after saving.
    pub fn publish() -> Self {
        Self {
            publish: true,
            ..Self::default()
        }
    }
}

/// Result of a field update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// All fields were applied and the draft was saved.
    Saved(Draft),
    /// Some fields were rejected. The draft reflects the accepted fields and
    /// was only saved if saving was forced.
    Invalid { fields: FieldErrors, draft: Draft },
    /// The draft was saved, merged into its review request and deleted.
    Published(Draft),
}

impl UpdateOutcome {
    /// Returns the draft carried by the outcome.
    pub fn draft(&self) -> &Draft {
        match self {
            Self::Saved(draft) | Self::Published(draft) => draft,
            Self::Invalid { draft, .. } => draft,
        }
    }
}

/// Reads, updates, publishes and discards review request drafts.
#[derive(Clone)]
pub struct DraftService {
    entities: Arc<dyn EntityStore>,
    drafts: Arc<dyn DraftStore>,
    authz: Arc<dyn AuthzProvider>,
    backends: AuthBackendChain,
    notifier: Arc<dyn PublishNotifier>,
}

impl DraftService {
    /// Creates a service without auth backends that logs publish events.
    pub fn new(
        entities: Arc<dyn EntityStore>,
        drafts: Arc<dyn DraftStore>,
        authz: Arc<dyn AuthzProvider>,
    ) -> Self {
        Self {
            entities,
            drafts,
            authz,
            backends: AuthBackendChain::new(),
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Creates a service backed by a single store implementing every seam.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: EntityStore + DraftStore + AuthzProvider + 'static,
    {
        Self::new(store.clone(), store.clone(), store)
    }

    /// Sets the auth backends consulted for unknown usernames.
    pub fn with_backends(mut self, backends: AuthBackendChain) -> Self {
        self.backends = backends;
        self
    }

    /// Sets the receiver of publish events.
    pub fn with_notifier(mut self, notifier: Arc<dyn PublishNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Returns the entity store.
    pub fn entities(&self) -> &dyn EntityStore {
        self.entities.as_ref()
    }

    /// Resolves the site a request addresses, by URL name.
    pub async fn resolve_site(&self, local_site_name: Option<&str>) -> Result<SiteScope> {
        let Some(name) = local_site_name else {
            return Ok(SiteScope::Global);
        };

        match self.entities.find_local_site(name).await? {
            Some(site) => Ok(SiteScope::Local(site)),
            None => Err(Error::not_found().with_message("Local site does not exist")),
        }
    }

    /// Returns the existing draft of a review request.
    #[tracing::instrument(skip_all, fields(review_request_id = display_id))]
    pub async fn get(&self, context: &RequestContext, display_id: i64) -> Result<Draft> {
        let review_request = self.review_request(context, display_id).await?;
        let draft = self.existing_draft(&review_request).await?;
        check_draft_access(self.authz.as_ref(), context, &review_request).await?;

        Ok(draft)
    }

    /// Applies field inputs to the draft, creating it on demand.
    ///
    /// Nothing is written when a field is rejected, unless
    /// [`UpdateOptions::always_save`] is set. Publishing only happens when
    /// every field was accepted.
    #[tracing::instrument(skip_all, fields(review_request_id = display_id, publish = options.publish))]
    pub async fn update(
        &self,
        context: &RequestContext,
        display_id: i64,
        inputs: &DraftFieldInputs,
        options: UpdateOptions,
    ) -> Result<UpdateOutcome> {
        let review_request = self.review_request(context, display_id).await?;
        check_draft_access(self.authz.as_ref(), context, &review_request).await?;

        let mut draft = match self.drafts.find_draft(&review_request).await? {
            Some(draft) => draft,
            None => Draft::from_review_request(&review_request),
        };

        let updater = DraftFieldUpdater::new(self.entities.as_ref(), &self.backends, context);
        let applied = updater.apply_fields(&mut draft, inputs).await;
        let has_errors = applied.has_errors();

        if has_errors && !options.always_save {
            tracing::info!(
                target: TRACING_TARGET_SERVICE,
                invalid_fields = applied.invalid.len(),
                "draft update rejected"
            );
            return Ok(UpdateOutcome::Invalid {
                fields: applied.invalid,
                draft,
            });
        }

        let now = Timestamp::now();
        draft.last_updated = now;

        let publish = if options.publish && !has_errors {
            check_draft_access(self.authz.as_ref(), context, &review_request).await?;
            Some(PublishPlan::compute(&review_request, &draft, now))
        } else {
            None
        };

        let saved = self
            .drafts
            .commit(DraftCommit {
                draft,
                modified: applied.modified,
                publish: publish.clone(),
            })
            .await?;

        if let Some(plan) = publish {
            self.notifier
                .review_request_published(
                    &context.requester,
                    &plan.review_request,
                    plan.change_description.as_ref(),
                )
                .await;
            return Ok(UpdateOutcome::Published(saved));
        }

        if has_errors {
            return Ok(UpdateOutcome::Invalid {
                fields: applied.invalid,
                draft: saved,
            });
        }

        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            draft_id = saved.id,
            "draft saved"
        );

        Ok(UpdateOutcome::Saved(saved))
    }

    /// Discards the existing draft of a review request.
    #[tracing::instrument(skip_all, fields(review_request_id = display_id))]
    pub async fn delete(&self, context: &RequestContext, display_id: i64) -> Result<()> {
        let review_request = self.review_request(context, display_id).await?;
        self.existing_draft(&review_request).await?;
        check_draft_access(self.authz.as_ref(), context, &review_request).await?;

        if !self.drafts.delete_draft(review_request.id).await? {
            return Err(draft_not_found());
        }

        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            review_request_id = review_request.id,
            "draft discarded"
        );

        Ok(())
    }

    async fn review_request(
        &self,
        context: &RequestContext,
        display_id: i64,
    ) -> Result<ReviewRequest> {
        check_site_access(self.authz.as_ref(), context).await?;

        self.drafts
            .load_review_request(&context.site, display_id)
            .await?
            .ok_or_else(|| Error::not_found().with_message("Review request does not exist"))
    }

    async fn existing_draft(&self, review_request: &ReviewRequest) -> Result<Draft> {
        self.drafts
            .find_draft(review_request)
            .await?
            .ok_or_else(draft_not_found)
    }
}

fn draft_not_found() -> Error {
    Error::not_found().with_message("Draft does not exist")
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use uuid::Uuid;

    use super::*;
    use crate::field::{CHANGE_DESCRIPTION_ON_NEW_REQUEST, DraftField, SUMMARY_CONTAINS_NEWLINE};
    use crate::mock::{MemoryStore, Operation, RecordingNotifier};
    use crate::types::{Account, Group, LocalSite};
    use crate::{ErrorKind, Permission};

    struct Fixture {
        store: Arc<MemoryStore>,
        notifier: Arc<RecordingNotifier>,
        service: DraftService,
        owner: Account,
        stranger: Account,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let owner = store.insert_account(Account::new("owner")).await;
        let stranger = store.insert_account(Account::new("stranger")).await;
        store.insert_account(Account::new("alice")).await;
        store.insert_group(Group::new("core", "Core Team")).await;

        let unpublished = ReviewRequest::new(1, owner.id, "Add retries");
        store.insert_review_request(unpublished).await;
        let mut published = ReviewRequest::new(2, owner.id, "Fix parser").with_public(true);
        published.bugs_closed = "7".into();
        store.insert_review_request(published).await;

        let notifier = Arc::new(RecordingNotifier::default());
        let service = DraftService::from_store(store.clone()).with_notifier(notifier.clone());

        Fixture {
            store,
            notifier,
            service,
            owner,
            stranger,
        }
    }

    #[tokio::test]
    async fn update_creates_draft_on_demand() {
        let f = fixture().await;
        let context = RequestContext::global(f.owner.clone());
        let inputs = DraftFieldInputs::default()
            .with(DraftField::Summary, "Add retries with backoff")
            .with(DraftField::TargetPeople, "alice")
            .with(DraftField::BugsClosed, "#12, 34 ,, #56");

        let outcome = f
            .service
            .update(&context, 1, &inputs, UpdateOptions::default())
            .await
            .unwrap();

        let UpdateOutcome::Saved(draft) = outcome else {
            panic!("expected a saved draft");
        };
        assert!(draft.is_persisted());
        assert_eq!(draft.summary, "Add retries with backoff");
        assert_eq!(draft.bugs_closed, "12,34,56");

        let stored = f.store.draft(1).await.unwrap();
        assert_eq!(stored.target_people[0].username, "alice");
    }

    #[tokio::test]
    async fn invalid_update_persists_nothing() {
        let f = fixture().await;
        let context = RequestContext::global(f.owner.clone());
        let before = f.store.operations().await;
        let inputs = DraftFieldInputs::default()
            .with(DraftField::Summary, "two\nlines")
            .with(DraftField::TargetGroups, "core, nobody")
            .with(DraftField::Branch, "main");

        let outcome = f
            .service
            .update(&context, 2, &inputs, UpdateOptions::publish())
            .await
            .unwrap();

        let UpdateOutcome::Invalid { fields, draft } = outcome else {
            panic!("expected validation errors");
        };
        assert_eq!(fields[&DraftField::Summary], vec![SUMMARY_CONTAINS_NEWLINE]);
        assert_eq!(fields[&DraftField::TargetGroups], vec!["nobody"]);
        assert_eq!(draft.branch, "main");
        assert_eq!(draft.summary, "Fix parser");
        assert!(!draft.is_persisted());

        assert!(f.store.draft(2).await.is_none());
        assert_eq!(f.store.operations().await, before);
        assert_eq!(f.notifier.count(), 0);
    }

    #[tokio::test]
    async fn forced_save_keeps_valid_fields() {
        let f = fixture().await;
        let context = RequestContext::global(f.owner.clone());
        let inputs = DraftFieldInputs::default()
            .with(DraftField::ChangeDescription, "Rebased")
            .with(DraftField::Description, "Retries uploads");
        let options = UpdateOptions {
            publish: true,
            always_save: true,
        };

        let outcome = f.service.update(&context, 1, &inputs, options).await.unwrap();

        let UpdateOutcome::Invalid { fields, draft } = outcome else {
            panic!("expected validation errors");
        };
        assert_eq!(
            fields[&DraftField::ChangeDescription],
            vec![CHANGE_DESCRIPTION_ON_NEW_REQUEST]
        );
        assert!(draft.is_persisted());
        assert_eq!(f.store.draft(1).await.unwrap().description, "Retries uploads");
        assert_eq!(f.notifier.count(), 0);
    }

    #[tokio::test]
    async fn side_objects_are_saved_before_the_draft() {
        let f = fixture().await;
        let context = RequestContext::global(f.owner.clone());
        let inputs =
            DraftFieldInputs::default().with(DraftField::ChangeDescription, "Addressed review");

        f.service
            .update(&context, 2, &inputs, UpdateOptions::default())
            .await
            .unwrap();

        let operations = f.store.operations().await;
        let changedesc = operations
            .iter()
            .position(|op| matches!(op, Operation::SaveChangeDescription { .. }));
        let draft = operations
            .iter()
            .position(|op| matches!(op, Operation::SaveDraft { .. }));
        assert!(changedesc.unwrap() < draft.unwrap());
        assert_eq!(
            f.store.draft(2).await.unwrap().changedescription(),
            "Addressed review"
        );
    }

    #[tokio::test]
    async fn publish_merges_and_removes_draft() {
        let f = fixture().await;
        let context = RequestContext::global(f.owner.clone());
        let inputs = DraftFieldInputs::default()
            .with(DraftField::Summary, "Fix parser crash")
            .with(DraftField::ChangeDescription, "Handles empty input");

        let outcome = f
            .service
            .update(&context, 2, &inputs, UpdateOptions::publish())
            .await
            .unwrap();

        assert!(matches!(outcome, UpdateOutcome::Published(_)));
        assert_eq!(f.notifier.count(), 1);
        assert!(f.store.draft(2).await.is_none());

        let review_request = f.store.review_request(2).await.unwrap();
        assert_eq!(review_request.summary, "Fix parser crash");
        assert!(review_request.has_change_descriptions);

        let err = f.service.get(&context, 2).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn delete_requires_existing_draft() {
        let f = fixture().await;
        let context = RequestContext::global(f.owner.clone());

        let err = f.service.delete(&context, 1).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(f.store.draft(1).await.is_none());
    }

    #[tokio::test]
    async fn delete_discards_draft() {
        let f = fixture().await;
        let context = RequestContext::global(f.owner.clone());
        let inputs = DraftFieldInputs::default().with(DraftField::Branch, "topic");
        f.service
            .update(&context, 1, &inputs, UpdateOptions::default())
            .await
            .unwrap();

        f.service.delete(&context, 1).await.unwrap();

        assert!(f.store.draft(1).await.is_none());
        assert_eq!(
            f.service.get(&context, 1).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[tokio::test]
    async fn stranger_cannot_touch_drafts() {
        let f = fixture().await;
        let owner = RequestContext::global(f.owner.clone());
        let stranger = RequestContext::global(f.stranger.clone());
        let inputs = DraftFieldInputs::default().with(DraftField::Branch, "topic");
        f.service
            .update(&owner, 1, &inputs, UpdateOptions::default())
            .await
            .unwrap();
        let before = f.store.operations().await;

        let update = f
            .service
            .update(&stranger, 1, &inputs, UpdateOptions::default())
            .await;
        let create = f
            .service
            .update(&stranger, 2, &inputs, UpdateOptions::default())
            .await;
        let delete = f.service.delete(&stranger, 1).await;
        let get = f.service.get(&stranger, 1).await;

        for result in [update.err(), create.err(), delete.err(), get.err()] {
            assert_eq!(result.map(|e| e.kind()), Some(ErrorKind::PermissionDenied));
        }
        assert_eq!(f.store.operations().await, before);
        assert!(f.store.draft(2).await.is_none());
    }

    /// Grants the edit permission a fixed number of times, then refuses.
    struct RevokedAfter {
        store: Arc<MemoryStore>,
        remaining: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl AuthzProvider for RevokedAfter {
        async fn has_permission(
            &self,
            _account: &Account,
            _permission: Permission,
            _local_site_id: Option<Uuid>,
        ) -> Result<bool> {
            let granted = self
                .remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            Ok(granted)
        }

        async fn is_site_member(&self, account: &Account, local_site_id: Uuid) -> Result<bool> {
            self.store.is_site_member(account, local_site_id).await
        }
    }

    #[tokio::test]
    async fn publish_rechecks_edit_permission() {
        let f = fixture().await;
        let authz = Arc::new(RevokedAfter {
            store: f.store.clone(),
            remaining: AtomicUsize::new(1),
        });
        let service = DraftService::new(f.store.clone(), f.store.clone(), authz)
            .with_notifier(f.notifier.clone());
        let context = RequestContext::global(f.stranger.clone());
        let before = f.store.operations().await;
        let inputs = DraftFieldInputs::default().with(DraftField::Branch, "release");

        let err = service
            .update(&context, 2, &inputs, UpdateOptions::publish())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert_eq!(f.store.operations().await, before);
        assert_ne!(f.store.review_request(2).await.unwrap().branch, "release");
        assert_eq!(f.notifier.count(), 0);
    }

    #[tokio::test]
    async fn missing_review_request_is_not_found() {
        let f = fixture().await;
        let context = RequestContext::global(f.owner.clone());
        let inputs = DraftFieldInputs::default();

        let err = f
            .service
            .update(&context, 404, &inputs, UpdateOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn resolves_local_sites_by_name() {
        let f = fixture().await;
        let site = f.store.insert_local_site(LocalSite::new("acme")).await;

        assert_eq!(f.service.resolve_site(None).await.unwrap(), SiteScope::Global);
        assert_eq!(
            f.service.resolve_site(Some("acme")).await.unwrap(),
            SiteScope::Local(site)
        );
        assert_eq!(
            f.service
                .resolve_site(Some("missing"))
                .await
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );
    }
}
