use std::collections::BTreeMap;

use strum::IntoEnumIterator;

use super::{
    DraftField, DraftFieldInputs, FieldStrategy, FieldUpdate, FieldValue, ReferenceKind,
    ReferenceResolver, Resolution, SideEffect, apply_bug_ids, apply_change_description,
    apply_text, split_references,
};
use crate::types::{Draft, RequestContext};
use crate::{AuthBackendChain, EntityStore, TRACING_TARGET_FIELDS};

/// Rejected input tokens keyed by field.
pub type FieldErrors = BTreeMap<DraftField, Vec<String>>;

/// Outcome of applying a batch of field inputs to a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedFields {
    /// Side objects that were modified and need saving with the draft.
    pub modified: Vec<SideEffect>,
    /// Rejected input, keyed by field.
    pub invalid: FieldErrors,
}

impl AppliedFields {
    /// Returns true if any field rejected input.
    pub fn has_errors(&self) -> bool {
        !self.invalid.is_empty()
    }
}

/// Applies raw field inputs to a draft.
///
/// Fields are processed in a fixed order and a rejected field never stops
/// the remaining fields from being applied.
pub struct DraftFieldUpdater<'a> {
    resolver: ReferenceResolver<'a>,
}

impl<'a> DraftFieldUpdater<'a> {
    /// Creates an updater resolving references within the context's site.
    pub fn new(
        entities: &'a dyn EntityStore,
        backends: &'a AuthBackendChain,
        context: &'a RequestContext,
    ) -> Self {
        Self {
            resolver: ReferenceResolver::new(entities, backends, &context.site),
        }
    }

    /// Applies every supplied input to `draft`.
    ///
    /// The draft is mutated in memory only; persisting it is up to the
    /// caller.
    pub async fn apply_fields(&self, draft: &mut Draft, inputs: &DraftFieldInputs) -> AppliedFields {
        let mut applied = AppliedFields::default();

        for field in DraftField::iter() {
            let Some(raw) = inputs.get(field) else {
                continue;
            };

            let update = self.update_field(draft, field, raw).await;
            tracing::debug!(
                target: TRACING_TARGET_FIELDS,
                field = %field,
                rejected = update.errors.len(),
                "applied draft field"
            );

            assign(draft, field, update.value);

            if update.errors.is_empty() {
                for side_effect in update.side_effects {
                    if !applied.modified.contains(&side_effect) {
                        applied.modified.push(side_effect);
                    }
                }
            } else {
                applied.invalid.insert(field, update.errors);
            }
        }

        applied
    }

    /// Runs the strategy of `field` on `raw` without touching the draft.
    pub async fn update_field(&self, draft: &Draft, field: DraftField, raw: &str) -> FieldUpdate {
        match field.strategy() {
            FieldStrategy::Text { single_line } => apply_text(raw, single_line),
            FieldStrategy::BugIds => apply_bug_ids(raw),
            FieldStrategy::ChangeDescription => {
                apply_change_description(raw, draft.changedesc.is_some())
            }
            FieldStrategy::Reference(kind) => self.resolve_references(field, kind, raw).await,
        }
    }

    async fn resolve_references(
        &self,
        field: DraftField,
        kind: ReferenceKind,
        raw: &str,
    ) -> FieldUpdate {
        let mut errors = Vec::new();

        let value = match kind {
            ReferenceKind::Group => {
                let mut groups = Vec::new();
                for token in split_references(raw) {
                    match self.resolver.group(token).await {
                        Resolution::Found(group) => push_unique(&mut groups, group, |g| g.id),
                        failed => reject(&mut errors, field, token, failed),
                    }
                }
                FieldValue::Groups(groups)
            }
            ReferenceKind::User => {
                let mut people = Vec::new();
                for token in split_references(raw) {
                    match self.resolver.user(token).await {
                        Resolution::Found(account) => push_unique(&mut people, account, |a| a.id),
                        failed => reject(&mut errors, field, token, failed),
                    }
                }
                FieldValue::People(people)
            }
            ReferenceKind::ReviewRequest => {
                let mut depends_on = Vec::new();
                for token in split_references(raw) {
                    match self.resolver.review_request(token).await {
                        Resolution::Found(reference) => {
                            push_unique(&mut depends_on, reference, |r| r.id)
                        }
                        failed => reject(&mut errors, field, token, failed),
                    }
                }
                FieldValue::Dependencies(depends_on)
            }
        };

        FieldUpdate {
            value,
            side_effects: Vec::new(),
            errors,
        }
    }
}

fn push_unique<T, K: PartialEq>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> K) {
    if !items.iter().any(|existing| key(existing) == key(&item)) {
        items.push(item);
    }
}

fn reject<T>(errors: &mut Vec<String>, field: DraftField, token: &str, resolution: Resolution<T>) {
    if let Resolution::LookupError(error) = resolution {
        tracing::warn!(
            target: TRACING_TARGET_FIELDS,
            field = %field,
            token = %token,
            error = %error,
            "reference lookup failed"
        );
    }

    errors.push(token.to_owned());
}

fn assign(draft: &mut Draft, field: DraftField, value: FieldValue) {
    match value {
        FieldValue::Keep => {}
        FieldValue::Text(text) => match field {
            DraftField::Branch => draft.branch = text,
            DraftField::BugsClosed => draft.bugs_closed = text,
            DraftField::Description => draft.description = text,
            DraftField::Summary => draft.summary = text,
            DraftField::TestingDone => draft.testing_done = text,
            DraftField::ChangeDescription
            | DraftField::DependsOn
            | DraftField::TargetGroups
            | DraftField::TargetPeople => {}
        },
        FieldValue::ChangeDescription(text) => {
            if let Some(changedesc) = draft.changedesc.as_mut() {
                changedesc.text = text;
            }
        }
        FieldValue::Groups(groups) => draft.target_groups = groups,
        FieldValue::People(people) => draft.target_people = people,
        FieldValue::Dependencies(depends_on) => draft.depends_on = depends_on,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{CHANGE_DESCRIPTION_ON_NEW_REQUEST, SUMMARY_CONTAINS_NEWLINE};
    use crate::mock::MemoryStore;
    use crate::types::{Account, Group, LocalSite, ReviewRequest};

    struct Fixture {
        store: MemoryStore,
        backends: AuthBackendChain,
        context: RequestContext,
        draft: Draft,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let owner = store.insert_account(Account::new("owner")).await;
        store.insert_account(Account::new("alice")).await;
        store.insert_account(Account::new("bob")).await;
        store
            .insert_group(Group::new("core", "Core Team"))
            .await;
        store
            .insert_group(Group::new("docs", "Documentation"))
            .await;

        let dependency = ReviewRequest::new(3, owner.id, "Refactor client").with_public(true);
        store.insert_review_request(dependency).await;
        let review_request = ReviewRequest::new(7, owner.id, "Add retries");
        store.insert_review_request(review_request.clone()).await;

        Fixture {
            store,
            backends: AuthBackendChain::default(),
            context: RequestContext::global(owner),
            draft: Draft::from_review_request(&review_request),
        }
    }

    #[tokio::test]
    async fn resolves_groups_by_name_or_display_name() {
        let mut f = fixture().await;
        let updater = DraftFieldUpdater::new(&f.store, &f.backends, &f.context);
        let inputs = DraftFieldInputs::default().with(DraftField::TargetGroups, "CORE, documentation");

        let applied = updater.apply_fields(&mut f.draft, &inputs).await;

        assert!(!applied.has_errors());
        let names: Vec<_> = f.draft.target_groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["core", "docs"]);
    }

    #[tokio::test]
    async fn collects_every_unresolved_token() {
        let mut f = fixture().await;
        let updater = DraftFieldUpdater::new(&f.store, &f.backends, &f.context);
        let inputs = DraftFieldInputs::default()
            .with(DraftField::TargetPeople, "alice, mallory bob trent")
            .with(DraftField::DependsOn, "3, 99, abc");

        let applied = updater.apply_fields(&mut f.draft, &inputs).await;

        assert_eq!(
            applied.invalid.get(&DraftField::TargetPeople),
            Some(&vec!["mallory".to_owned(), "trent".to_owned()])
        );
        assert_eq!(
            applied.invalid.get(&DraftField::DependsOn),
            Some(&vec!["99".to_owned(), "abc".to_owned()])
        );

        let people: Vec<_> = f.draft.target_people.iter().map(|a| a.username.as_str()).collect();
        assert_eq!(people, vec!["alice", "bob"]);
        assert_eq!(f.draft.depends_on.len(), 1);
        assert_eq!(f.draft.depends_on[0].summary, "Refactor client");
    }

    #[tokio::test]
    async fn applying_the_same_references_twice_is_idempotent() {
        let mut f = fixture().await;
        let updater = DraftFieldUpdater::new(&f.store, &f.backends, &f.context);
        let inputs = DraftFieldInputs::default().with(DraftField::TargetPeople, "alice,alice bob");

        updater.apply_fields(&mut f.draft, &inputs).await;
        let first = f.draft.target_people.clone();
        updater.apply_fields(&mut f.draft, &inputs).await;

        assert_eq!(first.len(), 2);
        assert_eq!(f.draft.target_people, first);
    }

    #[tokio::test]
    async fn rejected_summary_leaves_value_and_other_fields_apply() {
        let mut f = fixture().await;
        let updater = DraftFieldUpdater::new(&f.store, &f.backends, &f.context);
        let inputs = DraftFieldInputs::default()
            .with(DraftField::Summary, "two\nlines")
            .with(DraftField::Branch, "release-2.0")
            .with(DraftField::BugsClosed, "#12, 34 ,, #56");

        let applied = updater.apply_fields(&mut f.draft, &inputs).await;

        assert_eq!(
            applied.invalid.get(&DraftField::Summary),
            Some(&vec![SUMMARY_CONTAINS_NEWLINE.to_owned()])
        );
        assert_eq!(f.draft.summary, "Add retries");
        assert_eq!(f.draft.branch, "release-2.0");
        assert_eq!(f.draft.bugs_closed, "12,34,56");
    }

    #[tokio::test]
    async fn change_description_rejected_for_new_request() {
        let mut f = fixture().await;
        let updater = DraftFieldUpdater::new(&f.store, &f.backends, &f.context);
        let inputs = DraftFieldInputs::default().with(DraftField::ChangeDescription, "Rebased");

        let applied = updater.apply_fields(&mut f.draft, &inputs).await;

        assert!(applied.modified.is_empty());
        assert_eq!(
            applied.invalid.get(&DraftField::ChangeDescription),
            Some(&vec![CHANGE_DESCRIPTION_ON_NEW_REQUEST.to_owned()])
        );
        assert!(f.draft.changedesc.is_none());
    }

    #[tokio::test]
    async fn change_description_marks_side_effect() {
        let mut f = fixture().await;
        f.draft.changedesc = Some(Default::default());
        let updater = DraftFieldUpdater::new(&f.store, &f.backends, &f.context);
        let inputs = DraftFieldInputs::default().with(DraftField::ChangeDescription, "Rebased");

        let applied = updater.apply_fields(&mut f.draft, &inputs).await;

        assert!(!applied.has_errors());
        assert_eq!(applied.modified, vec![SideEffect::ChangeDescription]);
        assert_eq!(f.draft.changedescription(), "Rebased");
    }

    #[tokio::test]
    async fn local_site_limits_lookups_to_members() {
        let mut f = fixture().await;
        let site = f.store.insert_local_site(LocalSite::new("acme")).await;
        let carol = f.store.insert_account(Account::new("carol")).await;
        f.store.add_site_member(site.id, carol.id).await;
        f.store
            .insert_group(Group::new("core", "Acme Core").with_local_site(site.id))
            .await;

        let context = RequestContext::local(f.context.requester.clone(), site.clone());
        let updater = DraftFieldUpdater::new(&f.store, &f.backends, &context);
        let inputs = DraftFieldInputs::default()
            .with(DraftField::TargetPeople, "carol alice")
            .with(DraftField::TargetGroups, "core");

        let applied = updater.apply_fields(&mut f.draft, &inputs).await;

        assert_eq!(
            applied.invalid.get(&DraftField::TargetPeople),
            Some(&vec!["alice".to_owned()])
        );
        assert_eq!(f.draft.target_groups.len(), 1);
        assert_eq!(f.draft.target_groups[0].local_site_id, Some(site.id));
    }
}
