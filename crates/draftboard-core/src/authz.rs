//! Permission gates evaluated before any draft is read or written.

use crate::types::{RequestContext, ReviewRequest};
use crate::{AuthzProvider, Error, Permission, Result, TRACING_TARGET_SERVICE};

/// Verifies the requester may use the local site the request addressed.
///
/// Public sites are open to every account, private ones to members.
pub async fn check_site_access(authz: &dyn AuthzProvider, context: &RequestContext) -> Result<()> {
    let Some(site) = context.site.local_site() else {
        return Ok(());
    };

    let requester = &context.requester;
    if site.public || requester.is_admin || authz.is_site_member(requester, site.id).await? {
        return Ok(());
    }

    tracing::warn!(
        target: TRACING_TARGET_SERVICE,
        account_id = %requester.id,
        local_site = %site.name,
        "local site access denied"
    );

    Err(Error::permission_denied()
        .with_message(format!("You don't have access to the site \"{}\"", site.name)))
}

/// Verifies the requester may read and modify the draft of `review_request`.
///
/// The submitter always may; other accounts need the edit permission,
/// site-wide or for the review request's local site.
pub async fn check_draft_access(
    authz: &dyn AuthzProvider,
    context: &RequestContext,
    review_request: &ReviewRequest,
) -> Result<()> {
    let requester = &context.requester;
    if requester.is_admin || requester.id == review_request.submitter_id {
        return Ok(());
    }

    let permitted = authz
        .has_permission(
            requester,
            Permission::EditReviewRequest,
            review_request.local_site_id,
        )
        .await?;

    if permitted {
        return Ok(());
    }

    tracing::warn!(
        target: TRACING_TARGET_SERVICE,
        account_id = %requester.id,
        review_request_id = review_request.id,
        "draft access denied"
    );

    Err(Error::permission_denied()
        .with_message("You don't have permission to modify this review request"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::mock::MemoryStore;
    use crate::types::{Account, LocalSite};

    #[tokio::test]
    async fn submitter_and_editors_pass() {
        let store = MemoryStore::new();
        let owner = store.insert_account(Account::new("owner")).await;
        let editor = store.insert_account(Account::new("editor")).await;
        let other = store.insert_account(Account::new("other")).await;
        store
            .grant_permission(editor.id, Permission::EditReviewRequest, None)
            .await;
        let review_request = ReviewRequest::new(1, owner.id, "Summary");

        let as_owner = RequestContext::global(owner);
        let as_editor = RequestContext::global(editor);
        let as_other = RequestContext::global(other);

        assert!(check_draft_access(&store, &as_owner, &review_request).await.is_ok());
        assert!(check_draft_access(&store, &as_editor, &review_request).await.is_ok());

        let denied = check_draft_access(&store, &as_other, &review_request)
            .await
            .unwrap_err();
        assert_eq!(denied.kind(), ErrorKind::PermissionDenied);
    }

    #[tokio::test]
    async fn site_scoped_grant_only_applies_to_that_site() {
        let store = MemoryStore::new();
        let acme = store.insert_local_site(LocalSite::new("acme")).await;
        let initech = store.insert_local_site(LocalSite::new("initech")).await;
        let owner = store.insert_account(Account::new("owner")).await;
        let editor = store.insert_account(Account::new("editor")).await;
        store
            .grant_permission(editor.id, Permission::EditReviewRequest, Some(acme.id))
            .await;

        let in_acme = ReviewRequest::new(1, owner.id, "Summary").with_local_site(acme.id, 1);
        let in_initech = ReviewRequest::new(2, owner.id, "Summary").with_local_site(initech.id, 1);
        let context = RequestContext::global(editor);

        assert!(check_draft_access(&store, &context, &in_acme).await.is_ok());
        assert!(check_draft_access(&store, &context, &in_initech).await.is_err());
    }

    #[tokio::test]
    async fn private_site_requires_membership() {
        let store = MemoryStore::new();
        let site = store.insert_local_site(LocalSite::new("acme")).await;
        let member = store.insert_account(Account::new("member")).await;
        let outsider = store.insert_account(Account::new("outsider")).await;
        let admin = store
            .insert_account(Account::new("admin").with_admin(true))
            .await;
        store.add_site_member(site.id, member.id).await;

        let as_member = RequestContext::local(member, site.clone());
        let as_admin = RequestContext::local(admin, site.clone());
        let as_outsider = RequestContext::local(outsider.clone(), site);
        let outsider_globally = RequestContext::global(outsider);

        assert!(check_site_access(&store, &as_member).await.is_ok());
        assert!(check_site_access(&store, &as_admin).await.is_ok());
        assert!(check_site_access(&store, &as_outsider).await.is_err());
        assert!(check_site_access(&store, &outsider_globally).await.is_ok());
    }

    #[tokio::test]
    async fn public_site_is_open() {
        let store = MemoryStore::new();
        let site = store
            .insert_local_site(LocalSite::new("opensource").with_public(true))
            .await;
        let visitor = store.insert_account(Account::new("visitor")).await;

        let context = RequestContext::local(visitor, site);
        assert!(check_site_access(&store, &context).await.is_ok());
    }
}
