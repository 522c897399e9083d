//! Review request draft handlers.
//!
//! Every route exists twice: once for global review requests and once
//! under `/s/{localSiteName}` for review requests of a local site, where
//! `reviewRequestId` is the per-site identifier. Both variants share the
//! generic handlers below through [`DraftPath`].

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use draftboard_core::types::{Account, RequestContext, SiteScope};
use draftboard_core::{DraftService, UpdateOptions, UpdateOutcome};

use crate::extract::{AuthState, Json, Path, ValidateJson};
use crate::handler::request::{DraftPath, DraftPathParams, SiteDraftPathParams, UpdateDraft};
use crate::handler::response::{
    Draft, DraftEnvelope, ErrorResponse, ReviewRequestLink, invalid_fields,
};
use crate::handler::{Error, Result};
use crate::service::ServiceState;

/// Tracing target for draft operations.
const TRACING_TARGET: &str = "draftboard_server::handler::drafts";

/// Returns the draft of a review request.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %account.id,
        review_request_id = path_params.review_request_id(),
    )
)]
async fn get_draft<P: DraftPath>(
    State(drafts): State<DraftService>,
    AuthState(account): AuthState,
    Path(path_params): Path<P>,
) -> Result<(StatusCode, Json<DraftEnvelope>)> {
    tracing::debug!(target: TRACING_TARGET, "Reading draft");

    let display_id = path_params.review_request_id();
    let context = request_context(&drafts, account, &path_params).await?;

    let draft = drafts.get(&context, display_id).await?;
    let link = review_request_link(&drafts, &context.site, display_id).await?;

    Ok((StatusCode::OK, Json(Draft::from_draft(&draft, link).into())))
}

fn get_draft_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get draft")
        .description("Returns the pending draft of a review request.")
        .response::<200, Json<DraftEnvelope>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Creates the draft of a review request, or updates the existing one.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %account.id,
        review_request_id = path_params.review_request_id(),
    )
)]
async fn create_draft<P: DraftPath>(
    State(drafts): State<DraftService>,
    AuthState(account): AuthState,
    Path(path_params): Path<P>,
    request: Option<ValidateJson<UpdateDraft>>,
) -> Result<(StatusCode, Json<DraftEnvelope>)> {
    tracing::debug!(target: TRACING_TARGET, "Creating draft");

    let ValidateJson(request) = request.unwrap_or_default();
    let display_id = path_params.review_request_id();
    let context = request_context(&drafts, account, &path_params).await?;

    let response = apply_update(&drafts, &context, display_id, request).await?;

    tracing::info!(
        target: TRACING_TARGET,
        draft_id = response.draft.id,
        "Draft created",
    );

    Ok((StatusCode::CREATED, Json(response)))
}

fn create_draft_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Create draft")
        .description(
            "Creates the draft of a review request, or reuses the existing one, \
             and applies the submitted fields. Setting `public` publishes the \
             draft once every field was accepted.",
        )
        .response::<201, Json<DraftEnvelope>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Applies field changes to the draft of a review request.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %account.id,
        review_request_id = path_params.review_request_id(),
    )
)]
async fn update_draft<P: DraftPath>(
    State(drafts): State<DraftService>,
    AuthState(account): AuthState,
    Path(path_params): Path<P>,
    request: Option<ValidateJson<UpdateDraft>>,
) -> Result<(StatusCode, Json<DraftEnvelope>)> {
    tracing::debug!(target: TRACING_TARGET, "Updating draft");

    let ValidateJson(request) = request.unwrap_or_default();
    let display_id = path_params.review_request_id();
    let context = request_context(&drafts, account, &path_params).await?;

    let response = apply_update(&drafts, &context, display_id, request).await?;

    tracing::info!(target: TRACING_TARGET, "Draft updated");

    Ok((StatusCode::OK, Json(response)))
}

fn update_draft_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Update draft")
        .description(
            "Applies the submitted fields to the draft of a review request. \
             Nothing is saved when a field is rejected; the response then lists \
             the rejected input per field together with the unsaved draft.",
        )
        .response::<200, Json<DraftEnvelope>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Discards the draft of a review request.
#[tracing::instrument(
    skip_all,
    fields(
        account_id = %account.id,
        review_request_id = path_params.review_request_id(),
    )
)]
async fn delete_draft<P: DraftPath>(
    State(drafts): State<DraftService>,
    AuthState(account): AuthState,
    Path(path_params): Path<P>,
) -> Result<StatusCode> {
    tracing::debug!(target: TRACING_TARGET, "Deleting draft");

    let display_id = path_params.review_request_id();
    let context = request_context(&drafts, account, &path_params).await?;

    drafts.delete(&context, display_id).await?;

    tracing::info!(target: TRACING_TARGET, "Draft deleted");

    Ok(StatusCode::NO_CONTENT)
}

fn delete_draft_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Delete draft")
        .description("Discards the draft of a review request.")
        .response_with::<204, (), _>(|res| res.description("Draft deleted."))
        .response::<401, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Resolves the site addressed by the path into a request context.
async fn request_context<P: DraftPath>(
    drafts: &DraftService,
    requester: Account,
    path_params: &P,
) -> Result<RequestContext> {
    let site = drafts.resolve_site(path_params.local_site_name()).await?;
    Ok(RequestContext { requester, site })
}

/// Runs an update and converts its outcome into a response body.
async fn apply_update(
    drafts: &DraftService,
    context: &RequestContext,
    display_id: i64,
    request: UpdateDraft,
) -> Result<DraftEnvelope> {
    let options = UpdateOptions {
        publish: request.publish(),
        ..UpdateOptions::default()
    };

    let inputs = request.into_inputs();
    let outcome = drafts.update(context, display_id, &inputs, options).await?;
    let link = review_request_link(drafts, &context.site, display_id).await?;

    match outcome {
        UpdateOutcome::Invalid { fields, draft } => {
            tracing::debug!(
                target: TRACING_TARGET,
                invalid_fields = fields.len(),
                "Draft update rejected",
            );
            Err(Error::invalid_fields(
                invalid_fields(fields),
                Draft::from_draft(&draft, link),
            ))
        }
        UpdateOutcome::Published(draft) => {
            tracing::info!(target: TRACING_TARGET, "Draft published");
            Ok(Draft::from_draft(&draft, link).into())
        }
        UpdateOutcome::Saved(draft) => Ok(Draft::from_draft(&draft, link).into()),
    }
}

/// Returns the current identity and summary of the addressed review request.
async fn review_request_link(
    drafts: &DraftService,
    site: &SiteScope,
    display_id: i64,
) -> Result<ReviewRequestLink> {
    let reference = drafts
        .entities()
        .find_review_request_ref(site, display_id)
        .await?;

    Ok(reference
        .as_ref()
        .map(ReviewRequestLink::from)
        .unwrap_or(ReviewRequestLink {
            id: display_id,
            summary: String::new(),
        }))
}

/// Returns a [`Router`] with all draft routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/api/review-requests/{reviewRequestId}/draft",
            get_with(get_draft::<DraftPathParams>, get_draft_docs)
                .post_with(create_draft::<DraftPathParams>, create_draft_docs)
                .put_with(update_draft::<DraftPathParams>, update_draft_docs)
                .delete_with(delete_draft::<DraftPathParams>, delete_draft_docs),
        )
        .api_route(
            "/api/s/{localSiteName}/review-requests/{reviewRequestId}/draft",
            get_with(get_draft::<SiteDraftPathParams>, get_draft_docs)
                .post_with(create_draft::<SiteDraftPathParams>, create_draft_docs)
                .put_with(update_draft::<SiteDraftPathParams>, update_draft_docs)
                .delete_with(delete_draft::<SiteDraftPathParams>, delete_draft_docs),
        )
        .with_path_items(|item| item.tag("Drafts"))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use draftboard_core::Permission;
    use draftboard_core::field::CHANGE_DESCRIPTION_ON_NEW_REQUEST;
    use draftboard_core::mock::{MemoryStore, Operation};
    use draftboard_core::types::{Group, LocalSite, ReviewRequest};
    use serde_json::{Value, json};

    use super::*;
    use crate::handler::test::{bearer, create_test_server_with_state, test_state};

    const DRAFT_URL: &str = "/api/review-requests/1/draft";

    struct Fixture {
        store: Arc<MemoryStore>,
        owner: Account,
        state: ServiceState,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let owner = store.insert_account(Account::new("owner")).await;
        store
            .insert_review_request(ReviewRequest::new(1, owner.id, "Add retries"))
            .await;
        let state = test_state(store.clone());

        Fixture {
            store,
            owner,
            state,
        }
    }

    #[tokio::test]
    async fn get_without_draft_is_not_found() -> anyhow::Result<()> {
        let Fixture { owner, state, .. } = fixture().await;
        let token = bearer(&state, owner.id);
        let server = create_test_server_with_state(routes(), state).await?;

        let response = server.get(DRAFT_URL).authorization_bearer(token).await;
        response.assert_status(StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn post_creates_draft() -> anyhow::Result<()> {
        let Fixture {
            store,
            owner,
            state,
        } = fixture().await;
        let token = bearer(&state, owner.id);
        let server = create_test_server_with_state(routes(), state).await?;

        let response = server
            .post(DRAFT_URL)
            .authorization_bearer(&token)
            .json(&json!({ "summary": "Add retries with backoff" }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let body = response.json::<Value>();
        assert_eq!(body["draft"]["summary"], "Add retries with backoff");
        assert_eq!(body["draft"]["public"], false);
        assert_eq!(body["draft"]["review_request"]["id"], 1);
        assert!(body["draft"]["id"].is_i64());
        assert!(store.draft(1).await.is_some());

        let response = server.get(DRAFT_URL).authorization_bearer(&token).await;
        response.assert_status(StatusCode::OK);
        let body = response.json::<Value>();
        assert_eq!(body["draft"]["summary"], "Add retries with backoff");

        Ok(())
    }

    #[tokio::test]
    async fn put_applies_fields() -> anyhow::Result<()> {
        let Fixture {
            store,
            owner,
            state,
        } = fixture().await;
        store.insert_group(Group::new("core", "Core Team")).await;
        store.insert_account(Account::new("alice")).await;
        let token = bearer(&state, owner.id);
        let server = create_test_server_with_state(routes(), state).await?;

        let response = server
            .put(DRAFT_URL)
            .authorization_bearer(token)
            .json(&json!({
                "bugs_closed": "#12, 34 ,, #56",
                "target_groups": "core",
                "target_people": "alice",
                "testing_done": "Ran the suite",
            }))
            .await;
        response.assert_status(StatusCode::OK);

        let body = response.json::<Value>();
        assert_eq!(body["draft"]["bugs_closed"], json!(["12", "34", "56"]));
        assert_eq!(body["draft"]["target_groups"][0]["name"], "core");
        assert_eq!(body["draft"]["target_people"][0]["username"], "alice");
        assert_eq!(body["draft"]["testing_done"], "Ran the suite");

        let draft = store.draft(1).await.expect("draft saved");
        assert_eq!(draft.bugs_closed, "12,34,56");

        Ok(())
    }

    #[tokio::test]
    async fn put_without_body_saves_empty_draft() -> anyhow::Result<()> {
        let Fixture {
            store,
            owner,
            state,
        } = fixture().await;
        let token = bearer(&state, owner.id);
        let server = create_test_server_with_state(routes(), state).await?;

        let response = server.put(DRAFT_URL).authorization_bearer(token).await;
        response.assert_status(StatusCode::OK);

        let draft = store.draft(1).await.expect("draft saved");
        assert_eq!(draft.summary, "Add retries");

        Ok(())
    }

    #[tokio::test]
    async fn invalid_fields_are_reported_and_nothing_saved() -> anyhow::Result<()> {
        let Fixture {
            store,
            owner,
            state,
        } = fixture().await;
        let token = bearer(&state, owner.id);
        let server = create_test_server_with_state(routes(), state).await?;

        let response = server
            .put(DRAFT_URL)
            .authorization_bearer(token)
            .json(&json!({
                "summary": "Valid summary",
                "target_people": "nobody",
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body = response.json::<Value>();
        assert_eq!(body["name"], "invalid_form_data");
        assert_eq!(body["fields"]["target_people"], json!(["nobody"]));
        assert_eq!(body["draft"]["summary"], "Valid summary");
        assert!(store.draft(1).await.is_none());
        assert!(store.operations().await.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn overlong_summary_is_rejected_before_field_processing() -> anyhow::Result<()> {
        let Fixture {
            store,
            owner,
            state,
        } = fixture().await;
        let token = bearer(&state, owner.id);
        let server = create_test_server_with_state(routes(), state).await?;

        let response = server
            .put(DRAFT_URL)
            .authorization_bearer(token)
            .json(&json!({
                "summary": "s".repeat(301),
                "target_people": "nobody",
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body = response.json::<Value>();
        assert_eq!(body["name"], "bad_request");
        assert!(body["message"].as_str().unwrap_or_default().contains("summary"));
        assert!(body.get("fields").is_none_or(Value::is_null));
        assert!(store.operations().await.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn change_description_requires_published_request() -> anyhow::Result<()> {
        let Fixture {
            store,
            owner,
            state,
        } = fixture().await;
        let token = bearer(&state, owner.id);
        let server = create_test_server_with_state(routes(), state).await?;

        let response = server
            .put(DRAFT_URL)
            .authorization_bearer(token)
            .json(&json!({ "changedescription": "Rebased" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body = response.json::<Value>();
        assert_eq!(
            body["fields"]["changedescription"],
            json!([CHANGE_DESCRIPTION_ON_NEW_REQUEST])
        );
        assert!(store.draft(1).await.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn public_flag_publishes_draft() -> anyhow::Result<()> {
        let Fixture {
            store,
            owner,
            state,
        } = fixture().await;
        let token = bearer(&state, owner.id);
        let server = create_test_server_with_state(routes(), state).await?;

        let response = server
            .put(DRAFT_URL)
            .authorization_bearer(&token)
            .json(&json!({ "summary": "Add retries with backoff", "public": true }))
            .await;
        response.assert_status(StatusCode::OK);

        let review_request = store.review_request(1).await.expect("review request");
        assert!(review_request.public);
        assert_eq!(review_request.summary, "Add retries with backoff");
        assert!(store.draft(1).await.is_none());

        let published = store
            .operations()
            .await
            .into_iter()
            .filter(|operation| matches!(operation, Operation::PublishReviewRequest { .. }))
            .count();
        assert_eq!(published, 1);

        let response = server.get(DRAFT_URL).authorization_bearer(&token).await;
        response.assert_status(StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn other_accounts_are_forbidden() -> anyhow::Result<()> {
        let Fixture { store, state, .. } = fixture().await;
        let other = store.insert_account(Account::new("other")).await;
        let token = bearer(&state, other.id);
        let server = create_test_server_with_state(routes(), state).await?;

        let response = server
            .post(DRAFT_URL)
            .authorization_bearer(&token)
            .json(&json!({ "summary": "Hijacked" }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        let response = server.delete(DRAFT_URL).authorization_bearer(&token).await;
        response.assert_status(StatusCode::NOT_FOUND);

        assert!(store.draft(1).await.is_none());
        assert!(store.operations().await.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn editors_may_modify_drafts_of_others() -> anyhow::Result<()> {
        let Fixture { store, state, .. } = fixture().await;
        let editor = store.insert_account(Account::new("editor")).await;
        store
            .grant_permission(editor.id, Permission::EditReviewRequest, None)
            .await;
        let token = bearer(&state, editor.id);
        let server = create_test_server_with_state(routes(), state).await?;

        let response = server
            .put(DRAFT_URL)
            .authorization_bearer(token)
            .json(&json!({ "description": "Edited by an editor" }))
            .await;
        response.assert_status(StatusCode::OK);

        Ok(())
    }

    #[tokio::test]
    async fn delete_discards_draft() -> anyhow::Result<()> {
        let Fixture {
            store,
            owner,
            state,
        } = fixture().await;
        let token = bearer(&state, owner.id);
        let server = create_test_server_with_state(routes(), state).await?;

        server
            .post(DRAFT_URL)
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::CREATED);

        let response = server.delete(DRAFT_URL).authorization_bearer(&token).await;
        response.assert_status(StatusCode::NO_CONTENT);
        assert!(store.draft(1).await.is_none());

        let response = server.delete(DRAFT_URL).authorization_bearer(&token).await;
        response.assert_status(StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn missing_review_request_is_not_found() -> anyhow::Result<()> {
        let Fixture { owner, state, .. } = fixture().await;
        let token = bearer(&state, owner.id);
        let server = create_test_server_with_state(routes(), state).await?;

        let response = server
            .put("/api/review-requests/42/draft")
            .authorization_bearer(&token)
            .json(&json!({ "summary": "Nope" }))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = server
            .get("/api/review-requests/abc/draft")
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn requests_without_token_are_unauthorized() -> anyhow::Result<()> {
        let Fixture { state, .. } = fixture().await;
        let server = create_test_server_with_state(routes(), state).await?;

        let response = server.get(DRAFT_URL).await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let body = response.json::<Value>();
        assert_eq!(body["name"], "missing_auth_token");

        Ok(())
    }

    #[tokio::test]
    async fn local_site_routes_use_per_site_ids() -> anyhow::Result<()> {
        let Fixture {
            store,
            owner,
            state,
        } = fixture().await;
        let site = store.insert_local_site(LocalSite::new("acme")).await;
        store.add_site_member(site.id, owner.id).await;
        store
            .insert_review_request(
                ReviewRequest::new(2, owner.id, "Local change").with_local_site(site.id, 1),
            )
            .await;
        let token = bearer(&state, owner.id);
        let server = create_test_server_with_state(routes(), state).await?;

        let response = server
            .post("/api/s/acme/review-requests/1/draft")
            .authorization_bearer(&token)
            .json(&json!({ "testing_done": "Manual" }))
            .await;
        response.assert_status(StatusCode::CREATED);

        let body = response.json::<Value>();
        assert_eq!(body["draft"]["review_request"]["id"], 1);
        assert_eq!(body["draft"]["review_request"]["summary"], "Local change");
        assert!(store.draft(2).await.is_some());
        assert!(store.draft(1).await.is_none());

        let response = server
            .get("/api/s/initech/review-requests/1/draft")
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        Ok(())
    }

    #[tokio::test]
    async fn private_site_rejects_outsiders() -> anyhow::Result<()> {
        let Fixture { store, state, .. } = fixture().await;
        let site = store.insert_local_site(LocalSite::new("acme")).await;
        let outsider = store.insert_account(Account::new("outsider")).await;
        let owner = store.insert_account(Account::new("member")).await;
        store.add_site_member(site.id, owner.id).await;
        store
            .insert_review_request(
                ReviewRequest::new(2, owner.id, "Local change").with_local_site(site.id, 1),
            )
            .await;
        let token = bearer(&state, outsider.id);
        let server = create_test_server_with_state(routes(), state).await?;

        let response = server
            .put("/api/s/acme/review-requests/1/draft")
            .authorization_bearer(token)
            .json(&json!({ "summary": "Sneaky" }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        Ok(())
    }
}
