//! The `draftboard_core` store traits implemented on [`PgClient`].

use async_trait::async_trait;
use diesel_async::scoped_futures::ScopedFutureExt;
use draftboard_core::types::{self, SiteScope};
use draftboard_core::{AuthzProvider, DraftCommit, DraftStore, EntityStore, Permission, Result};
use uuid::Uuid;

use crate::model::{
    self, NewChangeDescription, NewReviewRequestDraft, UpdateChangeDescription, UpdateReviewRequest,
};
use crate::query::{
    AccountRepository, ChangeDescriptionRepository, LocalSiteRepository, ReviewGroupRepository,
    ReviewRequestDraftRepository, ReviewRequestRepository,
};
use crate::{PgClient, PgConnection, PgError, PgResult, TRACING_TARGET_QUERY};

/// Identifiers of the three relations, in the order they are stored.
struct RelationIds {
    groups: Vec<Uuid>,
    people: Vec<Uuid>,
    dependencies: Vec<i64>,
}

impl RelationIds {
    fn new(
        groups: &[types::Group],
        people: &[types::Account],
        dependencies: &[types::ReviewRequestRef],
    ) -> Self {
        Self {
            groups: groups.iter().map(|group| group.id).collect(),
            people: people.iter().map(|account| account.id).collect(),
            dependencies: dependencies.iter().map(|reference| reference.id).collect(),
        }
    }
}

async fn hydrate_review_request(
    conn: &mut PgConnection,
    row: model::ReviewRequest,
) -> PgResult<types::ReviewRequest> {
    let groups = conn.list_review_request_target_groups(row.id).await?;
    let people = conn.list_review_request_target_people(row.id).await?;
    let dependencies = conn.list_review_request_dependencies(row.id).await?;
    let has_change_descriptions = conn.has_public_change_descriptions(row.id).await?;

    Ok(row.into_domain(
        has_change_descriptions,
        groups.into_iter().map(Into::into).collect(),
        people.into_iter().map(Into::into).collect(),
        dependencies.into_iter().map(Into::into).collect(),
    ))
}

async fn hydrate_draft(
    conn: &mut PgConnection,
    row: model::ReviewRequestDraft,
) -> PgResult<types::Draft> {
    let changedesc = match row.changedesc_id {
        Some(changedesc_id) => conn
            .find_change_description_by_id(changedesc_id)
            .await?
            .map(Into::into),
        None => None,
    };
    let groups = conn.list_draft_target_groups(row.id).await?;
    let people = conn.list_draft_target_people(row.id).await?;
    let dependencies = conn.list_draft_dependencies(row.id).await?;

    Ok(row.into_domain(
        changedesc,
        groups.into_iter().map(Into::into).collect(),
        people.into_iter().map(Into::into).collect(),
        dependencies.into_iter().map(Into::into).collect(),
    ))
}

#[async_trait]
impl EntityStore for PgClient {
    async fn find_account(&self, account_id: Uuid) -> Result<Option<types::Account>> {
        let mut conn = self.get_connection().await?;
        let account = conn.find_account_by_id(account_id).await?;
        Ok(account.map(Into::into))
    }

    async fn find_local_site(&self, name: &str) -> Result<Option<types::LocalSite>> {
        let mut conn = self.get_connection().await?;
        let site = conn.find_local_site_by_name(name).await?;
        Ok(site.map(Into::into))
    }

    async fn find_group(&self, site: &SiteScope, name: &str) -> Result<Option<types::Group>> {
        let mut conn = self.get_connection().await?;
        let group = conn
            .find_review_group_by_name(site.local_site_id(), name)
            .await?;
        Ok(group.map(Into::into))
    }

    async fn find_user(&self, site: &SiteScope, username: &str) -> Result<Option<types::Account>> {
        let mut conn = self.get_connection().await?;
        let account = match site.local_site_id() {
            Some(local_site_id) => {
                conn.find_local_site_member_by_username(local_site_id, username)
                    .await?
            }
            None => conn.find_account_by_username(username).await?,
        };
        Ok(account.map(Into::into))
    }

    async fn find_review_request_ref(
        &self,
        site: &SiteScope,
        display_id: i64,
    ) -> Result<Option<types::ReviewRequestRef>> {
        let mut conn = self.get_connection().await?;
        let row = conn
            .find_review_request_by_display_id(site.local_site_id(), display_id)
            .await?;

        Ok(row.map(|row| types::ReviewRequestRef {
            id: row.id,
            display_id: row.local_id.unwrap_or(row.id),
            summary: row.summary,
        }))
    }
}

#[async_trait]
impl AuthzProvider for PgClient {
    async fn has_permission(
        &self,
        account: &types::Account,
        permission: Permission,
        local_site_id: Option<Uuid>,
    ) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let granted = conn
            .has_permission(account.id, permission.as_ref(), local_site_id)
            .await?;
        Ok(granted)
    }

    async fn is_site_member(&self, account: &types::Account, local_site_id: Uuid) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let member = conn.is_local_site_member(local_site_id, account.id).await?;
        Ok(member)
    }
}

#[async_trait]
impl DraftStore for PgClient {
    async fn load_review_request(
        &self,
        site: &SiteScope,
        display_id: i64,
    ) -> Result<Option<types::ReviewRequest>> {
        let mut conn = self.get_connection().await?;
        let Some(row) = conn
            .find_review_request_by_display_id(site.local_site_id(), display_id)
            .await?
        else {
            return Ok(None);
        };

        let review_request = hydrate_review_request(&mut conn, row).await?;
        Ok(Some(review_request))
    }

    async fn find_draft(
        &self,
        review_request: &types::ReviewRequest,
    ) -> Result<Option<types::Draft>> {
        let mut conn = self.get_connection().await?;
        let Some(row) = conn.find_draft_by_review_request(review_request.id).await? else {
            return Ok(None);
        };

        let draft = hydrate_draft(&mut conn, row).await?;
        Ok(Some(draft))
    }

    #[tracing::instrument(
        skip_all,
        target = TRACING_TARGET_QUERY,
        fields(review_request_id = commit.draft.review_request_id, publish = commit.publish.is_some())
    )]
    async fn commit(&self, commit: DraftCommit) -> Result<types::Draft> {
        let saves_change_description = commit.saves_change_description();
        let DraftCommit {
            mut draft, publish, ..
        } = commit;

        let mut conn = self.get_connection().await?;
        let draft = conn
            .transaction(|conn| {
                async move {
                    if saves_change_description
                        && let Some(changedesc) = draft.changedesc.as_mut()
                    {
                        let saved = match changedesc.id {
                            Some(changedesc_id) => {
                                conn.update_change_description(
                                    changedesc_id,
                                    UpdateChangeDescription::from(&*changedesc),
                                )
                                .await?
                            }
                            None => {
                                conn.create_change_description(NewChangeDescription::new(
                                    draft.review_request_id,
                                    changedesc,
                                ))
                                .await?
                            }
                        };
                        changedesc.id = Some(saved.id);
                    }

                    let row = conn
                        .upsert_draft(NewReviewRequestDraft::from(&draft))
                        .await?;
                    draft.id = Some(row.id);

                    let relations =
                        RelationIds::new(&draft.target_groups, &draft.target_people, &draft.depends_on);
                    conn.set_draft_relations(
                        row.id,
                        &relations.groups,
                        &relations.people,
                        &relations.dependencies,
                    )
                    .await?;

                    if let Some(plan) = publish {
                        let review_request = &plan.review_request;
                        conn.update_review_request(
                            review_request.id,
                            UpdateReviewRequest::from(review_request),
                        )
                        .await?;

                        let relations = RelationIds::new(
                            &review_request.target_groups,
                            &review_request.target_people,
                            &review_request.depends_on,
                        );
                        conn.set_review_request_relations(
                            review_request.id,
                            &relations.groups,
                            &relations.people,
                            &relations.dependencies,
                        )
                        .await?;

                        if let Some(changedesc) = &plan.change_description {
                            let saved_id = draft.changedesc.as_ref().and_then(|saved| saved.id);
                            match changedesc.id.or(saved_id) {
                                Some(changedesc_id) => {
                                    conn.update_change_description(
                                        changedesc_id,
                                        UpdateChangeDescription::from(changedesc),
                                    )
                                    .await?;
                                }
                                None => {
                                    conn.create_change_description(NewChangeDescription::new(
                                        review_request.id,
                                        changedesc,
                                    ))
                                    .await?;
                                }
                            }
                        }

                        conn.delete_draft_by_review_request(review_request.id)
                            .await?;
                    }

                    Ok::<_, PgError>(draft)
                }
                .scope_boxed()
            })
            .await?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            draft_id = draft.id,
            "draft committed"
        );

        Ok(draft)
    }

    #[tracing::instrument(skip(self), target = TRACING_TARGET_QUERY)]
    async fn delete_draft(&self, review_request_id: i64) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let deleted = conn
            .transaction(|conn| {
                async move {
                    let Some(row) = conn.delete_draft_by_review_request(review_request_id).await?
                    else {
                        return Ok::<_, PgError>(false);
                    };

                    if let Some(changedesc_id) = row.changedesc_id {
                        conn.delete_unpublished_change_description(changedesc_id)
                            .await?;
                    }

                    Ok(true)
                }
                .scope_boxed()
            })
            .await?;

        Ok(deleted)
    }
}
