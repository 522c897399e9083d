//! Local sites and their members.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{Account, LocalSite, LocalSiteMember, NewLocalSite};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for local site database operations.
pub trait LocalSiteRepository {
    /// Creates a new local site.
    fn create_local_site(
        &mut self,
        new_local_site: NewLocalSite,
    ) -> impl Future<Output = PgResult<LocalSite>> + Send;

    /// Finds a local site by its URL name.
    fn find_local_site_by_name(
        &mut self,
        name: &str,
    ) -> impl Future<Output = PgResult<Option<LocalSite>>> + Send;

    /// Adds an account to a local site. Adding a member twice is a no-op.
    fn add_local_site_member(
        &mut self,
        member: LocalSiteMember,
    ) -> impl Future<Output = PgResult<()>> + Send;

    /// Returns true if the account is a member of the local site.
    fn is_local_site_member(
        &mut self,
        local_site_id: Uuid,
        account_id: Uuid,
    ) -> impl Future<Output = PgResult<bool>> + Send;

    /// Finds a member of the local site by exact username.
    fn find_local_site_member_by_username(
        &mut self,
        local_site_id: Uuid,
        username: &str,
    ) -> impl Future<Output = PgResult<Option<Account>>> + Send;
}

impl LocalSiteRepository for PgConnection {
    async fn create_local_site(&mut self, new_local_site: NewLocalSite) -> PgResult<LocalSite> {
        use schema::local_sites;

        diesel::insert_into(local_sites::table)
            .values(&new_local_site)
            .returning(LocalSite::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_local_site_by_name(&mut self, name: &str) -> PgResult<Option<LocalSite>> {
        use schema::local_sites::{self, dsl};

        local_sites::table
            .filter(dsl::name.eq(name))
            .select(LocalSite::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn add_local_site_member(&mut self, member: LocalSiteMember) -> PgResult<()> {
        use schema::local_site_members;

        diesel::insert_into(local_site_members::table)
            .values(&member)
            .on_conflict_do_nothing()
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(())
    }

    async fn is_local_site_member(&mut self, local_site_id: Uuid, account_id: Uuid) -> PgResult<bool> {
        use schema::local_site_members::{self, dsl};

        let member = local_site_members::table
            .filter(dsl::local_site_id.eq(local_site_id))
            .filter(dsl::account_id.eq(account_id))
            .select(LocalSiteMember::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(member.is_some())
    }

    async fn find_local_site_member_by_username(
        &mut self,
        local_site_id: Uuid,
        username: &str,
    ) -> PgResult<Option<Account>> {
        use schema::{accounts, local_site_members};

        accounts::table
            .inner_join(local_site_members::table)
            .filter(local_site_members::local_site_id.eq(local_site_id))
            .filter(accounts::username.eq(username))
            .select(Account::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }
}
