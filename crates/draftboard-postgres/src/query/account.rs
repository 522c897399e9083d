//! Accounts and the permissions granted to them.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{Account, AccountPermission, NewAccount, NewAccountPermission};
use crate::{PgConnection, PgError, PgResult, schema};

/// Repository for account database operations.
pub trait AccountRepository {
    /// Creates a new account.
    fn create_account(
        &mut self,
        new_account: NewAccount,
    ) -> impl Future<Output = PgResult<Account>> + Send;

    /// Creates an account unless the username is taken, then returns the
    /// account holding that username.
    fn get_or_create_account(
        &mut self,
        new_account: NewAccount,
    ) -> impl Future<Output = PgResult<Account>> + Send;

    /// Finds an account by its unique identifier.
    fn find_account_by_id(
        &mut self,
        account_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Account>>> + Send;

    /// Finds an account by exact username.
    fn find_account_by_username(
        &mut self,
        username: &str,
    ) -> impl Future<Output = PgResult<Option<Account>>> + Send;

    /// Grants a permission site-wide or for one local site. Granting twice is a no-op.
    fn grant_permission(
        &mut self,
        new_permission: NewAccountPermission,
    ) -> impl Future<Output = PgResult<()>> + Send;

    /// Returns true if the account holds `permission` site-wide, or for
    /// `local_site_id` when given.
    fn has_permission(
        &mut self,
        account_id: Uuid,
        permission: &str,
        local_site_id: Option<Uuid>,
    ) -> impl Future<Output = PgResult<bool>> + Send;
}

impl AccountRepository for PgConnection {
    async fn create_account(&mut self, mut new_account: NewAccount) -> PgResult<Account> {
        use schema::accounts;

        new_account.username = new_account.username.trim().to_owned();
        new_account.display_name = new_account.display_name.trim().to_owned();

        diesel::insert_into(accounts::table)
            .values(&new_account)
            .returning(Account::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)
    }

    async fn get_or_create_account(&mut self, new_account: NewAccount) -> PgResult<Account> {
        use schema::accounts::{self, dsl};

        diesel::insert_into(accounts::table)
            .values(&new_account)
            .on_conflict(dsl::username)
            .do_nothing()
            .execute(self)
            .await
            .map_err(PgError::from)?;

        accounts::table
            .filter(dsl::username.eq(&new_account.username))
            .select(Account::as_select())
            .first(self)
            .await
            .map_err(PgError::from)
    }

    async fn find_account_by_id(&mut self, account_id: Uuid) -> PgResult<Option<Account>> {
        use schema::accounts::{self, dsl};

        accounts::table
            .filter(dsl::id.eq(account_id))
            .select(Account::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_account_by_username(&mut self, username: &str) -> PgResult<Option<Account>> {
        use schema::accounts::{self, dsl};

        accounts::table
            .filter(dsl::username.eq(username))
            .select(Account::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn grant_permission(&mut self, new_permission: NewAccountPermission) -> PgResult<()> {
        use schema::account_permissions;

        diesel::insert_into(account_permissions::table)
            .values(&new_permission)
            .on_conflict_do_nothing()
            .execute(self)
            .await
            .map_err(PgError::from)?;

        Ok(())
    }

    async fn has_permission(
        &mut self,
        account_id: Uuid,
        permission: &str,
        local_site_id: Option<Uuid>,
    ) -> PgResult<bool> {
        use schema::account_permissions::{self, dsl};

        // `= NULL` never matches, so a missing site only finds site-wide grants.
        let grant = account_permissions::table
            .filter(dsl::account_id.eq(account_id))
            .filter(dsl::permission.eq(permission))
            .filter(dsl::local_site_id.is_null().or(dsl::local_site_id.eq(local_site_id)))
            .select(AccountPermission::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(grant.is_some())
    }
}
