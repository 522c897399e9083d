use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::{account_permissions, accounts};

/// An account row.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Account {
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    pub display_name: String,
    /// Bypasses every permission check.
    pub is_admin: bool,
    pub created_at: Timestamp,
}

/// Data for creating a new account.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAccount {
    pub username: String,
    pub display_name: String,
    pub is_admin: bool,
}

impl From<Account> for draftboard_core::types::Account {
    fn from(row: Account) -> Self {
        Self {
            id: row.id,
            username: row.username,
            display_name: row.display_name,
            is_admin: row.is_admin,
        }
    }
}

/// A permission granted to an account, site-wide when `local_site_id` is null.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = account_permissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AccountPermission {
    pub id: Uuid,
    pub account_id: Uuid,
    /// Permission name, such as `can_edit_review_request`.
    pub permission: String,
    pub local_site_id: Option<Uuid>,
    pub created_at: Timestamp,
}

/// Data for granting a permission.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = account_permissions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewAccountPermission {
    pub account_id: Uuid,
    pub permission: String,
    pub local_site_id: Option<Uuid>,
}
