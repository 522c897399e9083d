use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::{local_site_members, local_sites};

/// A local site row.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = local_sites)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LocalSite {
    pub id: Uuid,
    /// Name used in `/s/{name}/` URLs.
    pub name: String,
    /// Public sites are accessible to every account.
    pub public: bool,
    pub created_at: Timestamp,
}

/// Data for creating a new local site.
#[derive(Debug, Default, Clone, Insertable)]
#[diesel(table_name = local_sites)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewLocalSite {
    pub name: String,
    pub public: bool,
}

/// Membership of an account in a local site.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable)]
#[diesel(table_name = local_site_members)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LocalSiteMember {
    pub local_site_id: Uuid,
    pub account_id: Uuid,
}

impl From<LocalSite> for draftboard_core::types::LocalSite {
    fn from(row: LocalSite) -> Self {
        Self {
            id: row.id,
            name: row.name,
            public: row.public,
        }
    }
}
