use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Account {
    /// Unique account identifier.
    pub id: Uuid,
    /// Login name, unique across the installation.
    pub username: String,
    /// Human readable name.
    pub display_name: String,
    /// Administrators pass every permission check.
    pub is_admin: bool,
}

impl Account {
    /// Creates a non-administrator account with a fresh identifier.
    pub fn new(username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            id: Uuid::now_v7(),
            display_name: username.clone(),
            username,
            is_admin: false,
        }
    }

    /// Sets the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Marks the account as an administrator.
    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }
}

/// A review group that can be targeted by review requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct Group {
    /// Unique group identifier.
    pub id: Uuid,
    /// Local site owning the group, `None` for global groups.
    pub local_site_id: Option<Uuid>,
    /// Short name, unique per site.
    pub name: String,
    /// Human readable name.
    pub display_name: String,
}

impl Group {
    /// Creates a global group with a fresh identifier.
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            local_site_id: None,
            name: name.into(),
            display_name: display_name.into(),
        }
    }

    /// Moves the group into a local site.
    pub fn with_local_site(mut self, local_site_id: Uuid) -> Self {
        self.local_site_id = Some(local_site_id);
        self
    }
}
