//! An [`AuthBackend`] that provisions local accounts on first reference.

use std::sync::LazyLock;

use draftboard_core::types::Account;
use draftboard_core::{AuthBackend, Result};
use regex::Regex;

use crate::model::NewAccount;
use crate::query::AccountRepository;
use crate::{PgClient, TRACING_TARGET_CLIENT};

static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]{1,150}$").expect("username pattern compiles"));

/// Creates an account for every well-formed username it is asked about.
///
/// Intended for deployments without an external directory, where people
/// become reviewers before they first sign in.
#[derive(Debug, Clone)]
pub struct ProvisioningBackend {
    client: PgClient,
}

impl ProvisioningBackend {
    /// Creates a backend storing accounts through `client`.
    pub fn new(client: PgClient) -> Self {
        Self { client }
    }

    /// Returns true if `username` may be provisioned.
    pub fn accepts(username: &str) -> bool {
        USERNAME.is_match(username)
    }
}

#[async_trait::async_trait]
impl AuthBackend for ProvisioningBackend {
    fn name(&self) -> &str {
        "provisioning"
    }

    async fn get_or_create_user(&self, username: &str) -> Result<Option<Account>> {
        if !Self::accepts(username) {
            return Ok(None);
        }

        let mut conn = self.client.get_connection().await?;
        let account = conn
            .get_or_create_account(NewAccount {
                username: username.to_owned(),
                display_name: String::new(),
                is_admin: false,
            })
            .await?;

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            account_id = %account.id,
            username = %account.username,
            "account provisioned"
        );

        Ok(Some(account.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_usernames() {
        assert!(ProvisioningBackend::accepts("alice"));
        assert!(ProvisioningBackend::accepts("bob.smith@example.com"));
        assert!(!ProvisioningBackend::accepts(""));
        assert!(!ProvisioningBackend::accepts("two words"));
        assert!(!ProvisioningBackend::accepts("semi;colon"));
    }
}
