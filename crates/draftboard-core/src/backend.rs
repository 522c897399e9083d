//! Auth backend chain used to look up users unknown to the local store.

use std::fmt;
use std::sync::Arc;

use crate::field::Resolution;
use crate::types::Account;
use crate::{Result, TRACING_TARGET_BACKEND};

/// A source of user accounts, such as a directory service.
///
/// Backends may create the local account record the first time a username
/// is seen.
#[async_trait::async_trait]
pub trait AuthBackend: Send + Sync {
    /// Returns a short name used in logs.
    fn name(&self) -> &str;

    /// Returns the account for `username`, creating it if the backend knows
    /// the user. `Ok(None)` means the backend does not know the user.
    async fn get_or_create_user(&self, username: &str) -> Result<Option<Account>>;
}

/// An ordered list of [`AuthBackend`]s consulted one after another.
#[derive(Clone, Default)]
pub struct AuthBackendChain {
    backends: Vec<Arc<dyn AuthBackend>>,
}

impl AuthBackendChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a backend to the end of the chain.
    pub fn with_backend(mut self, backend: impl AuthBackend + 'static) -> Self {
        self.backends.push(Arc::new(backend));
        self
    }

    /// Returns the number of backends.
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Returns true if the chain has no backends.
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    /// Asks each backend in order for `username`.
    ///
    /// The first account found wins. A failing backend is logged and
    /// skipped; its error is reported only if no later backend finds the
    /// user.
    pub async fn resolve(&self, username: &str) -> Resolution<Account> {
        let mut last_error = None;

        for backend in &self.backends {
            match backend.get_or_create_user(username).await {
                Ok(Some(account)) => {
                    tracing::debug!(
                        target: TRACING_TARGET_BACKEND,
                        backend = backend.name(),
                        username = %username,
                        "user resolved by auth backend"
                    );
                    return Resolution::Found(account);
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(
                        target: TRACING_TARGET_BACKEND,
                        backend = backend.name(),
                        username = %username,
                        error = %error,
                        "auth backend lookup failed"
                    );
                    last_error = Some(error);
                }
            }
        }

        match last_error {
            Some(error) => Resolution::LookupError(error),
            None => Resolution::NotFound,
        }
    }
}

impl fmt::Debug for AuthBackendChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.backends.iter().map(|b| b.name()).collect();
        f.debug_struct("AuthBackendChain")
            .field("backends", &names)
            .finish()
    }
}
