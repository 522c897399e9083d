use std::sync::Arc;

use draftboard_core::DraftService;
use draftboard_postgres::PgClient;

use crate::service::{AuthKeys, Result, ServiceConfig};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    // External services:
    /// Absent when the draft service runs on another store.
    pub postgres: Option<PgClient>,

    // Internal services:
    pub drafts: DraftService,
    pub auth_keys: AuthKeys,
}

impl ServiceState {
    /// Creates a state around an already assembled draft service.
    pub fn new(drafts: DraftService, auth_keys: AuthKeys) -> Self {
        Self {
            postgres: None,
            drafts,
            auth_keys,
        }
    }

    /// Initializes application state from configuration.
    ///
    /// Connects to Postgres, applies pending migrations and loads the
    /// token verification keys.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let auth_keys = config.load_auth_keys()?;
        let postgres = config.connect_postgres().await?;

        let drafts = DraftService::from_store(Arc::new(postgres.clone()))
            .with_backends(config.auth_backends(&postgres));

        let service_state = Self {
            postgres: Some(postgres),
            drafts,
            auth_keys,
        };

        Ok(service_state)
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

// External services:
impl_di!(postgres: Option<PgClient>);

// Internal services:
impl_di!(drafts: DraftService);
impl_di!(auth_keys: AuthKeys);
