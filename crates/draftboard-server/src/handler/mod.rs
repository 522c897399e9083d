//! All `aide::axum::`[`ApiRouter`]s with related `axum::`[`Handler`]s.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use aide::axum::ApiRouter;
//! use axum::Router;
//! use axum::routing::get;
//! use draftboard_server::handler::{CustomRoutes, routes};
//! use draftboard_server::service::{ServiceConfig, ServiceState};
//!
//! async fn custom_handler() -> &'static str {
//!     "Hello from custom route!"
//! }
//!
//! # async fn example(config: ServiceConfig) -> anyhow::Result<()> {
//! let state = ServiceState::from_config(&config).await?;
//!
//! let custom_routes = CustomRoutes::new()
//!     .add_public_routes(ApiRouter::<ServiceState>::new().route("/custom", get(custom_handler)));
//!
//! let router: Router = routes(custom_routes).with_state(state).into();
//! # Ok(())
//! # }
//! ```
//!
//! [`Handler`]: axum::handler::Handler

mod drafts;
mod error;
mod monitors;
mod request;
mod response;
mod utility;

use aide::axum::ApiRouter;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::request::{DraftPath, DraftPathParams, SiteDraftPathParams, UpdateDraft};
pub use crate::handler::response::{
    DatabaseStatus, Draft, DraftEnvelope, ErrorResponse, GroupLink, InvalidFields, MonitorStatus,
    ReviewRequestLink, ServiceStatus, UserLink,
};
pub use crate::handler::utility::{CustomRoutes, RouterMapFn};
use crate::service::ServiceState;

#[inline]
async fn fallback() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns an [`ApiRouter`] with all routes requiring a bearer token.
fn private_routes() -> ApiRouter<ServiceState> {
    ApiRouter::new().merge(drafts::routes())
}

/// Returns an [`ApiRouter`] with all routes open to everyone.
fn public_routes() -> ApiRouter<ServiceState> {
    ApiRouter::new().merge(monitors::routes())
}

/// Returns an [`ApiRouter`] with all routes.
///
/// Authentication is enforced per handler by the [`AuthState`] extractor.
///
/// [`AuthState`]: crate::extract::AuthState
pub fn routes(mut routes: CustomRoutes) -> ApiRouter<ServiceState> {
    let private_router = routes.merge_private(private_routes());
    let public_router = routes.merge_public(public_routes());

    ApiRouter::new()
        .merge(private_router)
        .merge(public_router)
        .fallback(fallback)
}

#[cfg(test)]
pub(crate) mod test {
    use std::sync::Arc;

    use aide::axum::ApiRouter;
    use axum::Router;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use draftboard_core::DraftService;
    use draftboard_core::mock::MemoryStore;
    use jiff::SignedDuration;
    use uuid::Uuid;

    use crate::extract::AuthClaims;
    use crate::handler::{CustomRoutes, routes};
    use crate::service::{AuthConfig, AuthKeys, ServiceState};

    /// Signing secret used by handler tests.
    const TEST_AUTH_SECRET: &str = "draftboard-test-secret-that-is-long-enough";

    /// Returns a [`ServiceState`] backed by `store` and no database.
    pub fn test_state(store: Arc<MemoryStore>) -> ServiceState {
        let auth_keys = AuthKeys::from_config(&AuthConfig::new(TEST_AUTH_SECRET))
            .expect("test secret is valid");
        ServiceState::new(DraftService::from_store(store), auth_keys)
    }

    /// Returns a bearer token for `account_id` signed with the state's keys.
    pub fn bearer(state: &ServiceState, account_id: Uuid) -> String {
        let keys = &state.auth_keys;
        AuthClaims::new(keys, account_id, SignedDuration::from_hours(1))
            .encode(keys)
            .expect("claims encode")
    }

    /// Returns a new [`TestServer`] with the given router and state.
    pub async fn create_test_server_with_state(
        router: ApiRouter<ServiceState>,
        state: ServiceState,
    ) -> anyhow::Result<TestServer> {
        let app: Router = router.with_state(state).into();
        let server = TestServer::new(app)?;
        Ok(server)
    }

    /// Returns a new [`TestServer`] with every route and an empty store.
    pub async fn create_test_server() -> anyhow::Result<TestServer> {
        let state = test_state(Arc::new(MemoryStore::new()));
        let router = routes(CustomRoutes::new());
        create_test_server_with_state(router, state).await
    }

    #[tokio::test]
    async fn handlers() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        assert!(server.is_running());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() -> anyhow::Result<()> {
        let server = create_test_server().await?;

        let response = server.get("/api/unknown").await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<serde_json::Value>()["name"], "not_found");

        Ok(())
    }

    #[tokio::test]
    async fn custom_public_routes_are_merged() -> anyhow::Result<()> {
        async fn ping() -> &'static str {
            "pong"
        }

        let state = test_state(Arc::new(MemoryStore::new()));
        let custom = CustomRoutes::new()
            .add_public_routes(ApiRouter::new().route("/api/ping", axum::routing::get(ping)));
        let router = routes(custom);
        let server = create_test_server_with_state(router, state).await?;

        let response = server.get("/api/ping").await;
        response.assert_status_ok();
        response.assert_text("pong");

        Ok(())
    }
}
