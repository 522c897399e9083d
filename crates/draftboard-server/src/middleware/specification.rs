//! OpenAPI document and Scalar UI.
//!
//! The document is generated from the [`ApiRouter`] routes and their docs
//! transforms, then served as JSON next to an interactive Scalar reference.
//!
//! ```rust
//! use aide::axum::ApiRouter;
//! use axum::Router;
//! use draftboard_server::middleware::{OpenApiConfig, RouterOpenApiExt};
//!
//! let app: Router<()> = ApiRouter::new().with_open_api(OpenApiConfig::default());
//! ```
//!
//! [`ApiRouter`]: aide::axum::ApiRouter

use aide::axum::ApiRouter;
use aide::openapi::{Info, OpenApi};
use aide::scalar::Scalar;
use axum::routing::{Router, get};
use axum::{Extension, Json};
#[cfg(any(test, feature = "config"))]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Default path of the OpenAPI JSON document.
const OPENAPI_JSON_PATH: &str = "/api/openapi.json";

/// Default path of the Scalar UI.
const OPENAPI_SCALAR_PATH: &str = "/api/scalar";

/// Paths the OpenAPI document and UI are served at.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "config"), derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct OpenApiConfig {
    /// Path which exposes the OpenAPI JSON document.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "OPENAPI_JSON_PATH", default_value = OPENAPI_JSON_PATH)
    )]
    pub open_api_json: String,

    /// Path which exposes the Scalar API reference UI.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "OPENAPI_SCALAR_PATH", default_value = OPENAPI_SCALAR_PATH)
    )]
    pub scalar_ui: String,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            open_api_json: OPENAPI_JSON_PATH.to_owned(),
            scalar_ui: OPENAPI_SCALAR_PATH.to_owned(),
        }
    }
}

/// Extension trait for [`ApiRouter`] to serve its OpenAPI document.
///
/// [`ApiRouter`]: aide::axum::ApiRouter
pub trait RouterOpenApiExt<S> {
    /// Finishes the router, serving the document with the default API info.
    fn with_open_api(self, config: OpenApiConfig) -> Router<S>;

    /// Finishes the router, serving the document with the given API info.
    fn with_open_api_info(self, config: OpenApiConfig, info: Info) -> Router<S>;
}

impl<S> RouterOpenApiExt<S> for ApiRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_open_api(self, config: OpenApiConfig) -> Router<S> {
        let info = Info {
            title: "Draftboard API".to_owned(),
            summary: Some("Review request drafts".to_owned()),
            description: Some(
                "Create, edit, publish and discard the pending draft of a review request."
                    .to_owned(),
            ),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            ..Info::default()
        };

        self.with_open_api_info(config, info)
    }

    fn with_open_api_info(self, config: OpenApiConfig, info: Info) -> Router<S> {
        async fn serve_openapi(Extension(api): Extension<OpenApi>) -> Json<OpenApi> {
            Json(api)
        }

        let mut api = OpenApi {
            info,
            ..OpenApi::default()
        };

        let scalar = Scalar::new(&config.open_api_json);
        let router = self
            .route(&config.scalar_ui, scalar.axum_route())
            .route(&config.open_api_json, get(serve_openapi));

        router.finish_api(&mut api).layer(Extension(api))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum_test::TestServer;
    use draftboard_core::mock::MemoryStore;
    use serde_json::Value;

    use super::*;
    use crate::handler::test::test_state;
    use crate::handler::{CustomRoutes, routes};

    #[tokio::test]
    async fn serves_document() -> anyhow::Result<()> {
        let app: Router = ApiRouter::new().with_open_api(OpenApiConfig::default());
        let server = TestServer::new(app)?;

        let response = server.get(OPENAPI_JSON_PATH).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["info"]["title"], "Draftboard API");

        Ok(())
    }

    #[tokio::test]
    async fn documents_draft_routes() -> anyhow::Result<()> {
        let state = test_state(Arc::new(MemoryStore::new()));
        let app: Router = routes(CustomRoutes::new())
            .with_open_api(OpenApiConfig::default())
            .with_state(state);
        let server = TestServer::new(app)?;

        let response = server.get(OPENAPI_JSON_PATH).await;
        response.assert_status_ok();

        let document = response.json::<Value>();
        let global = &document["paths"]["/api/review-requests/{reviewRequestId}/draft"];
        let local = &document["paths"]["/api/s/{localSiteName}/review-requests/{reviewRequestId}/draft"];
        for method in ["get", "post", "put", "delete"] {
            assert!(global[method].is_object(), "missing global {method}");
            assert!(local[method].is_object(), "missing local {method}");
        }
        assert!(global["put"]["responses"]["400"].is_object());
        assert!(document["paths"]["/api/health"]["get"].is_object());
        assert!(response.text().contains("ErrorResponse"));

        Ok(())
    }
}
