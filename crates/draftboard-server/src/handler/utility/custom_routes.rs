//! Extension points for the API router.

use aide::axum::ApiRouter;

use crate::service::ServiceState;

/// Transforms a router, e.g. to add a layer to a group of routes.
pub type RouterMapFn = fn(ApiRouter<ServiceState>) -> ApiRouter<ServiceState>;

/// Routes and router transforms merged into the API router.
///
/// Private routes sit next to the draft routes and extract [`AuthState`]
/// themselves; public routes sit next to the health check.
///
/// ```rust
/// use draftboard_server::handler::CustomRoutes;
///
/// let custom = CustomRoutes::new();
/// assert!(custom.is_empty());
/// ```
///
/// [`AuthState`]: crate::extract::AuthState
#[derive(Default, Clone)]
pub struct CustomRoutes {
    /// Additional routes for authenticated clients.
    pub private_routes: Option<ApiRouter<ServiceState>>,
    /// Additional routes open to everyone.
    pub public_routes: Option<ApiRouter<ServiceState>>,
    /// Applied to all private routes, built-in and custom.
    pub map_private: Option<RouterMapFn>,
    /// Applied to all public routes, built-in and custom.
    pub map_public: Option<RouterMapFn>,
}

impl CustomRoutes {
    /// Creates an empty `CustomRoutes`.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds private routes, merging with previously added ones.
    pub fn add_private_routes(mut self, routes: ApiRouter<ServiceState>) -> Self {
        self.private_routes = Some(match self.private_routes {
            Some(existing) => existing.merge(routes),
            None => routes,
        });
        self
    }

    /// Adds public routes, merging with previously added ones.
    pub fn add_public_routes(mut self, routes: ApiRouter<ServiceState>) -> Self {
        self.public_routes = Some(match self.public_routes {
            Some(existing) => existing.merge(routes),
            None => routes,
        });
        self
    }

    /// Sets the transform applied to private routes.
    pub fn with_map_private(mut self, f: RouterMapFn) -> Self {
        self.map_private = Some(f);
        self
    }

    /// Sets the transform applied to public routes.
    pub fn with_map_public(mut self, f: RouterMapFn) -> Self {
        self.map_public = Some(f);
        self
    }

    /// Returns true if no custom routes are configured.
    pub fn is_empty(&self) -> bool {
        self.private_routes.is_none() && self.public_routes.is_none()
    }

    /// Merges the custom private routes into `routes` and applies the transform.
    pub(crate) fn merge_private(
        &mut self,
        routes: ApiRouter<ServiceState>,
    ) -> ApiRouter<ServiceState> {
        let routes = match self.private_routes.take() {
            Some(custom) => routes.merge(custom),
            None => routes,
        };

        match self.map_private {
            Some(f) => f(routes),
            None => routes,
        }
    }

    /// Merges the custom public routes into `routes` and applies the transform.
    pub(crate) fn merge_public(
        &mut self,
        routes: ApiRouter<ServiceState>,
    ) -> ApiRouter<ServiceState> {
        let routes = match self.public_routes.take() {
            Some(custom) => routes.merge(custom),
            None => routes,
        };

        match self.map_public {
            Some(f) => f(routes),
            None => routes,
        }
    }
}
