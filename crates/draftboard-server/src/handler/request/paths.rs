//! Path parameter types for HTTP handlers.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Path parameters that address the draft of one review request.
///
/// Draft handlers are generic over this trait so the global and the
/// local site routes share one implementation.
pub trait DraftPath: DeserializeOwned + JsonSchema + Send + 'static {
    /// Returns the URL name of the addressed local site, if any.
    fn local_site_name(&self) -> Option<&str>;

    /// Returns the review request identifier as seen by users of the site.
    fn review_request_id(&self) -> i64;
}

/// Path parameters for drafts of global review requests.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftPathParams {
    /// Global identifier of the review request.
    pub review_request_id: i64,
}

impl DraftPath for DraftPathParams {
    fn local_site_name(&self) -> Option<&str> {
        None
    }

    fn review_request_id(&self) -> i64 {
        self.review_request_id
    }
}

/// Path parameters for drafts of review requests in a local site.
#[must_use]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SiteDraftPathParams {
    /// URL name of the local site.
    pub local_site_name: String,
    /// Per-site identifier of the review request.
    pub review_request_id: i64,
}

impl DraftPath for SiteDraftPathParams {
    fn local_site_name(&self) -> Option<&str> {
        Some(&self.local_site_name)
    }

    fn review_request_id(&self) -> i64 {
        self.review_request_id
    }
}
