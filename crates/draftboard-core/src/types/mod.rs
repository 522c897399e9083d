//! Domain types shared by the store, the field engine and the HTTP layer.

mod account;
mod draft;
mod review_request;
mod site;

pub use account::{Account, Group};
pub use draft::{ChangeDescription, Draft};
pub use review_request::{ReviewRequest, ReviewRequestRef};
pub use site::{LocalSite, RequestContext, SiteScope};
