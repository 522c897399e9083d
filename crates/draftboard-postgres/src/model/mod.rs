//! Diesel models for the draft tables.
//!
//! Row types convert into the `draftboard_core` domain types. Relations
//! (target groups, target people, dependencies) live in join tables and are
//! loaded separately by the store.

mod account;
mod change_description;
mod local_site;
mod relation;
mod review_group;
mod review_request;
mod review_request_draft;

pub use account::{Account, AccountPermission, NewAccount, NewAccountPermission};
pub use change_description::{
    ChangeDescription, NewChangeDescription, UpdateChangeDescription,
};
pub use local_site::{LocalSite, LocalSiteMember, NewLocalSite};
pub use relation::{
    NewDraftDependency, NewDraftTargetGroup, NewDraftTargetPerson, NewReviewRequestDependency,
    NewReviewRequestTargetGroup, NewReviewRequestTargetPerson,
};
pub use review_group::{NewReviewGroup, ReviewGroup};
pub use review_request::{
    NewReviewRequest, ReviewRequest, ReviewRequestSummary, UpdateReviewRequest,
};
pub use review_request_draft::{NewReviewRequestDraft, ReviewRequestDraft};
