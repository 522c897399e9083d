#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for field update operations.
pub const TRACING_TARGET_FIELDS: &str = "draftboard_core::field";

/// Tracing target for auth backend lookups.
pub const TRACING_TARGET_BACKEND: &str = "draftboard_core::backend";

/// Tracing target for draft service operations.
pub const TRACING_TARGET_SERVICE: &str = "draftboard_core::service";

/// Tracing target for publish notifications.
pub const TRACING_TARGET_PUBLISH: &str = "draftboard_core::publish";

mod authz;
mod backend;
mod error;
mod provider;
mod publish;
mod service;

pub mod field;
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;
pub mod types;

pub use authz::{check_draft_access, check_site_access};
pub use backend::{AuthBackend, AuthBackendChain};
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use provider::{
    AuthzProvider, DraftCommit, DraftStore, EntityStore, LogNotifier, Permission,
    PublishNotifier,
};
pub use publish::{FieldChange, PublishPlan};
pub use service::{DraftService, UpdateOptions, UpdateOutcome};
