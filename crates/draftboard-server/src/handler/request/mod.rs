//! Request types for HTTP handlers.

mod drafts;
mod paths;

pub use drafts::*;
pub use paths::*;
