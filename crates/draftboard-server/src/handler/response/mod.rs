//! Response types for HTTP handlers.

mod drafts;
mod errors;
mod monitors;

pub use drafts::*;
pub use errors::*;
pub use monitors::*;
