//! Repository traits implemented for [`PgConnection`].
//!
//! Each trait groups the queries of one table family. Reads that may find
//! nothing return `Option`; writes return the affected row.
//!
//! [`PgConnection`]: crate::PgConnection

pub mod account;
pub mod change_description;
pub mod local_site;
pub mod review_group;
pub mod review_request;
pub mod review_request_draft;

pub use account::AccountRepository;
pub use change_description::ChangeDescriptionRepository;
pub use local_site::LocalSiteRepository;
pub use review_group::ReviewGroupRepository;
pub use review_request::ReviewRequestRepository;
pub use review_request_draft::ReviewRequestDraftRepository;

/// Escapes `%`, `_` and `\` so `value` matches literally in a `LIKE` pattern.
pub(crate) fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(escape_like("core"), "core");
        assert_eq!(escape_like("qa_team 100%"), r"qa\_team 100\%");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
    }
}
