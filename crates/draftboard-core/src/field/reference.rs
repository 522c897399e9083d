//! Resolution of reference tokens to groups, users and review requests.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Account, Group, ReviewRequestRef, SiteScope};
use crate::{AuthBackendChain, EntityStore, Error, Result, TRACING_TARGET_FIELDS};

static REFERENCE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[, ]+").expect("separator pattern compiles"));

/// Splits raw reference input on runs of commas and spaces.
///
/// Empty tokens are skipped.
pub fn split_references(raw: &str) -> impl Iterator<Item = &str> {
    REFERENCE_SEPARATOR
        .split(raw)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Outcome of resolving a single reference token.
#[derive(Debug)]
pub enum Resolution<T> {
    /// The token names an existing entity.
    Found(T),
    /// Nothing matches the token.
    NotFound,
    /// The lookup itself failed.
    LookupError(Error),
}

impl<T> Resolution<T> {
    /// Returns the resolved entity, if any.
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(entity) => Some(entity),
            Self::NotFound | Self::LookupError(_) => None,
        }
    }

    /// Returns true if the token resolved to an entity.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

impl<T> From<Result<Option<T>>> for Resolution<T> {
    fn from(result: Result<Option<T>>) -> Self {
        match result {
            Ok(Some(entity)) => Self::Found(entity),
            Ok(None) => Self::NotFound,
            Err(error) => Self::LookupError(error),
        }
    }
}

/// Looks up reference tokens within one site scope.
#[derive(Clone, Copy)]
pub struct ReferenceResolver<'a> {
    entities: &'a dyn EntityStore,
    backends: &'a AuthBackendChain,
    site: &'a SiteScope,
}

impl<'a> ReferenceResolver<'a> {
    /// Creates a resolver bound to `site`.
    pub fn new(
        entities: &'a dyn EntityStore,
        backends: &'a AuthBackendChain,
        site: &'a SiteScope,
    ) -> Self {
        Self {
            entities,
            backends,
            site,
        }
    }

    /// Resolves a group by case-insensitive name or display name.
    pub async fn group(&self, token: &str) -> Resolution<Group> {
        self.entities.find_group(self.site, token).await.into()
    }

    /// Resolves a user by username.
    ///
    /// Within a local site only its members are considered. In the global
    /// scope unknown usernames are offered to the auth backend chain, which
    /// may create the account.
    pub async fn user(&self, token: &str) -> Resolution<Account> {
        let username = token.trim();

        match self.entities.find_user(self.site, username).await {
            Ok(Some(account)) => Resolution::Found(account),
            Ok(None) if self.site.local_site().is_none() => self.backends.resolve(username).await,
            Ok(None) => Resolution::NotFound,
            Err(error) => Resolution::LookupError(error),
        }
    }

    /// Resolves a review request by the identifier users of the site see.
    pub async fn review_request(&self, token: &str) -> Resolution<ReviewRequestRef> {
        let Ok(display_id) = token.parse::<i64>() else {
            tracing::debug!(
                target: TRACING_TARGET_FIELDS,
                token = %token,
                "review request reference is not numeric"
            );
            return Resolution::LookupError(
                Error::invalid_input().with_message("review request ids are numeric"),
            );
        };

        self.entities
            .find_review_request_ref(self.site, display_id)
            .await
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_commas_and_spaces() {
        let tokens: Vec<_> = split_references("alice, bob,,carol  dave ,").collect();
        assert_eq!(tokens, vec!["alice", "bob", "carol", "dave"]);
    }

    #[test]
    fn blank_input_has_no_tokens() {
        assert_eq!(split_references("").count(), 0);
        assert_eq!(split_references(" ,, ").count(), 0);
    }

    #[test]
    fn resolution_from_store_result() {
        let found: Resolution<i32> = Ok(Some(1)).into();
        let missing: Resolution<i32> = Ok(None).into();
        let failed: Resolution<i32> = Err(Error::storage()).into();

        assert!(found.is_found());
        assert!(matches!(missing, Resolution::NotFound));
        assert!(matches!(failed, Resolution::LookupError(_)));
    }
}
