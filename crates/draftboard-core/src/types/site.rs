use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Account;

/// A tenant that partitions groups, users and review requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct LocalSite {
    /// Unique site identifier.
    pub id: Uuid,
    /// Name used in URLs.
    pub name: String,
    /// Public sites are accessible to every authenticated account.
    pub public: bool,
}

impl LocalSite {
    /// Creates a private site with a fresh identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            public: false,
        }
    }

    /// Sets whether the site is public.
    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }
}

/// The boundary lookups are restricted to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SiteScope {
    /// Entities that belong to no local site.
    #[default]
    Global,
    /// Entities of a single local site.
    Local(LocalSite),
}

impl SiteScope {
    /// Returns the local site, if scoped to one.
    pub fn local_site(&self) -> Option<&LocalSite> {
        match self {
            Self::Global => None,
            Self::Local(site) => Some(site),
        }
    }

    /// Returns the local site identifier, if scoped to one.
    pub fn local_site_id(&self) -> Option<Uuid> {
        self.local_site().map(|site| site.id)
    }

    /// Returns true if an entity owned by `local_site_id` is visible here.
    pub fn contains(&self, local_site_id: Option<Uuid>) -> bool {
        self.local_site_id() == local_site_id
    }
}

/// Who is asking, and within which site.
///
/// Passed explicitly into every draft operation.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The authenticated account performing the operation.
    pub requester: Account,
    /// The site the request was addressed to.
    pub site: SiteScope,
}

impl RequestContext {
    /// Creates a context in the global scope.
    pub fn global(requester: Account) -> Self {
        Self {
            requester,
            site: SiteScope::Global,
        }
    }

    /// Creates a context scoped to a local site.
    pub fn local(requester: Account, site: LocalSite) -> Self {
        Self {
            requester,
            site: SiteScope::Local(site),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_scope_only_contains_siteless_entities() {
        let site = LocalSite::new("acme");
        assert!(SiteScope::Global.contains(None));
        assert!(!SiteScope::Global.contains(Some(site.id)));
    }

    #[test]
    fn local_scope_only_contains_its_own_entities() {
        let site = LocalSite::new("acme");
        let other = LocalSite::new("initech");
        let scope = SiteScope::Local(site.clone());
        assert!(scope.contains(Some(site.id)));
        assert!(!scope.contains(Some(other.id)));
        assert!(!scope.contains(None));
    }
}
