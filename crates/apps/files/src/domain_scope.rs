//! Resolves which filesystem root the current user may browse.

use panel_host::{DomainScope, DomainStructure, UserDomain};
use tracing::{info, warn};

use crate::client::ScopedClient;
use crate::error::FileManagerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Account role of the panel user.
pub enum UserRole {
    /// May browse the unscoped system root and any domain.
    Administrator,
    /// Restricted to their own domains.
    Member,
}

#[derive(Debug, Clone)]
/// Domain discovery and selection gate.
///
/// No listing may be issued until [`DomainScopeResolver::can_list`] holds: members need a
/// non-empty domain, administrators may browse the unscoped root.
pub struct DomainScopeResolver {
    role: UserRole,
    domains: Vec<UserDomain>,
    scope: Option<DomainScope>,
    structure: Option<DomainStructure>,
}

impl DomainScopeResolver {
    /// Creates an unresolved gate for `role`.
    pub fn new(role: UserRole) -> Self {
        Self {
            role,
            domains: Vec::new(),
            scope: None,
            structure: None,
        }
    }

    /// Returns the user's role.
    pub fn role(&self) -> UserRole {
        self.role
    }

    /// Returns the domains loaded by [`DomainScopeResolver::load`].
    pub fn domains(&self) -> &[UserDomain] {
        &self.domains
    }

    /// Returns the resolved scope.
    pub fn scope(&self) -> Option<&DomainScope> {
        self.scope.as_ref()
    }

    /// Returns the directory layout of the selected domain when it was fetched.
    pub fn structure(&self) -> Option<&DomainStructure> {
        self.structure.as_ref()
    }

    /// Returns `true` when a listing request may be issued.
    pub fn can_list(&self) -> bool {
        match &self.scope {
            Some(scope) => self.role == UserRole::Administrator || !scope.is_unscoped(),
            None => false,
        }
    }

    /// Loads the user's domains and applies the role default.
    ///
    /// Administrators land on the unscoped root; members are assigned their first domain.
    ///
    /// # Errors
    ///
    /// Propagates request failures, and returns [`FileManagerError::Validation`] when a member
    /// has no domain at all.
    pub async fn load(&mut self, client: &ScopedClient) -> Result<DomainScope, FileManagerError> {
        self.domains = client.user_domains().await?;
        match self.role {
            UserRole::Administrator => self.select(client, "").await,
            UserRole::Member => {
                let Some(first) = self.domains.first().map(|d| d.domain.clone()) else {
                    self.scope = None;
                    return Err(FileManagerError::validation(
                        "no domains are available for this account",
                    ));
                };
                self.select(client, &first).await
            }
        }
    }

    /// Switches to `domain` (`""` selects the unscoped root).
    ///
    /// The domain's directory structure is fetched to fill the owner and root label; a failure
    /// there is logged and the domain-list values are kept.
    ///
    /// # Errors
    ///
    /// Returns [`FileManagerError::Validation`] when a member asks for the unscoped root or the
    /// domain is not in the user's list.
    pub async fn select(
        &mut self,
        client: &ScopedClient,
        domain: &str,
    ) -> Result<DomainScope, FileManagerError> {
        if domain.is_empty() {
            if self.role != UserRole::Administrator {
                return Err(FileManagerError::validation(
                    "only administrators may browse the system root",
                ));
            }
            self.structure = None;
            let scope = DomainScope::unscoped();
            self.scope = Some(scope.clone());
            info!("browsing unscoped system root");
            return Ok(scope);
        }

        let Some(known) = self.domains.iter().find(|d| d.domain == domain).cloned() else {
            return Err(FileManagerError::validation(format!(
                "domain `{domain}` is not available"
            )));
        };

        let mut scope = DomainScope {
            domain: known.domain.clone(),
            linux_username: known.linux_username.clone(),
            root_label: known.domain.clone(),
        };
        match client.domain_structure(domain).await {
            Ok(structure) => {
                if !structure.linux_username.is_empty() {
                    scope.linux_username = structure.linux_username.clone();
                }
                self.structure = Some(structure);
            }
            Err(err) => {
                warn!(domain, error = %err, "domain structure unavailable");
                self.structure = None;
            }
        }
        if !scope.linux_username.is_empty() {
            scope.root_label = format!("{}@{}", scope.linux_username, scope.domain);
        }
        info!(domain, "domain scope selected");
        self.scope = Some(scope.clone());
        Ok(scope)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use futures::executor::block_on;
    use panel_host::{HostApiError, MemoryHostingFs, NeverTimer};

    use super::*;

    fn fixture() -> (MemoryHostingFs, ScopedClient) {
        let fs = MemoryHostingFs::default();
        fs.add_domain("example.com", "exmpl")
            .add_domain("second.org", "scnd")
            .insert_dir("example.com", "public_html");
        let client = ScopedClient::new(Rc::new(fs.clone()), Rc::new(NeverTimer), 30_000);
        (fs, client)
    }

    #[test]
    fn member_is_assigned_first_domain_and_blocked_from_root() {
        let (_fs, client) = fixture();
        let mut resolver = DomainScopeResolver::new(UserRole::Member);
        assert!(!resolver.can_list());

        let scope = block_on(resolver.load(&client)).expect("load");
        assert_eq!(scope.domain, "example.com");
        assert_eq!(scope.root_label, "exmpl@example.com");
        assert!(resolver.can_list());
        assert!(resolver.structure().is_some());

        let err = block_on(resolver.select(&client, "")).expect_err("root blocked");
        assert!(matches!(err, FileManagerError::Validation(_)));
        assert_eq!(resolver.scope().map(|s| s.domain.as_str()), Some("example.com"));
    }

    #[test]
    fn administrator_defaults_to_unscoped_root_and_may_pick_any_domain() {
        let (_fs, client) = fixture();
        let mut resolver = DomainScopeResolver::new(UserRole::Administrator);
        let scope = block_on(resolver.load(&client)).expect("load");
        assert!(scope.is_unscoped());
        assert!(resolver.can_list());

        let scope = block_on(resolver.select(&client, "second.org")).expect("select");
        assert_eq!(scope.linux_username, "scnd");
        let err = block_on(resolver.select(&client, "missing.net")).expect_err("unknown");
        assert!(matches!(err, FileManagerError::Validation(_)));
    }

    #[test]
    fn member_without_domains_cannot_list() {
        let fs = MemoryHostingFs::default();
        let client = ScopedClient::new(Rc::new(fs), Rc::new(NeverTimer), 30_000);
        let mut resolver = DomainScopeResolver::new(UserRole::Member);
        assert!(block_on(resolver.load(&client)).is_err());
        assert!(!resolver.can_list());
    }

    #[test]
    fn structure_failure_keeps_domain_list_values() {
        let (fs, client) = fixture();
        let mut resolver = DomainScopeResolver::new(UserRole::Member);
        block_on(resolver.load(&client)).expect("load");
        fs.fail_operation("get_domain_structure", HostApiError::Server("boom".to_string()));
        let scope = block_on(resolver.select(&client, "second.org")).expect("select");
        assert_eq!(scope.linux_username, "scnd");
        assert!(resolver.structure().is_none());
    }
}
