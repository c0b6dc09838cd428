//! Per-owner site registries
//!
//! [`StorageRegistries`] is created once by the composition root and passed
//! by reference to whatever initializes sites. It hands out one
//! [`StorageRegistry`] per owner identity.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, warn};

use super::document::Owner;
use super::errors::{StorageError, StorageResult};
use super::site::Site;

/// Lookup table from owner identity to that owner's registry
#[derive(Debug, Default)]
pub struct StorageRegistries {
    entries: Mutex<HashMap<String, Arc<StorageRegistry>>>,
}

impl StorageRegistries {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry for `owner`, created on first access.
    ///
    /// Owners are compared by name; the first `Owner` seen for a name is
    /// the one the registry keeps.
    pub fn get(&self, owner: &Owner) -> Arc<StorageRegistry> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .entry(owner.name().to_string())
            .or_insert_with(|| {
                debug!(owner = %owner.name(), "creating storage registry");
                Arc::new(StorageRegistry::new(owner.clone()))
            })
            .clone()
    }

    /// Names of every owner with a registry
    pub fn owners(&self) -> Vec<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut owners: Vec<String> = entries.keys().cloned().collect();
        owners.sort();
        owners
    }
}

/// The sites of one owner
#[derive(Debug)]
pub struct StorageRegistry {
    owner: Owner,
    sites: RwLock<Vec<Arc<Site>>>,
}

impl StorageRegistry {
    fn new(owner: Owner) -> Self {
        Self {
            owner,
            sites: RwLock::new(Vec::new()),
        }
    }

    /// Owner this registry belongs to
    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    /// Snapshot of registered sites, in registration order
    pub fn sites(&self) -> Vec<Arc<Site>> {
        self.sites
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Look up a site by name
    pub fn site(&self, name: &str) -> Option<Arc<Site>> {
        self.sites
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|s| s.name() == name)
            .cloned()
    }

    /// Register an initialized site
    pub fn add_site(&self, site: Arc<Site>) -> StorageResult<()> {
        let mut sites = self.sites.write().unwrap_or_else(PoisonError::into_inner);
        if sites.iter().any(|s| s.name() == site.name()) {
            return Err(StorageError::DuplicateName(format!(
                "site '{}' for owner '{}'",
                site.name(),
                self.owner.name()
            )));
        }
        sites.push(site);
        Ok(())
    }

    /// Terminate every site, continuing past failures.
    ///
    /// Returns the first error encountered. Sites stay registered.
    pub async fn terminate_all(&self) -> StorageResult<()> {
        let mut first_error = None;
        for site in self.sites() {
            if let Err(e) = site.terminate().await {
                warn!(site = %site.name(), error = %e, "failed to terminate site");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_same_owner_same_registry() {
        let registries = StorageRegistries::new();
        let owner = Owner::new("lobby", "/srv/lobby");

        let a = registries.get(&owner);
        let b = registries.get(&owner.clone());
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registries.owners(), vec!["lobby".to_string()]);
    }

    #[test]
    fn test_distinct_owners() {
        let registries = StorageRegistries::new();
        let a = registries.get(&Owner::new("lobby", "/srv/lobby"));
        let b = registries.get(&Owner::new("survival", "/srv/survival"));

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(a.owner().name(), "lobby");
        assert_eq!(b.owner().name(), "survival");
        assert_eq!(registries.owners().len(), 2);
    }

    #[tokio::test]
    async fn test_sites_are_disjoint_and_terminated() {
        let dir = TempDir::new().unwrap();
        let registries = StorageRegistries::new();
        let lobby = Owner::new("lobby", dir.path().join("lobby"));
        let survival = Owner::new("survival", dir.path().join("survival"));

        let lobby_site = Site::file(lobby.clone(), "local").unwrap();
        lobby_site.initialize(&registries).await.unwrap();
        let survival_site = Site::file(survival.clone(), "local").unwrap();
        survival_site.initialize(&registries).await.unwrap();

        let lobby_registry = registries.get(&lobby);
        let survival_registry = registries.get(&survival);
        assert_eq!(lobby_registry.sites().len(), 1);
        assert_eq!(survival_registry.sites().len(), 1);
        assert!(!Arc::ptr_eq(
            &lobby_registry.sites()[0],
            &survival_registry.sites()[0]
        ));

        lobby_registry.terminate_all().await.unwrap();
        assert!(!lobby_site.is_initialized());
        assert!(survival_site.is_initialized());
        assert!(lobby_registry.site("local").is_some());
    }
}
