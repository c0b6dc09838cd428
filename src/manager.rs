//! Configured storage for one owner process
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docsite::config::ConfigurationLoader;
//! use docsite::manager::StorageManager;
//! use docsite::storage::StorageRegistries;
//! use std::sync::Arc;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let loader = ConfigurationLoader::new(None)?;
//!     let registries = Arc::new(StorageRegistries::new());
//!     let manager = StorageManager::open(&loader.config, registries).await?;
//!
//!     if let Some(players) = manager.point("local", "players") {
//!         println!("{} players", players.count_all().await?);
//!     }
//!     manager.shutdown().await?;
//!     Ok(())
//! }
//! ```

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::config::Configuration;
use crate::storage::{
    Owner, Site, StorageBackend, StorageRegistries, StorageRegistry, StorageResult,
};

/// Sites and points of one owner, built from configuration
pub struct StorageManager {
    registries: Arc<StorageRegistries>,
    registry: Arc<StorageRegistry>,
}

impl StorageManager {
    /// Create, initialize and populate every configured site.
    ///
    /// Sites are opened in declaration order; the first failure aborts and
    /// leaves already-initialized sites registered.
    pub async fn open(config: &Configuration, registries: Arc<StorageRegistries>) -> Result<Self> {
        let owner = config.owner.to_owner()?;

        for site_config in &config.sites {
            let parameters = site_config.expanded_parameters()?;
            let site = Site::with_options(
                owner.clone(),
                &site_config.name,
                site_config.kind,
                parameters,
                site_config.file.clone(),
            )?;
            site.initialize(&registries)
                .await
                .with_context(|| format!("Failed to initialize site '{}'", site_config.name))?;

            for point in &site_config.points {
                site.register_point(point).await.with_context(|| {
                    format!(
                        "Failed to register point '{}' in site '{}'",
                        point, site_config.name
                    )
                })?;
            }
            info!(site = %site.name(), points = site_config.points.len(), "site opened");
        }

        let registry = registries.get(&owner);
        Ok(Self {
            registries,
            registry,
        })
    }

    /// Owner identity
    pub fn owner(&self) -> &Owner {
        self.registry.owner()
    }

    /// The shared registry table
    pub fn registries(&self) -> &Arc<StorageRegistries> {
        &self.registries
    }

    /// This owner's registry
    pub fn registry(&self) -> &Arc<StorageRegistry> {
        &self.registry
    }

    /// Site by name
    pub fn site(&self, name: &str) -> Option<Arc<Site>> {
        self.registry.site(name)
    }

    /// Point by site and point name
    pub fn point(&self, site: &str, point: &str) -> Option<Arc<dyn StorageBackend>> {
        self.site(site)?.point(point)
    }

    /// Point by name, registering it on first use
    pub async fn point_or_register(
        &self,
        site: &str,
        point: &str,
    ) -> Result<Arc<dyn StorageBackend>> {
        let site = self
            .site(site)
            .with_context(|| format!("Unknown site '{}'", site))?;
        if let Some(existing) = site.point(point) {
            return Ok(existing);
        }
        Ok(site.register_point(point).await?)
    }

    /// Terminate every site of this owner
    pub async fn shutdown(&self) -> StorageResult<()> {
        self.registry.terminate_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigurationLoader;
    use serde_json::json;
    use tempfile::TempDir;

    fn config_for(dir: &TempDir) -> Configuration {
        let toml = format!(
            r#"
            [owner]
            name = "lobby"
            data_dir = "{}"

            [[sites]]
            name = "local"
            kind = "file"
            points = ["players", "guilds"]
            "#,
            dir.path().display()
        );
        ConfigurationLoader::from_toml_str(&toml).unwrap().config
    }

    #[tokio::test]
    async fn test_open_registers_configured_points() {
        let dir = TempDir::new().unwrap();
        let registries = Arc::new(StorageRegistries::new());
        let manager = StorageManager::open(&config_for(&dir), registries.clone())
            .await
            .unwrap();

        assert_eq!(manager.owner().name(), "lobby");
        assert!(Arc::ptr_eq(
            manager.registry(),
            &registries.get(&Owner::new("lobby", dir.path()))
        ));

        let site = manager.site("local").unwrap();
        assert_eq!(site.points().len(), 2);
        assert!(dir.path().join("data/local/players").is_dir());
        assert!(dir.path().join("data/local/guilds").is_dir());

        let players = manager.point("local", "players").unwrap();
        let alice = json!({"name": "Alice"}).as_object().unwrap().clone();
        players.save(&alice, "alice").await.unwrap();
        assert_eq!(players.get("alice").await.unwrap(), Some(alice));

        assert!(manager.point("local", "missing").is_none());
        assert!(manager.point("remote", "players").is_none());

        manager.shutdown().await.unwrap();
        assert!(!site.is_initialized());
    }

    #[tokio::test]
    async fn test_point_or_register() {
        let dir = TempDir::new().unwrap();
        let manager = StorageManager::open(&config_for(&dir), Arc::new(StorageRegistries::new()))
            .await
            .unwrap();

        let first = manager.point_or_register("local", "bans").await.unwrap();
        let second = manager.point_or_register("local", "bans").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(manager.point_or_register("nowhere", "bans").await.is_err());
    }

    #[tokio::test]
    async fn test_open_twice_conflicts() {
        let dir = TempDir::new().unwrap();
        let registries = Arc::new(StorageRegistries::new());
        let config = config_for(&dir);

        StorageManager::open(&config, registries.clone()).await.unwrap();
        let err = StorageManager::open(&config, registries)
            .await
            .err()
            .unwrap();
        assert!(format!("{:#}", err).contains("Duplicate name"));
    }
}
