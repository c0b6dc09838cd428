//! Registry lookup-or-create semantics across owners

use docsite::storage::{Owner, Site, SiteKind, StorageRegistries};
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn test_registry_per_owner() {
    let dir = TempDir::new().unwrap();
    let registries = StorageRegistries::new();
    let lobby = Owner::new("lobby", dir.path().join("lobby"));
    let survival = Owner::new("survival", dir.path().join("survival"));

    assert!(Arc::ptr_eq(&registries.get(&lobby), &registries.get(&lobby)));
    assert!(!Arc::ptr_eq(&registries.get(&lobby), &registries.get(&survival)));

    for name in ["local", "backup"] {
        let site = Site::file(lobby.clone(), name).unwrap();
        site.initialize(&registries).await.unwrap();
    }
    let site = Site::new(survival.clone(), "local", SiteKind::File, Vec::new()).unwrap();
    site.initialize(&registries).await.unwrap();

    let lobby_sites: Vec<String> = registries
        .get(&lobby)
        .sites()
        .iter()
        .map(|s| s.name().to_string())
        .collect();
    assert_eq!(lobby_sites, vec!["local", "backup"]);

    let survival_sites = registries.get(&survival).sites();
    assert_eq!(survival_sites.len(), 1);
    assert_eq!(survival_sites[0].owner(), &survival);
    assert!(registries
        .get(&lobby)
        .sites()
        .iter()
        .all(|s| !Arc::ptr_eq(s, &survival_sites[0])));
}

#[tokio::test]
async fn test_bulk_teardown() {
    let dir = TempDir::new().unwrap();
    let registries = StorageRegistries::new();
    let owner = Owner::new("lobby", dir.path());

    let mut sites = Vec::new();
    for name in ["a", "b", "c"] {
        let site = Site::file(owner.clone(), name).unwrap();
        site.initialize(&registries).await.unwrap();
        site.register_point("players").await.unwrap();
        sites.push(site);
    }

    registries.get(&owner).terminate_all().await.unwrap();
    assert!(sites.iter().all(|s| !s.is_initialized()));
    assert_eq!(registries.get(&owner).sites().len(), 3);
}
