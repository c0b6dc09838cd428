//! End-to-end behaviour of file sites through the public API

use docsite::storage::{
    join_save, Document, Owner, Site, StorageBackend, StorageError, StorageRegistries,
};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn document(value: serde_json::Value) -> Document {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("not an object"),
    }
}

async fn players(dir: &TempDir) -> (Arc<Site>, Arc<dyn StorageBackend>) {
    let registries = StorageRegistries::new();
    let site = Site::file(Owner::new("lobby", dir.path()), "local").unwrap();
    site.initialize(&registries).await.unwrap();
    let point = site.register_point("players").await.unwrap();
    (site, point)
}

#[tokio::test]
async fn test_players_scenario() {
    let dir = TempDir::new().unwrap();
    let (_site, players) = players(&dir).await;

    players
        .save(&document(json!({"name": "Alice"})), "alice")
        .await
        .unwrap();

    let file = dir.path().join("data/local/players/alice.json");
    let content = std::fs::read_to_string(&file).unwrap();
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(&content).unwrap(),
        json!({"name": "Alice"})
    );

    assert_eq!(
        players.get("alice").await.unwrap(),
        Some(document(json!({"name": "Alice"})))
    );
    assert_eq!(players.count_all().await.unwrap(), 1);
}

#[tokio::test]
async fn test_save_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let (_site, players) = players(&dir).await;
    let doc = document(json!({"name": "Eve", "stats": {"kills": 3}}));

    players.save(&doc, "eve").await.unwrap();
    let file = dir.path().join("data/local/players/eve.json");
    let once = std::fs::read(&file).unwrap();

    players.save(&doc, "eve").await.unwrap();
    assert_eq!(std::fs::read(&file).unwrap(), once);
    assert_eq!(players.count_all().await.unwrap(), 1);
}

#[tokio::test]
async fn test_count_matches_listing() {
    let dir = TempDir::new().unwrap();
    let (_site, players) = players(&dir).await;

    for i in 0..5 {
        players
            .save(&document(json!({"slot": i})), &format!("player-{}", i))
            .await
            .unwrap();
    }

    let all = players.get_all().await.unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(players.count_all().await.unwrap(), all.len() as u64);

    let mut slots: Vec<i64> = all.iter().map(|d| d["slot"].as_i64().unwrap()).collect();
    slots.sort();
    assert_eq!(slots, vec![0, 1, 2, 3, 4]);
}

#[tokio::test]
async fn test_concurrent_detached_saves() {
    let dir = TempDir::new().unwrap();
    let (_site, players) = players(&dir).await;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            players
                .clone()
                .save_async(document(json!({"n": i})), format!("p{}", i))
        })
        .collect();
    for handle in handles {
        join_save(handle).await.unwrap();
    }

    assert_eq!(players.count_all().await.unwrap(), 8);
    for i in 0..8 {
        assert!(players.exists(&format!("p{}", i)).await.unwrap());
    }
}

#[tokio::test]
async fn test_points_survive_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let (site, players) = players(&dir).await;
        players
            .save(&document(json!({"name": "Frank"})), "frank")
            .await
            .unwrap();
        site.terminate().await.unwrap();
    }

    let (_site, players) = players(&dir).await;
    assert!(players.exists("frank").await.unwrap());
}

#[tokio::test]
async fn test_write_failure_is_reported() {
    let dir = TempDir::new().unwrap();
    let (_site, players) = players(&dir).await;

    std::fs::remove_dir_all(dir.path().join("data/local/players")).unwrap();
    let result = players
        .save(&document(json!({"name": "Gina"})), "gina")
        .await;
    assert!(matches!(result, Err(StorageError::Io(_))));
    assert!(!players.is_available().await);
}

#[tokio::test]
async fn test_every_saved_document_is_listed() {
    let dir = TempDir::new().unwrap();
    let (_site, players) = players(&dir).await;

    for id in ["alice", "bob.v2", "carol-1"] {
        players
            .save(&document(json!({"id": id})), id)
            .await
            .unwrap();
    }
    assert!(matches!(
        players.save(&document(json!({"id": "x"})), ".dotted").await,
        Err(StorageError::InvalidIdentifier(_))
    ));

    let all = players.get_all().await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(players.count_all().await.unwrap(), 3);
    for id in ["alice", "bob.v2", "carol-1"] {
        assert!(players.exists(id).await.unwrap());
    }
}

#[tokio::test]
async fn test_exists_agrees_with_get_on_corrupt_file() {
    let dir = TempDir::new().unwrap();
    let (_site, players) = players(&dir).await;

    std::fs::write(dir.path().join("data/local/players/bad.json"), "{oops").unwrap();

    assert!(players.get("bad").await.is_err());
    assert!(matches!(
        players.exists("bad").await,
        Err(StorageError::Deserialization { .. })
    ));
}
