//! Command implementations

use anyhow::{bail, Context, Result};
use std::sync::Arc;

use super::Command;
use crate::manager::StorageManager;
use crate::storage::{Document, StorageBackend};

/// Run one command against opened storage
pub async fn execute(manager: &StorageManager, command: &Command) -> Result<()> {
    match command {
        Command::Sites => {
            for line in site_lines(manager) {
                println!("{}", line);
            }
        }
        Command::Count { site, point } => {
            let point = resolve(manager, site, point).await?;
            println!("{}", point.count_all().await?);
        }
        Command::Get {
            site,
            point,
            identifier,
        } => {
            let point = resolve(manager, site, point).await?;
            match point.get(identifier).await? {
                Some(document) => println!("{}", serde_json::to_string_pretty(&document)?),
                None => bail!("No document '{}' in {}/{}", identifier, site, point.name()),
            }
        }
        Command::Put {
            site,
            point,
            identifier,
            json,
        } => {
            let document = parse_object(json)?;
            let point = resolve(manager, site, point).await?;
            point.save(&document, identifier).await?;
            println!("saved {}/{}/{}", site, point.name(), identifier);
        }
        Command::Dump { site, point } => {
            let point = resolve(manager, site, point).await?;
            for document in point.get_all().await? {
                println!("{}", serde_json::to_string(&document)?);
            }
        }
    }
    Ok(())
}

/// One line per site: name, kind, state and points
pub fn site_lines(manager: &StorageManager) -> Vec<String> {
    manager
        .registry()
        .sites()
        .iter()
        .map(|site| {
            let points: Vec<String> = site.points().iter().map(|p| p.name().to_string()).collect();
            format!(
                "{}\t{}\t{}\t{}",
                site.name(),
                site.kind(),
                if site.is_initialized() { "open" } else { "closed" },
                points.join(",")
            )
        })
        .collect()
}

async fn resolve(
    manager: &StorageManager,
    site: &str,
    point: &str,
) -> Result<Arc<dyn StorageBackend>> {
    manager.point_or_register(site, point).await
}

/// Parse a command line argument as a JSON object
pub fn parse_object(json: &str) -> Result<Document> {
    match serde_json::from_str(json).context("Argument is not valid JSON")? {
        serde_json::Value::Object(map) => Ok(map),
        _ => bail!("Documents must be JSON objects"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigurationLoader;
    use crate::storage::StorageRegistries;
    use tempfile::TempDir;

    #[test]
    fn test_parse_object() {
        let doc = parse_object(r#"{"name":"Alice"}"#).unwrap();
        assert_eq!(doc["name"], "Alice");
        assert!(parse_object("[1]").is_err());
        assert!(parse_object("{").is_err());
    }

    #[tokio::test]
    async fn test_put_then_list() {
        let dir = TempDir::new().unwrap();
        let toml = format!(
            "[owner]\nname = \"cli\"\ndata_dir = \"{}\"\n\n[[sites]]\nname = \"local\"\nkind = \"file\"\n",
            dir.path().display()
        );
        let config = ConfigurationLoader::from_toml_str(&toml).unwrap().config;
        let manager = StorageManager::open(&config, Arc::new(StorageRegistries::new()))
            .await
            .unwrap();

        let put = Command::Put {
            site: "local".to_string(),
            point: "players".to_string(),
            identifier: "alice".to_string(),
            json: r#"{"name":"Alice"}"#.to_string(),
        };
        execute(&manager, &put).await.unwrap();
        assert!(dir.path().join("data/local/players/alice.json").is_file());

        assert_eq!(site_lines(&manager), vec!["local\tfile\topen\tplayers".to_string()]);

        let get_missing = Command::Get {
            site: "local".to_string(),
            point: "players".to_string(),
            identifier: "bob".to_string(),
        };
        assert!(execute(&manager, &get_missing).await.is_err());
    }
}
