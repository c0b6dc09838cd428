//! File-backed sites

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::Site;
use crate::storage::document::Owner;
use crate::storage::errors::StorageResult;

/// Directory under the owner's data directory that holds every file site
pub const DATA_DIR: &str = "data";

/// What to do with stored files that do not decode as a JSON object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodePolicy {
    /// Fail the whole listing
    #[default]
    Fail,
    /// Log and leave the entry out
    Skip,
}

/// Options for file sites and their points
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSiteOptions {
    /// Handling of undecodable files
    #[serde(default)]
    pub decode_policy: DecodePolicy,
    /// Write indented JSON
    #[serde(default)]
    pub pretty: bool,
}

/// Root directory of a file site: `<data dir>/data/<site name>`
pub fn site_root(owner: &Owner, site_name: &str) -> PathBuf {
    owner.data_dir().join(DATA_DIR).join(site_name)
}

pub(super) async fn initialize(site: &Site) -> StorageResult<PathBuf> {
    let root = site_root(site.owner(), site.name());
    ensure_dir(&root).await?;
    debug!(site = %site.name(), root = %root.display(), "file site root ready");
    Ok(root)
}

async fn ensure_dir(path: &Path) -> StorageResult<()> {
    fs::create_dir_all(path).await?;
    Ok(())
}
