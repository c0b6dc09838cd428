//! File System Backend
//!
//! Stores each document as `<identifier>.json` inside a directory named
//! after the point, under the site's root directory.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use super::traits::StorageBackend;
use crate::storage::document::{check_identifier, parse_document, Document};
use crate::storage::errors::{StorageError, StorageResult};
use crate::storage::site::{DecodePolicy, Site};

const EXTENSION: &str = ".json";

/// File system point
pub struct FileBackend {
    name: String,
    site_name: String,
    folder: PathBuf,
    decode_policy: DecodePolicy,
    pretty: bool,
}

impl FileBackend {
    /// Provision `<site root>/<name>` and register the point with `site`.
    pub async fn register(site: &Arc<Site>, name: &str) -> StorageResult<Arc<Self>> {
        check_identifier(name)
            .map_err(|_| StorageError::config(format!("invalid point name {:?}", name)))?;
        let root = site.file_root()?;
        site.ensure_point_free(name)?;

        let folder = root.join(name);
        fs::create_dir_all(&folder).await?;

        let options = site.file_options();
        let backend = Arc::new(Self {
            name: name.to_string(),
            site_name: site.name().to_string(),
            folder,
            decode_policy: options.decode_policy,
            pretty: options.pretty,
        });
        site.attach_point(backend.clone())?;

        debug!(site = %site.name(), point = %name, folder = %backend.folder.display(), "file point registered");
        Ok(backend)
    }

    /// Directory holding this point's documents
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Path of the file holding `identifier`
    pub fn document_path(&self, identifier: &str) -> StorageResult<PathBuf> {
        check_identifier(identifier)?;
        Ok(self.folder.join(format!("{}{}", identifier, EXTENSION)))
    }

    fn location(&self, path: &Path) -> String {
        let file = path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();
        format!("{}/{}", self.name, file)
    }

    async fn read_document(&self, path: &Path) -> StorageResult<Document> {
        let text = fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == ErrorKind::InvalidData {
                StorageError::decode(self.location(path), "file is not valid UTF-8")
            } else {
                StorageError::Io(e)
            }
        })?;
        parse_document(&self.location(path), &text)
    }

    /// Paths of every document file, skipping temp files and directories
    async fn document_files(&self) -> StorageResult<Vec<PathBuf>> {
        let mut entries = fs::read_dir(&self.folder).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if file_name.starts_with('.') || !file_name.ends_with(EXTENSION) {
                continue;
            }
            if !entry.file_type().await?.is_file() {
                continue;
            }
            files.push(entry.path());
        }

        Ok(files)
    }

    fn encode(&self, document: &Document) -> StorageResult<Vec<u8>> {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(document)
        } else {
            serde_json::to_vec(document)
        };
        encoded.map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    fn backend_type(&self) -> &'static str {
        "file"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn site_name(&self) -> &str {
        &self.site_name
    }

    async fn is_available(&self) -> bool {
        fs::metadata(&self.folder)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    async fn get_all(&self) -> StorageResult<Vec<Document>> {
        let mut documents = Vec::new();

        for path in self.document_files().await? {
            match self.read_document(&path).await {
                Ok(document) => documents.push(document),
                // Removed between listing and reading
                Err(StorageError::Io(e)) if e.kind() == ErrorKind::NotFound => {}
                Err(e @ StorageError::Deserialization { .. })
                    if self.decode_policy == DecodePolicy::Skip =>
                {
                    warn!(point = %self.name, error = %e, "skipping undecodable document");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(documents)
    }

    async fn count_all(&self) -> StorageResult<u64> {
        match self.decode_policy {
            DecodePolicy::Fail => Ok(self.document_files().await?.len() as u64),
            // Only decodable documents are visible under Skip
            DecodePolicy::Skip => Ok(self.get_all().await?.len() as u64),
        }
    }

    async fn get(&self, identifier: &str) -> StorageResult<Option<Document>> {
        let path = self.document_path(identifier)?;
        match self.read_document(&path).await {
            Ok(document) => Ok(Some(document)),
            Err(StorageError::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn save(&self, document: &Document, identifier: &str) -> StorageResult<()> {
        let path = self.document_path(identifier)?;
        let data = self.encode(document)?;

        // Write atomically using temp file + rename pattern
        let temp_path = self
            .folder
            .join(format!(".{}{}.{}.tmp", identifier, EXTENSION, Uuid::new_v4()));

        let written = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &path).await
        }
        .await;

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path).await;
            return Err(StorageError::Io(e));
        }

        Ok(())
    }

    async fn exists(&self, identifier: &str) -> StorageResult<bool> {
        match self.get(identifier).await {
            Ok(document) => Ok(document.is_some()),
            // Hidden from get_all, so absent here too
            Err(StorageError::Deserialization { .. })
                if self.decode_policy == DecodePolicy::Skip =>
            {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
