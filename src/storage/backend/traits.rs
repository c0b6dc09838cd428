//! Storage Backend Traits
//!
//! Defines the CRUD contract every point implements.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::storage::document::Document;
use crate::storage::errors::{StorageError, StorageResult};

/// Core trait for points
///
/// A point is one named collection of identifier-keyed documents inside a
/// site. Instances only exist after registration, so every method may
/// assume the underlying directory or collection has been provisioned.
#[async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Get the backend type name ("file" or "mongo")
    fn backend_type(&self) -> &'static str;

    /// Point name
    fn name(&self) -> &str;

    /// Name of the site this point was registered under
    fn site_name(&self) -> &str;

    /// Check if the underlying medium is reachable
    async fn is_available(&self) -> bool;

    /// Every stored document, in no particular order
    async fn get_all(&self) -> StorageResult<Vec<Document>>;

    /// Number of stored documents
    async fn count_all(&self) -> StorageResult<u64>;

    /// The document stored under `identifier`, if any
    async fn get(&self, identifier: &str) -> StorageResult<Option<Document>>;

    /// Store `document` under `identifier`, replacing any previous one
    async fn save(&self, document: &Document, identifier: &str) -> StorageResult<()>;

    /// Whether a document is stored under `identifier`
    async fn exists(&self, identifier: &str) -> StorageResult<bool> {
        Ok(self.get(identifier).await?.is_some())
    }

    /// Run `save` on a detached task.
    ///
    /// The caller may drop the handle; failures are then only logged.
    fn save_async(
        self: Arc<Self>,
        document: Document,
        identifier: String,
    ) -> JoinHandle<StorageResult<()>> {
        tokio::spawn(async move {
            let result = self.save(&document, &identifier).await;
            if let Err(e) = &result {
                warn!(
                    site = %self.site_name(),
                    point = %self.name(),
                    %identifier,
                    error = %e,
                    "detached save failed"
                );
            }
            result
        })
    }
}

/// Extension trait for typed documents
///
/// Converts between serde types and [`Document`]s.
#[async_trait]
pub trait StorageBackendExt: StorageBackend {
    /// Save a serializable value; it must serialize to a JSON object
    async fn save_as<T: serde::Serialize + Send + Sync>(
        &self,
        value: &T,
        identifier: &str,
    ) -> StorageResult<()> {
        let document = match serde_json::to_value(value)
            .map_err(|e| StorageError::Serialization(e.to_string()))?
        {
            serde_json::Value::Object(map) => map,
            _ => {
                return Err(StorageError::Serialization(format!(
                    "value for '{}' does not serialize to a JSON object",
                    identifier
                )))
            }
        };
        self.save(&document, identifier).await
    }

    /// Read and deserialize a stored document
    async fn get_as<T: serde::de::DeserializeOwned>(
        &self,
        identifier: &str,
    ) -> StorageResult<Option<T>> {
        match self.get(identifier).await? {
            Some(document) => serde_json::from_value(serde_json::Value::Object(document))
                .map(Some)
                .map_err(|e| StorageError::decode(identifier, e)),
            None => Ok(None),
        }
    }
}

// Blanket implementation for all StorageBackend implementors
impl<T: StorageBackend + ?Sized> StorageBackendExt for T {}

/// Await a detached save and flatten the join error
pub async fn join_save(handle: JoinHandle<StorageResult<()>>) -> StorageResult<()> {
    handle
        .await
        .map_err(|e| StorageError::Task(e.to_string()))?
}
