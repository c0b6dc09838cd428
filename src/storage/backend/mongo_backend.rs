//! MongoDB Backend
//!
//! One collection per point, inside the database named after the site.
//! Documents are keyed by `_id`, which holds the identifier.
//!
//! ## Usage
//!
//! Enable the `storage-mongodb` feature in Cargo.toml:
//!
//! ```toml
//! docsite = { version = "0.3", features = ["storage-mongodb"] }
//! ```
//!
//! ```rust,no_run
//! use docsite::storage::{Owner, Site, StorageRegistries};
//!
//! async fn example() -> docsite::storage::StorageResult<()> {
//!     let registries = StorageRegistries::new();
//!     let owner = Owner::new("lobby", "/srv/lobby");
//!
//!     let site = Site::mongo(owner, "lobby", "mongodb://localhost:27017")?;
//!     site.initialize(&registries).await?;
//!     let players = site.register_point("players").await?;
//!     println!("{} players", players.count_all().await?);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, Bson, Document as BsonDocument},
    error::{Error as MongoError, ErrorKind},
    Collection, Database,
};
use std::sync::Arc;
use tracing::debug;

use super::traits::StorageBackend;
use crate::storage::document::Document;
use crate::storage::errors::{StorageError, StorageResult};
use crate::storage::site::Site;

/// Primary key field holding the identifier
pub const ID_FIELD: &str = "_id";

// Server error code for "collection already exists"
const NAMESPACE_EXISTS: i32 = 48;

/// MongoDB point
pub struct MongoBackend {
    name: String,
    site_name: String,
    database: Database,
    collection: Collection<BsonDocument>,
}

impl MongoBackend {
    /// Create the collection when absent and register the point with `site`.
    ///
    /// This is the first call that talks to the server, so an unreachable
    /// or malformed connection string is reported here.
    pub async fn register(site: &Arc<Site>, name: &str) -> StorageResult<Arc<Self>> {
        if name.is_empty() || name.contains('$') || name.contains('\0') {
            return Err(StorageError::config(format!("invalid point name {:?}", name)));
        }
        let client = site.mongo_client()?;
        site.ensure_point_free(name)?;

        let database = client.database(site.name());
        let existing = database
            .list_collection_names()
            .await
            .map_err(connection_error)?;

        if !existing.iter().any(|c| c == name) {
            match database.create_collection(name).await {
                Ok(()) => debug!(site = %site.name(), collection = %name, "collection created"),
                Err(e) if is_namespace_exists(&e) => {}
                Err(e) => return Err(driver_error(e)),
            }
        }

        let backend = Arc::new(Self {
            name: name.to_string(),
            site_name: site.name().to_string(),
            collection: database.collection::<BsonDocument>(name),
            database,
        });
        site.attach_point(backend.clone())?;

        debug!(site = %site.name(), point = %name, "mongo point registered");
        Ok(backend)
    }

    /// Get the collection (for advanced operations)
    pub fn collection(&self) -> &Collection<BsonDocument> {
        &self.collection
    }
}

/// Encode a document with its identifier as `_id`.
///
/// A caller-supplied `_id` field is replaced by the identifier.
pub(crate) fn to_stored(identifier: &str, document: &Document) -> StorageResult<BsonDocument> {
    let fields = mongodb::bson::to_document(document)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;

    let mut stored = doc! { "_id": identifier };
    for (key, value) in fields {
        if key != ID_FIELD {
            stored.insert(key, value);
        }
    }
    Ok(stored)
}

/// Decode a stored document, dropping `_id`, as relaxed extended JSON
pub(crate) fn from_stored(mut stored: BsonDocument) -> StorageResult<Document> {
    let location = match stored.remove(ID_FIELD) {
        Some(Bson::String(id)) => id,
        Some(other) => other.to_string(),
        None => "<no _id>".to_string(),
    };
    match Bson::Document(stored).into_relaxed_extjson() {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(StorageError::decode(location, "stored value is not a document")),
    }
}

fn is_namespace_exists(e: &MongoError) -> bool {
    matches!(*e.kind, ErrorKind::Command(ref command) if command.code == NAMESPACE_EXISTS)
}

fn connection_error(e: MongoError) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn driver_error(e: MongoError) -> StorageError {
    match *e.kind {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::DnsResolve { .. }
        | ErrorKind::Io(_)
        | ErrorKind::Authentication { .. }
        | ErrorKind::ConnectionPoolCleared { .. } => connection_error(e),
        _ => StorageError::Backend(e.to_string()),
    }
}

#[async_trait]
impl StorageBackend for MongoBackend {
    fn backend_type(&self) -> &'static str {
        "mongo"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn site_name(&self) -> &str {
        &self.site_name
    }

    async fn is_available(&self) -> bool {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .is_ok()
    }

    async fn get_all(&self) -> StorageResult<Vec<Document>> {
        let cursor = self.collection.find(doc! {}).await.map_err(driver_error)?;
        let stored: Vec<BsonDocument> = cursor.try_collect().await.map_err(driver_error)?;

        stored.into_iter().map(from_stored).collect()
    }

    async fn count_all(&self) -> StorageResult<u64> {
        self.collection
            .count_documents(doc! {})
            .await
            .map_err(driver_error)
    }

    async fn get(&self, identifier: &str) -> StorageResult<Option<Document>> {
        let found = self
            .collection
            .find_one(doc! { "_id": identifier })
            .await
            .map_err(driver_error)?;

        found.map(from_stored).transpose()
    }

    async fn save(&self, document: &Document, identifier: &str) -> StorageResult<()> {
        let stored = to_stored(identifier, document)?;

        // Upsert the document
        self.collection
            .replace_one(doc! { "_id": identifier }, stored)
            .upsert(true)
            .await
            .map_err(driver_error)?;

        Ok(())
    }

    async fn exists(&self, identifier: &str) -> StorageResult<bool> {
        let count = self
            .collection
            .count_documents(doc! { "_id": identifier })
            .await
            .map_err(driver_error)?;

        Ok(count > 0)
    }
}
