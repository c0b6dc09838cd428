//! Storage sites
//!
//! A site owns the physical handle its points share: a root directory for
//! file sites, a MongoDB client for mongo sites. The variant is chosen at
//! construction time through [`SiteKind`].
//!
//! ```rust,no_run
//! use docsite::storage::{Owner, Site, StorageRegistries};
//!
//! async fn example() -> docsite::storage::StorageResult<()> {
//!     let registries = StorageRegistries::new();
//!     let owner = Owner::new("lobby", "/srv/lobby");
//!
//!     let site = Site::file(owner, "local")?;
//!     site.initialize(&registries).await?;
//!     let players = site.register_point("players").await?;
//!
//!     println!("{} players", players.count_all().await?);
//!     site.terminate().await
//! }
//! ```

mod file_site;
#[cfg(feature = "storage-mongodb")]
mod mongo_site;

pub use file_site::{site_root, DecodePolicy, FileSiteOptions, DATA_DIR};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

use super::backend::{FileBackend, StorageBackend};
use super::document::{check_identifier, Owner};
use super::errors::{StorageError, StorageResult};
use super::registry::StorageRegistries;

#[cfg(feature = "storage-mongodb")]
use super::backend::MongoBackend;

/// The medium a site stores its points in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteKind {
    /// One JSON file per document under the owner's data directory
    File,
    /// One MongoDB collection per point in a database named after the site
    #[serde(alias = "mongodb")]
    Mongo,
}

impl SiteKind {
    /// Number of construction parameters this kind requires
    pub fn required_parameters(self) -> usize {
        match self {
            SiteKind::File => 0,
            SiteKind::Mongo => 1,
        }
    }
}

impl fmt::Display for SiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteKind::File => write!(f, "file"),
            SiteKind::Mongo => write!(f, "mongo"),
        }
    }
}

/// Live handle established by [`Site::initialize`]
enum SiteHandle {
    File(PathBuf),
    #[cfg(feature = "storage-mongodb")]
    Mongo(mongo_site::MongoHandle),
}

/// A named storage scope bound to one owner.
pub struct Site {
    owner: Owner,
    name: String,
    kind: SiteKind,
    parameters: Vec<String>,
    file_options: FileSiteOptions,
    handle: RwLock<Option<SiteHandle>>,
    points: RwLock<Vec<Arc<dyn StorageBackend>>>,
}

impl Site {
    /// Create a site of the given kind.
    ///
    /// File sites take no parameters; extra ones are kept but unused.
    /// Mongo sites take exactly one, the connection URI.
    pub fn new(
        owner: Owner,
        name: &str,
        kind: SiteKind,
        parameters: Vec<String>,
    ) -> StorageResult<Arc<Self>> {
        Self::with_options(owner, name, kind, parameters, FileSiteOptions::default())
    }

    /// Create a site with explicit file options
    pub fn with_options(
        owner: Owner,
        name: &str,
        kind: SiteKind,
        parameters: Vec<String>,
        file_options: FileSiteOptions,
    ) -> StorageResult<Arc<Self>> {
        check_identifier(name)
            .map_err(|_| StorageError::config(format!("invalid site name {:?}", name)))?;

        match kind {
            SiteKind::File => {}
            SiteKind::Mongo => {
                if cfg!(not(feature = "storage-mongodb")) {
                    return Err(StorageError::config(format!(
                        "site '{}' is a mongo site but the storage-mongodb feature is disabled",
                        name
                    )));
                }
                if parameters.len() != kind.required_parameters() {
                    return Err(StorageError::config(format!(
                        "mongo site '{}' requires exactly one parameter (the connection URI), got {}",
                        name,
                        parameters.len()
                    )));
                }
            }
        }

        Ok(Arc::new(Self {
            owner,
            name: name.to_string(),
            kind,
            parameters,
            file_options,
            handle: RwLock::new(None),
            points: RwLock::new(Vec::new()),
        }))
    }

    /// Create a file site
    pub fn file(owner: Owner, name: &str) -> StorageResult<Arc<Self>> {
        Self::new(owner, name, SiteKind::File, Vec::new())
    }

    /// Create a mongo site for the given connection URI
    #[cfg(feature = "storage-mongodb")]
    pub fn mongo(owner: Owner, name: &str, connection_uri: &str) -> StorageResult<Arc<Self>> {
        Self::new(owner, name, SiteKind::Mongo, vec![connection_uri.to_string()])
    }

    /// Site name; also the directory or database name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning process
    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    /// Site kind
    pub fn kind(&self) -> SiteKind {
        self.kind
    }

    /// Construction parameters, in order
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// File options (ignored by mongo sites)
    pub fn file_options(&self) -> &FileSiteOptions {
        &self.file_options
    }

    /// Whether `initialize` ran and `terminate` has not
    pub fn is_initialized(&self) -> bool {
        self.handle
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Snapshot of the points registered under this site
    pub fn points(&self) -> Vec<Arc<dyn StorageBackend>> {
        self.points
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Look up a registered point by name
    pub fn point(&self, name: &str) -> Option<Arc<dyn StorageBackend>> {
        self.points
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|p| p.name() == name)
            .cloned()
    }

    /// Establish the site's handle and register it with its owner.
    ///
    /// File sites create their root directory. Mongo sites build a client
    /// without contacting the server; a malformed URI is reported by the
    /// first point registration instead.
    pub async fn initialize(self: &Arc<Self>, registries: &StorageRegistries) -> StorageResult<()> {
        let registry = registries.get(&self.owner);
        if registry.site(&self.name).is_some() {
            return Err(StorageError::DuplicateName(format!(
                "site '{}' for owner '{}'",
                self.name,
                self.owner.name()
            )));
        }

        let handle = match self.kind {
            SiteKind::File => SiteHandle::File(file_site::initialize(self).await?),
            #[cfg(feature = "storage-mongodb")]
            SiteKind::Mongo => SiteHandle::Mongo(mongo_site::initialize(self).await),
            #[cfg(not(feature = "storage-mongodb"))]
            SiteKind::Mongo => {
                return Err(StorageError::config("storage-mongodb feature is disabled"))
            }
        };
        *self.handle.write().unwrap_or_else(PoisonError::into_inner) = Some(handle);

        // A concurrent initialize of the same name may have won the race
        if let Err(e) = registry.add_site(Arc::clone(self)) {
            self.release_handle().await;
            return Err(e);
        }
        info!(site = %self.name, kind = %self.kind, owner = %self.owner.name(), "site initialized");
        Ok(())
    }

    /// Release the handle acquired by `initialize`.
    ///
    /// Points stay listed, but further operations on mongo points fail.
    pub async fn terminate(&self) -> StorageResult<()> {
        if !self.release_handle().await {
            debug!(site = %self.name, "terminate on a site without a live handle");
        }
        info!(site = %self.name, "site terminated");
        Ok(())
    }

    /// Take and close the live handle, returning whether there was one
    async fn release_handle(&self) -> bool {
        let handle = self
            .handle
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match handle {
            None => false,
            Some(SiteHandle::File(_)) => true,
            #[cfg(feature = "storage-mongodb")]
            Some(SiteHandle::Mongo(handle)) => {
                mongo_site::terminate(handle).await;
                true
            }
        }
    }

    /// Provision and register a point of this site's kind
    pub async fn register_point(self: &Arc<Self>, name: &str) -> StorageResult<Arc<dyn StorageBackend>> {
        match self.kind {
            SiteKind::File => {
                let point: Arc<dyn StorageBackend> = FileBackend::register(self, name).await?;
                Ok(point)
            }
            #[cfg(feature = "storage-mongodb")]
            SiteKind::Mongo => {
                let point: Arc<dyn StorageBackend> = MongoBackend::register(self, name).await?;
                Ok(point)
            }
            #[cfg(not(feature = "storage-mongodb"))]
            SiteKind::Mongo => Err(StorageError::config("storage-mongodb feature is disabled")),
        }
    }

    /// Root directory of an initialized file site
    pub(crate) fn file_root(&self) -> StorageResult<PathBuf> {
        match self
            .handle
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            Some(SiteHandle::File(root)) => Ok(root.clone()),
            #[cfg(feature = "storage-mongodb")]
            Some(SiteHandle::Mongo(_)) => Err(StorageError::config(format!(
                "site '{}' is not a file site",
                self.name
            ))),
            None => Err(StorageError::NotInitialized(self.name.clone())),
        }
    }

    /// Client of an initialized mongo site
    #[cfg(feature = "storage-mongodb")]
    pub(crate) fn mongo_client(&self) -> StorageResult<mongodb::Client> {
        match self
            .handle
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            Some(SiteHandle::Mongo(handle)) => handle.client(),
            Some(SiteHandle::File(_)) => Err(StorageError::config(format!(
                "site '{}' is not a mongo site",
                self.name
            ))),
            None => Err(StorageError::NotInitialized(self.name.clone())),
        }
    }

    /// Fail early when a point name is taken
    pub(crate) fn ensure_point_free(&self, name: &str) -> StorageResult<()> {
        if self.point(name).is_some() {
            return Err(StorageError::DuplicateName(format!(
                "point '{}' in site '{}'",
                name, self.name
            )));
        }
        Ok(())
    }

    /// Append a provisioned point
    pub(crate) fn attach_point(&self, point: Arc<dyn StorageBackend>) -> StorageResult<()> {
        let mut points = self.points.write().unwrap_or_else(PoisonError::into_inner);
        if points.iter().any(|p| p.name() == point.name()) {
            return Err(StorageError::DuplicateName(format!(
                "point '{}' in site '{}'",
                point.name(),
                self.name
            )));
        }
        points.push(point);
        Ok(())
    }
}

impl fmt::Debug for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let points: Vec<String> = self.points().iter().map(|p| p.name().to_string()).collect();
        f.debug_struct("Site")
            .field("owner", &self.owner.name())
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("initialized", &self.is_initialized())
            .field("points", &points)
            .finish()
    }
}
