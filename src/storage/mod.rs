//! Document storage
//!
//! Sites own a physical handle (a directory or a MongoDB client) and hold
//! points; points store JSON documents under string identifiers.
//!
//! ```text
//! StorageRegistries ── owner ──▶ StorageRegistry
//!                                   │
//!                                   ├── Site "local" (file)
//!                                   │     └── point "players" ─▶ data/local/players/<id>.json
//!                                   └── Site "lobby" (mongo)
//!                                         └── point "players" ─▶ lobby.players { _id: <id> }
//! ```

pub mod backend;
pub mod document;
pub mod errors;
pub mod registry;
pub mod site;

pub use backend::{join_save, FileBackend, StorageBackend, StorageBackendExt};
pub use document::{Document, Owner};
pub use errors::{StorageError, StorageResult};
pub use registry::{StorageRegistries, StorageRegistry};
pub use site::{site_root, DecodePolicy, FileSiteOptions, Site, SiteKind, DATA_DIR};

#[cfg(feature = "storage-mongodb")]
pub use backend::MongoBackend;
