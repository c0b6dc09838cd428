//! docsite - Per-owner document storage with pluggable backends
//!
//! An owner process declares named **sites**, each bound to one medium, and
//! registers named **points** under them. Every point offers the same async
//! CRUD contract over JSON documents keyed by string identifiers:
//!
//! - **`storage`** - sites, points, registries and errors
//! - **`config`** - TOML configuration and `.env` loading
//! - **`observability`** - tracing subscriber setup
//! - **`manager`** - opens every configured site for one owner
//! - **`cli`** - diagnostic command line tool (enabled with the `cli` feature)
//!
//! # Features
//!
//! ```toml
//! [dependencies]
//! docsite = "0.3"
//! # MongoDB sites:
//! docsite = { version = "0.3", features = ["storage-mongodb"] }
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use docsite::storage::{Owner, Site, StorageRegistries};
//! use serde_json::json;
//!
//! async fn example() -> docsite::storage::StorageResult<()> {
//!     let registries = StorageRegistries::new();
//!     let owner = Owner::new("lobby", "/srv/lobby");
//!
//!     let site = Site::file(owner, "local")?;
//!     site.initialize(&registries).await?;
//!
//!     let players = site.register_point("players").await?;
//!     let alice = json!({"name": "Alice"}).as_object().cloned().unwrap_or_default();
//!     players.save(&alice, "alice").await?;
//!     assert!(players.exists("alice").await?);
//!
//!     site.terminate().await
//! }
//! ```

#![warn(missing_docs)]

/// Sites, points and registries
pub mod storage;

/// Configuration management
#[allow(missing_docs)]
pub mod config;

/// Observability utilities
pub mod observability;

/// Composition root for one owner
pub mod manager;

/// Command line interface (enabled with the `cli` feature)
#[cfg(feature = "cli")]
#[allow(missing_docs)]
pub mod cli;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Configuration, ConfigurationLoader, EnvironmentLoader};
    pub use crate::manager::StorageManager;
    pub use crate::storage::{
        Document, Owner, Site, SiteKind, StorageBackend, StorageBackendExt, StorageError,
        StorageRegistries, StorageRegistry, StorageResult,
    };
}
