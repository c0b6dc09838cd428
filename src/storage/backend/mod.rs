//! Points: the per-collection CRUD contract
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │        Site         │
//! │  (handle + points)  │
//! └──────────┬──────────┘
//!            │
//! ┌──────────▼──────────┐
//! │   StorageBackend    │  <-- Trait
//! │      (async)        │
//! └──────────┬──────────┘
//!            │
//!     ┌──────┴──────┐
//!     │             │
//! ┌───▼───┐   ┌─────▼─────┐
//! │ File  │   │  MongoDB  │
//! │Backend│   │  Backend  │
//! └───────┘   └───────────┘
//! ```

mod traits;
mod file_backend;

pub use traits::*;
pub use file_backend::*;

#[cfg(feature = "storage-mongodb")]
mod mongo_backend;

#[cfg(feature = "storage-mongodb")]
pub use mongo_backend::MongoBackend;
