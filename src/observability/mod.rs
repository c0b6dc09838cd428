//! Observability utilities.
//!
//! Storage code logs through `tracing`; binaries install a subscriber once
//! at startup.
//!
//! # Example
//!
//! ```no_run
//! use docsite::config::LoggingConfig;
//! use docsite::observability::init_tracing;
//!
//! init_tracing(&LoggingConfig::default(), Some("debug"));
//! tracing::info!("storage ready");
//! ```

pub mod subscriber;

// Re-export main types for convenience
pub use subscriber::{filter_directive, init_tracing};
