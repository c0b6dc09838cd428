//! Configuration management.
//!
//! Sites and their points are declared in a TOML file; `.env` files can
//! supply the variables referenced by site parameters.
//!
//! # Example
//!
//! ```no_run
//! use docsite::config::{ConfigurationLoader, EnvironmentLoader};
//! use std::path::Path;
//!
//! let env = EnvironmentLoader::new(Some(Path::new(".env")));
//! let path = env.config_path();
//! let loader = ConfigurationLoader::new(path.as_deref()).unwrap();
//!
//! for site in &loader.config.sites {
//!     println!("{} ({}): {:?}", site.name, site.kind, site.points);
//! }
//! ```

pub mod config;
pub mod environment;

// Re-export main types for convenience
pub use self::config::{
    Configuration, ConfigurationLoader, LoggingConfig, OwnerConfig, SiteConfig,
    DEFAULT_CONFIG_PATH,
};
pub use self::environment::EnvironmentLoader;
