//! Environment variable loading and management.

use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "DOCSITE_CONFIG";

/// Environment variable overriding the configured log level
pub const LOG_ENV: &str = "DOCSITE_LOG";

/// Loads environment variables from .env file and system environment.
#[derive(Debug, Clone)]
pub struct EnvironmentLoader {
    env_file: Option<PathBuf>,
}

impl EnvironmentLoader {
    /// Initialize the environment loader.
    ///
    /// # Arguments
    /// * `env_file` - Path to .env file. Nothing is loaded when None, so
    ///   tests never pick up a stray `.env`.
    pub fn new(env_file: Option<&Path>) -> Self {
        if let Some(path) = env_file {
            if path.exists() {
                if let Err(e) = dotenv::from_path(path) {
                    tracing::warn!(path = %path.display(), error = %e, "failed to load .env file");
                }
            }
        }

        Self {
            env_file: env_file.map(Path::to_path_buf),
        }
    }

    /// The .env file this loader was given
    pub fn env_file(&self) -> Option<&Path> {
        self.env_file.as_deref()
    }

    /// Configuration file named by `DOCSITE_CONFIG`
    pub fn config_path(&self) -> Option<PathBuf> {
        env::var_os(CONFIG_ENV).map(PathBuf::from)
    }

    /// Log level override from `DOCSITE_LOG`
    pub fn log_level(&self) -> Option<String> {
        env::var(LOG_ENV).ok().filter(|v| !v.trim().is_empty())
    }
}

impl Default for EnvironmentLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        env::remove_var(LOG_ENV);
        env::remove_var(CONFIG_ENV);
        let env_loader = EnvironmentLoader::default();
        assert_eq!(env_loader.log_level(), None);
        assert_eq!(env_loader.config_path(), None);

        env::set_var(LOG_ENV, "debug");
        env::set_var(CONFIG_ENV, "/etc/docsite.toml");
        assert_eq!(env_loader.log_level(), Some("debug".to_string()));
        assert_eq!(
            env_loader.config_path(),
            Some(PathBuf::from("/etc/docsite.toml"))
        );

        env::remove_var(LOG_ENV);
        env::remove_var(CONFIG_ENV);
    }

    #[test]
    fn test_env_file_loading() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "DOCSITE_TEST_FROM_DOTENV=yes\n").unwrap();

        let env_loader = EnvironmentLoader::new(Some(&path));
        assert_eq!(env_loader.env_file(), Some(path.as_path()));
        assert_eq!(env::var("DOCSITE_TEST_FROM_DOTENV").unwrap(), "yes");
        env::remove_var("DOCSITE_TEST_FROM_DOTENV");
    }
}
