//! TOML configuration parsing and management.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::storage::{FileSiteOptions, Owner, SiteKind};

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "docsite.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    pub owner: OwnerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub sites: Vec<SiteConfig>,
}

/// Identity of the owning process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerConfig {
    pub name: String,
    /// Data directory; `~` and `$VAR` are expanded
    pub data_dir: String,
}

impl OwnerConfig {
    /// Build the owner identity, expanding the data directory
    pub fn to_owner(&self) -> Result<Owner> {
        let data_dir = shellexpand::full(&self.data_dir)
            .with_context(|| format!("Failed to expand data_dir: {}", self.data_dir))?;
        Ok(Owner::new(
            self.name.clone(),
            PathBuf::from(data_dir.as_ref()),
        ))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// One site and the points registered under it at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub name: String,
    pub kind: SiteKind,
    /// Construction parameters; `$VAR` and `${VAR}` are expanded
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub points: Vec<String>,
    #[serde(flatten)]
    pub file: FileSiteOptions,
}

impl SiteConfig {
    /// Parameters with environment variables expanded
    pub fn expanded_parameters(&self) -> Result<Vec<String>> {
        self.parameters
            .iter()
            .map(|p| {
                shellexpand::env(p)
                    .map(|v| v.into_owned())
                    .with_context(|| format!("Failed to expand parameter of site '{}'", self.name))
            })
            .collect()
    }
}

/// Configuration loader
#[derive(Debug)]
pub struct ConfigurationLoader {
    pub config_path: PathBuf,
    pub config: Configuration,
}

impl ConfigurationLoader {
    /// Initialize configuration loader.
    ///
    /// # Arguments
    /// * `config_path` - Path to TOML config file. If None, uses `docsite.toml`
    ///   when present and the default config otherwise.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let explicit = config_path.is_some();
        let config_path = config_path
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

        let config = if config_path.exists() {
            Self::load_config(&config_path)?
        } else if explicit {
            bail!("Config file not found: {}", config_path.display());
        } else {
            Self::get_default_config()
        };

        Self::validate(&config)?;
        Ok(Self {
            config_path,
            config,
        })
    }

    /// Create a configuration loader from a pre-parsed Configuration.
    pub fn from_config(config: Configuration) -> Result<Self> {
        Self::validate(&config)?;
        Ok(Self {
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            config,
        })
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Configuration =
            toml::from_str(content).context("Failed to parse TOML config")?;
        Self::from_config(config)
    }

    /// Load configuration from TOML file.
    fn load_config(path: &Path) -> Result<Configuration> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }

    /// Get default configuration: one file site with no points.
    fn get_default_config() -> Configuration {
        Configuration {
            owner: OwnerConfig {
                name: "docsite".to_string(),
                data_dir: ".".to_string(),
            },
            logging: LoggingConfig::default(),
            sites: vec![SiteConfig {
                name: "local".to_string(),
                kind: SiteKind::File,
                parameters: Vec::new(),
                points: Vec::new(),
                file: FileSiteOptions::default(),
            }],
        }
    }

    /// Check names and parameter counts before anything touches storage.
    fn validate(config: &Configuration) -> Result<()> {
        if config.owner.name.trim().is_empty() {
            bail!("owner.name must not be empty");
        }

        let mut site_names = HashSet::new();
        for site in &config.sites {
            if !site_names.insert(site.name.as_str()) {
                bail!("Duplicate site name: {}", site.name);
            }
            if site.kind == SiteKind::Mongo
                && site.parameters.len() != site.kind.required_parameters()
            {
                bail!(
                    "Site '{}' is a mongo site and needs exactly one parameter (the connection URI)",
                    site.name
                );
            }
            let mut point_names = HashSet::new();
            for point in &site.points {
                if !point_names.insert(point.as_str()) {
                    bail!("Duplicate point name '{}' in site '{}'", point, site.name);
                }
            }
        }
        Ok(())
    }

    /// Site configuration by name
    pub fn site(&self, name: &str) -> Option<&SiteConfig> {
        self.config.sites.iter().find(|s| s.name == name)
    }

    /// Get configuration value by dot-notation key.
    pub fn get_string(&self, key: &str) -> Option<String> {
        match key {
            "owner.name" => Some(self.config.owner.name.clone()),
            "owner.data_dir" => Some(self.config.owner.data_dir.clone()),
            "logging.level" => Some(self.config.logging.level.clone()),
            _ => None,
        }
    }
}
