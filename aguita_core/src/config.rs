//! Configuration file support for Aguita.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/aguita/config.toml`.

use crate::container::{SharedContainer, DEFAULT_NAMESPACE};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub intake: IntakeConfig,

    #[serde(default)]
    pub history: HistoryConfig,
}

/// Where the shared container lives
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Namespace identifier shared with snapshot readers
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Explicit container directory; overrides the namespace location
    #[serde(default)]
    pub container_dir: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            container_dir: None,
        }
    }
}

/// Default amounts for quick add/remove, in cups
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IntakeConfig {
    #[serde(default = "default_quick_amount")]
    pub add_amount: f64,

    #[serde(default = "default_quick_amount")]
    pub remove_amount: f64,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            add_amount: default_quick_amount(),
            remove_amount: default_quick_amount(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_days")]
    pub days: i64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            days: default_history_days(),
        }
    }
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.into()
}

fn default_quick_amount() -> f64 {
    1.0
}

fn default_history_days() -> i64 {
    7
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let Some(config_path) = Self::default_config_path() else {
            tracing::info!("No config directory on this platform, using defaults");
            return Ok(Self::default());
        };
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("aguita").join("config.toml"))
    }

    /// Save the current configuration to the standard config path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_config_path()
            .ok_or_else(|| Error::Config("No config directory on this platform".into()))?;
        self.save_to(&path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Reject values no host could act on
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("intake.add_amount", self.intake.add_amount),
            ("intake.remove_amount", self.intake.remove_amount),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if self.history.days < 0 {
            return Err(Error::Config(format!(
                "history.days must not be negative, got {}",
                self.history.days
            )));
        }
        if self.storage.namespace.trim().is_empty() {
            return Err(Error::Config("storage.namespace must not be empty".into()));
        }
        Ok(())
    }

    /// Open the configured shared container.
    ///
    /// This is the startup precondition: an error here is fatal.
    pub fn open_container(&self) -> Result<SharedContainer> {
        match &self.storage.container_dir {
            Some(dir) => SharedContainer::open(dir),
            None => SharedContainer::for_namespace(&self.storage.namespace),
        }
    }
}
