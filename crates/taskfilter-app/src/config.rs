use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use taskfilter_bridge::{BridgeConfig, CommandBridge};

const CONFIG_DIR: &str = ".taskfilter";
const CONFIG_FILE: &str = "config.toml";

/// Top-level project configuration loaded from `.taskfilter/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl ProjectConfig {
    /// Default configuration rooted at `workdir`.
    #[must_use]
    pub fn new(workdir: impl AsRef<Path>) -> Self {
        Self {
            bridge: BridgeConfig::default(),
            storage: StorageConfig::default(),
            base_dir: workdir.as_ref().join(CONFIG_DIR),
        }
    }

    /// Load configuration from a project directory.
    ///
    /// A missing file yields the defaults.
    pub fn from_workdir(workdir: impl AsRef<Path>) -> Result<Self> {
        let workdir = workdir.as_ref();
        let config_path = workdir.join(CONFIG_DIR).join(CONFIG_FILE);
        if !config_path.exists() {
            return Ok(Self::new(workdir));
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let mut config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        config.base_dir = workdir.join(CONFIG_DIR);
        config.validate()?;
        Ok(config)
    }

    /// Directory holding the configuration and persisted state.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the persisted custom filter set.
    #[must_use]
    pub fn filters_path(&self) -> PathBuf {
        self.base_dir.join(&self.storage.filters_file)
    }

    /// Path of the persisted built-in filter options.
    #[must_use]
    pub fn options_path(&self) -> PathBuf {
        self.base_dir.join(&self.storage.options_file)
    }

    /// Query bridge backed by the configured command.
    #[must_use]
    pub fn command_bridge(&self) -> CommandBridge {
        CommandBridge::new(self.bridge.clone(), self.base_dir.clone())
    }

    fn validate(&self) -> Result<()> {
        if self.bridge.timeout == 0 {
            bail!("bridge.timeout must be greater than zero");
        }
        self.storage.validate()
    }
}

/// Locations of persisted state, relative to `.taskfilter/`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub filters_file: PathBuf,
    pub options_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            filters_file: PathBuf::from("filters.json"),
            options_file: PathBuf::from("options.toml"),
        }
    }
}

impl StorageConfig {
    fn validate(&self) -> Result<()> {
        for (key, path) in [
            ("storage.filters_file", &self.filters_file),
            ("storage.options_file", &self.options_file),
        ] {
            if path.as_os_str().is_empty() {
                bail!("{key} must not be empty");
            }
        }
        Ok(())
    }
}
