//! Configuration and settings model for GameDeck
//!
//! Holds the platform/OS enums, emulator and game folder definitions, the
//! bundled emulator catalog, and the TOML launcher configuration file.

mod catalog;
mod platform;
mod settings;

pub use catalog::{CatalogEntry, EmulatorCatalog, infer_platform};
pub use platform::{OsKey, Platform};
pub use settings::{
    EmulatorDef, EmulatorMap, EmulatorOsConfig, GameFolder, ROM_PLACEHOLDER, Settings,
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("Unknown operating system: {0}")]
    UnknownOs(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Name of the config file inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Per-user directories for this application, if the platform has them
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("io", "gamedeck", "gamedeck")
}

/// Default location of the config file
pub fn default_config_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(".gamedeck").join(CONFIG_FILE))
}

fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".gamedeck"))
}

/// Library storage settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// SQLite file holding settings and games
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Keep favorites and emulator overrides on re-scanned games
    #[serde(default)]
    pub preserve_user_edits: bool,
}

/// Emulator catalog settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Catalog file to use instead of the bundled one
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive, e.g. `info` or `gamedeck_library=debug`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file used while the terminal UI is running
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Main launcher configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LauncherConfig {
    #[serde(default)]
    pub library: LibraryConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LauncherConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise from the default location.
    /// Falls back to defaults when the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_path);

        if path.exists() {
            return Self::load(&path);
        }

        tracing::warn!("No configuration file at {}, using defaults", path.display());
        Ok(Self::default())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Resolved SQLite path
    pub fn database_path(&self) -> PathBuf {
        self.library
            .database_path
            .clone()
            .unwrap_or_else(|| default_data_dir().join("library.db"))
    }

    /// Resolved log file path for the terminal UI
    pub fn log_file(&self) -> PathBuf {
        self.logging
            .file
            .clone()
            .unwrap_or_else(|| default_data_dir().join("gamedeck.log"))
    }

    /// Emulator catalog to seed on first boot
    pub fn load_catalog(&self) -> Result<EmulatorCatalog, ConfigError> {
        match &self.catalog.path {
            Some(path) => EmulatorCatalog::load(path),
            None => EmulatorCatalog::bundled(),
        }
    }
}
