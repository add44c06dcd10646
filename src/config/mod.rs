//! Configuration module for autometa
//!
//! Settings live in `config.toml` in the user's config directory. Every key
//! can be overridden with an `AUTOMETA_<KEY>` environment variable, e.g.
//! `AUTOMETA_TAG_STYLE=frontmatter`.

use std::fs;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::actions;
use crate::engine::{EngineOptions, TagStyle};

/// Keys accepted by [`AutometaConfig::set`] and [`AutometaConfig::get`]
pub const KEYS: &[&str] = &["registry", "tag_style", "quiet"];

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AutometaConfig {
    /// Action registry file; defaults to `actions.toml` next to this config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<PathBuf>,

    /// Where added tags are written
    #[serde(default)]
    pub tag_style: TagStyle,

    /// Suppress informational output by default
    #[serde(default)]
    pub quiet: bool,
}

impl AutometaConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Message("Could not determine config directory".to_string()))?;

        Ok(config_dir.join("autometa").join("config.toml"))
    }

    /// Load configuration from the default location
    ///
    /// A missing file yields the defaults; environment overrides still apply.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, then apply environment overrides
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix("AUTOMETA").try_parsing(true))
            .build()?;

        settings.try_deserialize()
    }

    /// Save configuration to the default location
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// Same as [`AutometaConfig::save`].
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::Message(format!("Failed to create config directory: {e}")))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Registry file to load actions from
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if no registry is configured and the default
    /// location cannot be determined.
    pub fn registry_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.registry {
            Some(path) => Ok(path.clone()),
            None => actions::default_registry_path().map_err(|e| ConfigError::Message(e.to_string())),
        }
    }

    /// Engine options derived from this configuration
    #[must_use]
    pub const fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            tag_style: self.tag_style,
        }
    }

    /// Set a value from a `key=value` string
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the setting is not `key=value`, the key is
    /// unknown or the value does not parse.
    pub fn set(&mut self, setting: &str) -> Result<(), ConfigError> {
        let (key, value) = setting
            .split_once('=')
            .ok_or_else(|| ConfigError::Message(format!("Expected KEY=VALUE, got '{setting}'")))?;
        let (key, value) = (key.trim(), value.trim());

        match key {
            "registry" => {
                self.registry = if value.is_empty() { None } else { Some(PathBuf::from(value)) };
            }
            "tag_style" => {
                self.tag_style = match value {
                    "inline" => TagStyle::Inline,
                    "frontmatter" => TagStyle::Frontmatter,
                    _ => {
                        return Err(ConfigError::Message(format!(
                            "Invalid tag_style '{value}': expected 'inline' or 'frontmatter'"
                        )));
                    }
                };
            }
            "quiet" => {
                self.quiet = value
                    .parse()
                    .map_err(|_| ConfigError::Message(format!("Invalid quiet value '{value}': expected true or false")))?;
            }
            _ => {
                return Err(ConfigError::Message(format!(
                    "Unknown config key '{key}' (expected one of: {})",
                    KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Current value of `key` as text
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "registry" => Some(
                self.registry
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
            "tag_style" => Some(self.tag_style.to_string()),
            "quiet" => Some(self.quiet.to_string()),
            _ => None,
        }
    }
}
