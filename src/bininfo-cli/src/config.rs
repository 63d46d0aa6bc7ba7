//! Configuration management for bininfo CLI

use anyhow::{Context, Result};
use bininfo::DecodeOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::DecodeArgs;

#[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub decode: DecodeOptions,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("bininfo");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from file, or defaults if it doesn't exist
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(_) => Ok(Config::default()),
        }
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(config_path, contents)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        Ok(())
    }

    /// Decoder options with command-line overrides applied
    pub fn decode_options(&self, args: &DecodeArgs) -> DecodeOptions {
        let mut options = self.decode.clone();
        if let Some(max) = args.max_records {
            options.max_records = max;
        }
        if let Some(named) = args.named_address_blocks {
            options.named_address_blocks = named;
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.decode.max_records = 64;
        config.decode.named_address_blocks = true;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[decode]\nnamed_address_blocks = true\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert!(config.decode.named_address_blocks);
        assert_eq!(config.decode.max_records, bininfo::DEFAULT_MAX_RECORDS);
    }

    #[test]
    fn test_overrides() {
        let config = Config::default();
        let args = DecodeArgs {
            max_records: Some(5),
            named_address_blocks: None,
        };
        let options = config.decode_options(&args);
        assert_eq!(options.max_records, 5);
        assert!(!options.named_address_blocks);
    }
}
