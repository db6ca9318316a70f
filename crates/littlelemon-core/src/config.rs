//! Application configuration management.
//!
//! Configuration is stored at `~/.config/littlelemon/config.json` and only
//! carries overrides; every field falls back to a built-in default. Data
//! (database, images, key-value file) lives under the platform data
//! directory, e.g. `~/.local/share/littlelemon/`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::DEFAULT_MENU_URL;
use crate::assets::localizer::DEFAULT_IMAGE_BASE_URL;
use crate::cache::DEFAULT_SEARCH_DEBOUNCE_MS;

/// Application name used for config/data directory paths
const APP_NAME: &str = "littlelemon";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DATABASE_FILE: &str = "little_lemon.db";
const KEY_VALUE_FILE: &str = "storage.json";
const ASSETS_DIR: &str = "images";

/// Environment overrides, applied after the config file.
const MENU_URL_ENV: &str = "LITTLELEMON_MENU_URL";
const DATA_DIR_ENV: &str = "LITTLELEMON_DATA_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub menu_url: Option<String>,
    pub image_base_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub search_debounce_ms: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(MENU_URL_ENV) {
            self.menu_url = Some(url);
        }
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn menu_url(&self) -> &str {
        self.menu_url.as_deref().unwrap_or(DEFAULT_MENU_URL)
    }

    pub fn image_base_url(&self) -> &str {
        self.image_base_url.as_deref().unwrap_or(DEFAULT_IMAGE_BASE_URL)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms.unwrap_or(DEFAULT_SEARCH_DEBOUNCE_MS))
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(DATABASE_FILE))
    }

    pub fn key_value_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(KEY_VALUE_FILE))
    }

    pub fn assets_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(ASSETS_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.menu_url(), DEFAULT_MENU_URL);
        assert_eq!(config.image_base_url(), DEFAULT_IMAGE_BASE_URL);
        assert_eq!(config.search_debounce(), Duration::from_millis(500));
    }

    #[test]
    fn test_paths_follow_data_dir() {
        let config = Config {
            data_dir: Some(PathBuf::from("/var/lib/littlelemon")),
            ..Default::default()
        };
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/var/lib/littlelemon/little_lemon.db")
        );
        assert_eq!(
            config.key_value_path().unwrap(),
            PathBuf::from("/var/lib/littlelemon/storage.json")
        );
        assert_eq!(
            config.assets_dir().unwrap(),
            PathBuf::from("/var/lib/littlelemon/images")
        );
    }

    #[test]
    fn test_partial_config_file() {
        let config: Config = serde_json::from_str(r#"{"search_debounce_ms": 250}"#).unwrap();
        assert_eq!(config.search_debounce(), Duration::from_millis(250));
        assert!(config.menu_url.is_none());
    }
}
