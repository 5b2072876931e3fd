// Handles configuration loading, saving, and defaults.
use crate::error::ConfigError;
use crate::paths::AppPaths;
use crate::query::SortKey;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Where the key-value files live. Defaults to the platform data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Initial journal ordering.
    #[serde(default)]
    pub default_sort: SortKey,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: None,
            log_level: default_log_level(),
            default_sort: SortKey::default(),
        }
    }
}

impl Config {
    /// A missing file is not an error: it yields `None`.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Some(config))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(self)?;
        let tmp_path = path.with_extension("tmp");
        let io_err = |source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        };
        fs::write(&tmp_path, toml_str).map_err(io_err)?;
        fs::rename(&tmp_path, path).map_err(io_err)?;
        Ok(())
    }

    /// Loads `path`, writing the defaults there first if the file is absent.
    pub fn load_or_init(path: &Path) -> Result<Self, ConfigError> {
        match Self::load_from(path)? {
            Some(config) => Ok(config),
            None => {
                let config = Config::default();
                config.save_to(path)?;
                Ok(config)
            }
        }
    }

    /// Loads the config from the platform location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_or_init(&AppPaths::config_file()?)
    }

    pub fn resolved_data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => AppPaths::data_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_initialized_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_or_init(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
        assert_eq!(Config::load_from(&path).unwrap(), Some(Config::default()));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "default_sort = \"title-alphabetical\"\n").unwrap();

        let config = Config::load_or_init(&path).unwrap();
        assert_eq!(config.default_sort, SortKey::TitleAlphabetical);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.data_dir, None);
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "log_level = [").unwrap();
        assert!(matches!(
            Config::load_or_init(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
