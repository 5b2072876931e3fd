use crate::error::ConfigError;
use directories::ProjectDirs;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Roots every directory below it when set. Used by tests and portable installs.
pub const DIR_OVERRIDE_ENV: &str = "NOBLE_JOURNAL_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirKind {
    Config,
    Data,
    Logs,
}

impl DirKind {
    fn name(self) -> &'static str {
        match self {
            DirKind::Config => "config",
            DirKind::Data => "data",
            DirKind::Logs => "logs",
        }
    }
}

pub struct AppPaths;

impl AppPaths {
    fn proj_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "nql", "noble_journal")
    }

    fn resolve(kind: DirKind) -> Result<PathBuf, ConfigError> {
        if let Ok(root) = env::var(DIR_OVERRIDE_ENV) {
            return Ok(PathBuf::from(root).join(kind.name()));
        }
        let proj = Self::proj_dirs().ok_or(ConfigError::NoDirectory(kind.name()))?;
        Ok(match kind {
            DirKind::Config => proj.config_dir().to_path_buf(),
            DirKind::Data => proj.data_dir().to_path_buf(),
            DirKind::Logs => proj.data_local_dir().join("logs"),
        })
    }

    fn ensure_exists(path: PathBuf) -> Result<PathBuf, ConfigError> {
        if !path.exists() {
            fs::create_dir_all(&path).map_err(|source| ConfigError::Io {
                path: path.display().to_string(),
                source,
            })?;
        }
        Ok(path)
    }

    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        Self::ensure_exists(Self::resolve(DirKind::Config)?)
    }

    pub fn data_dir() -> Result<PathBuf, ConfigError> {
        Self::ensure_exists(Self::resolve(DirKind::Data)?)
    }

    pub fn log_dir() -> Result<PathBuf, ConfigError> {
        Self::ensure_exists(Self::resolve(DirKind::Logs)?)
    }

    pub fn config_file() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}
