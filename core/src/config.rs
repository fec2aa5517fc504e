use crate::copy::DEFAULT_CHUNK_SIZE;
use crate::{Error, Result};
use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Everything dirpack reads from `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub archive: ArchiveConfig,
    pub backup: BackupConfig,
}

/// Settings for the archive engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Bytes moved per read/write when copying payloads.
    pub chunk_size: usize,
    /// Remove whatever already occupies the extraction root before decoding.
    pub overwrite_existing: bool,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overwrite_existing: true,
        }
    }
}

/// Settings for the gzip backup utility.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    pub home_dir: PathBuf,
    pub backup_dir: PathBuf,
    /// Gzip level, 0 (store) to 9 (best).
    pub compression_level: u32,
}

impl Default for BackupConfig {
    fn default() -> Self {
        let home_dir = BaseDirs::new()
            .map(|dirs| dirs.home_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        Self::with_home(home_dir)
    }
}

impl BackupConfig {
    /// Backups go to `<home>/.backup`.
    pub fn with_home(home_dir: impl Into<PathBuf>) -> Self {
        let home_dir = home_dir.into();
        Self {
            backup_dir: home_dir.join(".backup"),
            home_dir,
            compression_level: 6,
        }
    }
}

impl Config {
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self> {
        let config: Config = toml::from_str(text).map_err(|e| Error::Config {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate(origin)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml(&text, path)
    }

    /// Loads `path` if given, else the per-user config file when present,
    /// else the defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dirpack").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn validate(&self, origin: &Path) -> Result<()> {
        if self.archive.chunk_size == 0 {
            return Err(Error::Config {
                path: origin.to_path_buf(),
                reason: "archive.chunk_size must be at least 1".to_string(),
            });
        }
        if self.backup.compression_level > 9 {
            return Err(Error::Config {
                path: origin.to_path_buf(),
                reason: format!(
                    "backup.compression_level must be 0-9, got {}",
                    self.backup.compression_level
                ),
            });
        }
        Ok(())
    }
}
