//! Unified path management for parley files.
//!
//! All configuration, stored history and logs are resolved through
//! [`ParleyPaths`] so every component agrees on the layout across platforms
//! (Linux, macOS, Windows).

use parley_core::error::ParleyError;
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_DIR: &str = "parley";

/// Errors that can occur during path resolution.
#[derive(Error, Debug)]
pub enum PathError {
    #[error("Cannot determine the platform {0} directory")]
    DirNotFound(&'static str),
}

impl From<PathError> for ParleyError {
    fn from(e: PathError) -> Self {
        ParleyError::config(e.to_string())
    }
}

/// Resolved parley directories.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/parley/            # Config directory
/// └── config.toml              # Application configuration
///
/// ~/.local/share/parley/       # Data directory
/// ├── storage/                 # Key-value store (chat history)
/// └── logs/                    # Application logs
///     └── parley.log.YYYY-MM-DD
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParleyPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl ParleyPaths {
    /// Resolves the platform config and data directories (`dirs` crate).
    pub fn resolve() -> Result<Self, PathError> {
        let config_dir = dirs::config_dir().ok_or(PathError::DirNotFound("config"))?;
        let data_dir = dirs::data_dir().ok_or(PathError::DirNotFound("data"))?;
        Ok(Self {
            config_dir: config_dir.join(APP_DIR),
            data_dir: data_dir.join(APP_DIR),
        })
    }

    /// Places everything under `base`. Used by tests and portable installs.
    pub fn with_base(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            config_dir: base.join("config"),
            data_dir: base.join("data"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path to `config.toml`.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Directory of the file-backed key-value store.
    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir.join("storage")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    /// Creates the config, storage and log directories if missing.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(self.storage_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}
