//! Atomic file operations with ACID guarantees.
//!
//! Provides a thin layer for safe concurrent access to small TOML and JSON
//! files: the config file and the per-key files of the key-value store.

use parley_core::error::ParleyError;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during atomic file operations.
#[derive(Error, Debug)]
pub enum AtomicFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<AtomicFileError> for ParleyError {
    fn from(e: AtomicFileError) -> Self {
        match e {
            AtomicFileError::Io(io) => ParleyError::from(io),
            AtomicFileError::TomlDe(de) => ParleyError::from(de),
            AtomicFileError::TomlSer(ser) => ParleyError::from(ser),
            AtomicFileError::Json(json) => ParleyError::from(json),
            AtomicFileError::Lock(message) => ParleyError::data_access(message),
        }
    }
}

/// On-disk encoding of a typed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Json,
}

impl FileFormat {
    fn encode<T: Serialize>(self, data: &T) -> Result<String, AtomicFileError> {
        Ok(match self {
            FileFormat::Toml => toml::to_string_pretty(data)?,
            FileFormat::Json => serde_json::to_string_pretty(data)?,
        })
    }

    fn decode<T: DeserializeOwned>(self, content: &str) -> Result<T, AtomicFileError> {
        Ok(match self {
            FileFormat::Toml => toml::from_str(content)?,
            FileFormat::Json => serde_json::from_str(content)?,
        })
    }
}

/// A handle to a file that is only ever replaced whole.
///
/// Provides:
/// - **Atomicity**: Updates are all-or-nothing via tmp file + atomic rename
/// - **Isolation**: Writers can serialize on an exclusive [`FileLock`]
/// - **Durability**: Explicit fsync before rename
#[derive(Debug, Clone)]
pub struct AtomicFile {
    path: PathBuf,
    format: FileFormat,
}

impl AtomicFile {
    /// Creates a handle; nothing is touched on disk until the first write.
    pub fn new(path: PathBuf, format: FileFormat) -> Self {
        Self { path, format }
    }

    pub fn toml(path: PathBuf) -> Self {
        Self::new(path, FileFormat::Toml)
    }

    pub fn json(path: PathBuf) -> Self {
        Self::new(path, FileFormat::Json)
    }

    /// Reads the raw file content.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(String))`: File exists and is not blank
    /// - `Ok(None)`: File doesn't exist or is blank
    /// - `Err`: Failed to read the file
    pub fn read_text(&self) -> Result<Option<String>, AtomicFileError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(content))
    }

    /// Replaces the file content atomically.
    pub fn write_text(&self, content: &str) -> Result<(), AtomicFileError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write to temporary file in the same directory
        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(content.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Loads and deserializes the file. Missing or blank files yield `None`.
    pub fn load<T: DeserializeOwned>(&self) -> Result<Option<T>, AtomicFileError> {
        match self.read_text()? {
            Some(content) => Ok(Some(self.format.decode(&content)?)),
            None => Ok(None),
        }
    }

    /// Serializes `data` and saves it atomically.
    pub fn save<T: Serialize>(&self, data: &T) -> Result<(), AtomicFileError> {
        let content = self.format.encode(data)?;
        self.write_text(&content)
    }

    /// Acquires an exclusive lock tied to this file.
    ///
    /// The lock is released when the returned guard is dropped. The
    /// `.lock` file itself stays on disk so every process locks the same
    /// inode.
    pub fn lock(&self) -> Result<FileLock, AtomicFileError> {
        FileLock::acquire(&self.path)
    }

    fn temp_path(&self) -> Result<PathBuf, AtomicFileError> {
        let parent = self.path.parent().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            )
        })?;

        let file_name = self.path.file_name().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "Path has no file name")
        })?;

        let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
        Ok(parent.join(tmp_name))
    }
}

/// A file lock guard that automatically releases the lock when dropped.
pub struct FileLock {
    #[allow(dead_code)]
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicFileError> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| AtomicFileError::Lock(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { file })
    }
}
