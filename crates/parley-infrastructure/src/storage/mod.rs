//! Storage layer for atomic file operations and key-value persistence.

mod atomic_file;
mod key_value;

pub use atomic_file::{AtomicFile, AtomicFileError, FileFormat, FileLock};
pub use key_value::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
