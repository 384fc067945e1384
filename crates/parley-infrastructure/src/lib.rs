//! Infrastructure adapters for parley: durable storage, the versioned
//! history schema, configuration files and platform paths.

pub mod config_service;
pub mod dto;
pub mod history_repository;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::history_repository::{HISTORY_KEY, KeyValueHistoryRepository};
pub use crate::paths::ParleyPaths;
pub use crate::storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
