//! Configuration service implementation.
//!
//! Loads the root configuration from `config.toml` (creating it with defaults
//! when missing) and then applies environment overrides. Priority is
//! file first, environment last.

use crate::paths::ParleyPaths;
use crate::storage::AtomicFile;
use parley_core::config::{ProviderKind, RootConfig};
use parley_core::error::Result;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Overrides `provider.webhook_url` and selects the webhook provider.
pub const ENV_WEBHOOK_URL: &str = "PARLEY_WEBHOOK_URL";
/// Overrides `provider.auth_token`.
pub const ENV_WEBHOOK_TOKEN: &str = "PARLEY_WEBHOOK_TOKEN";

/// Configuration service that loads and caches the root configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration, filled on first access.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Creates a service for the config file in `paths`.
    ///
    /// Nothing is read until the first call to [`get_config`](Self::get_config).
    pub fn new(paths: &ParleyPaths) -> Self {
        Self::with_path(paths.config_file())
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the root configuration, loading from file if not cached.
    ///
    /// A config file that cannot be read or parsed is logged and replaced by
    /// defaults for this run; the file itself is left untouched.
    pub fn get_config(&self) -> RootConfig {
        if let Some(cached) = self.read_cache() {
            return cached;
        }

        let loaded = match self.load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    self.path.display(),
                    e
                );
                apply_env_overrides(RootConfig::default(), |key| std::env::var(key).ok())
            }
        };

        let mut cache = self.config.write().unwrap_or_else(|e| e.into_inner());
        *cache = Some(loaded.clone());
        loaded
    }

    /// Reads the file, writing defaults first if it does not exist, and
    /// applies environment overrides.
    pub fn load(&self) -> Result<RootConfig> {
        let file = AtomicFile::toml(self.path.clone());

        let config = match file.load::<RootConfig>()? {
            Some(config) => config,
            None => {
                let defaults = RootConfig::default();
                file.save(&defaults)?;
                tracing::info!("Created default config at {}", self.path.display());
                defaults
            }
        };

        Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
    }

    fn read_cache(&self) -> Option<RootConfig> {
        self.config
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// Applies environment overrides on top of a file-loaded configuration.
///
/// `lookup` abstracts `std::env::var` so the rules can be tested without
/// touching the process environment. Blank values are ignored.
pub fn apply_env_overrides<F>(mut config: RootConfig, lookup: F) -> RootConfig
where
    F: Fn(&str) -> Option<String>,
{
    let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_blank(ENV_WEBHOOK_URL) {
        tracing::debug!("Webhook URL taken from {}", ENV_WEBHOOK_URL);
        config.provider.webhook_url = Some(url);
        config.provider.kind = ProviderKind::Webhook;
    }
    if let Some(token) = non_blank(ENV_WEBHOOK_TOKEN) {
        config.provider.auth_token = Some(token);
    }

    config
}
