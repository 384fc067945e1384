//! Response provider implementations for parley.
//!
//! - [`StubResponseProvider`]: fixed placeholder reply, no network
//! - [`WebhookResponseProvider`]: JSON over HTTP to a configured endpoint

pub mod stub_provider;
pub mod webhook_provider;

pub use stub_provider::StubResponseProvider;
pub use webhook_provider::{WebhookResponseProvider, extract_reply};

use parley_core::config::{ProviderConfig, ProviderKind};
use parley_core::error::Result;
use parley_core::provider::ResponseProvider;
use std::sync::Arc;

/// Creates the provider selected by `config.kind`.
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn ResponseProvider>> {
    match config.kind {
        ProviderKind::Stub => {
            tracing::info!("Using placeholder response provider");
            Ok(Arc::new(StubResponseProvider::new(
                config.placeholder_reply.clone(),
            )))
        }
        ProviderKind::Webhook => {
            let provider = WebhookResponseProvider::from_config(config)?;
            tracing::info!(url = %provider.url(), "Using webhook response provider");
            Ok(Arc::new(provider))
        }
    }
}
