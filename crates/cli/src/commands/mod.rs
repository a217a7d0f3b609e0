//! CLI subcommands and the shared wiring they build on.

pub mod chat;
pub mod recall;
pub mod setup;
pub mod status;
pub mod teardown;

use std::sync::Arc;

use memento_config::AppConfig;
use memento_core::provider::Provider;
use memento_core::store::{MemoryResource, MemoryStore};
use memento_providers::OpenAiCompatProvider;
use memento_store::{HttpStore, InMemoryStore, SqliteStore};

/// Stable actor ids for the built-in specialists, so their memories
/// survive across CLI runs.
pub(crate) const FLIGHT_ACTOR: &str = "flight-assistant";
pub(crate) const HOTEL_ACTOR: &str = "hotel-assistant";

/// Build the configured memory store backend.
pub(crate) async fn build_store(
    config: &AppConfig,
) -> Result<Arc<dyn MemoryStore>, Box<dyn std::error::Error>> {
    match config.store.backend.as_str() {
        "memory" => Ok(Arc::new(InMemoryStore::new())),
        "sqlite" => {
            let path = config.sqlite_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let store = SqliteStore::open(&path.to_string_lossy()).await?;
            Ok(Arc::new(store))
        }
        "http" => {
            let url = config
                .store
                .http_url
                .as_deref()
                .ok_or("store.http_url is not set (or MEMENTO_STORE_URL)")?;
            let api_key = config.store.http_api_key.clone().unwrap_or_default();
            Ok(Arc::new(HttpStore::new(url, api_key)?))
        }
        other => Err(format!("unknown store backend '{other}'").into()),
    }
}

/// Build the configured LLM provider.
pub(crate) fn build_provider(
    config: &AppConfig,
) -> Result<Arc<dyn Provider>, Box<dyn std::error::Error>> {
    let provider = match config.provider.as_str() {
        "ollama" => OpenAiCompatProvider::ollama(None)?,
        "openai" => OpenAiCompatProvider::openai(require_api_key(config)?)?,
        _ => OpenAiCompatProvider::openrouter(require_api_key(config)?)?,
    };
    Ok(Arc::new(provider))
}

fn require_api_key(config: &AppConfig) -> Result<String, Box<dyn std::error::Error>> {
    config
        .api_key
        .clone()
        .ok_or_else(|| "No API key configured".into())
}

/// Resolve the configured memory resource by name, if it exists.
pub(crate) async fn find_resource(
    store: &dyn MemoryStore,
    config: &AppConfig,
) -> Result<Option<MemoryResource>, Box<dyn std::error::Error>> {
    let resources = store.list_resources().await?;
    Ok(resources
        .into_iter()
        .find(|r| r.name == config.memory.resource_name))
}
