//! `memento setup` — Create (or resolve) the memory resource.

use memento_config::AppConfig;
use memento_core::store::ResourceSpec;
use memento_store::ensure_resource;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = super::build_store(&config).await?;

    println!("Memento — Memory Setup");
    println!("======================\n");
    println!("  Store:    {}", store.name());
    println!("  Resource: {}", config.memory.resource_name);

    let spec = ResourceSpec {
        name: config.memory.resource_name.clone(),
        strategies: config.memory.strategies.clone(),
        event_retention_days: config.memory.event_retention_days,
    };

    // The one fatal error class: without a resource nothing else works.
    let resource = ensure_resource(store.as_ref(), spec)
        .await
        .map_err(|e| format!("Resource setup failed: {e}"))?;

    println!("\n  Resource id: {}", resource.id);
    println!("  Strategies:  {:?}", resource.strategies);
    println!("\nSetup complete. Run `memento chat` to start a conversation.");

    Ok(())
}
