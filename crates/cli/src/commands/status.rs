//! `memento status` — Show configuration and store health.

use memento_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("Memento Status");
    println!("==============");
    println!("  Config dir:  {}", AppConfig::config_dir().display());
    println!("  Provider:    {}", config.provider);
    println!("  Model:       {}", config.model);
    println!("  Temperature: {}", config.temperature);
    println!("  Store:       {}", config.store.backend);
    if config.store.backend == "sqlite" {
        println!("  DB path:     {}", config.sqlite_path().display());
    }
    if let Some(url) = &config.store.http_url {
        println!("  Store URL:   {url}");
    }
    println!("  Resource:    {}", config.memory.resource_name);
    println!("  Recall k:    {}", config.memory.top_k);
    println!(
        "  API key:     {}",
        if config.api_key.is_some() {
            "configured"
        } else {
            "missing"
        }
    );

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  Config file found");
    } else {
        println!("\n  No config file, defaults in effect");
    }

    // Reachability: a store that can't list resources can't do anything else
    match super::build_store(&config).await {
        Ok(store) => match super::find_resource(store.as_ref(), &config).await {
            Ok(Some(resource)) => {
                println!("  Store reachable, resource present (id: {})", resource.id);
            }
            Ok(None) => {
                println!("  Store reachable, resource missing. Run `memento setup`.");
            }
            Err(e) => {
                println!("  Store unreachable: {e}");
            }
        },
        Err(e) => {
            println!("  Store init failed: {e}");
        }
    }

    Ok(())
}
