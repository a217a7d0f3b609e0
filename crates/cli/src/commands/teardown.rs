//! `memento teardown` — Delete the memory resource and its records.

use memento_config::AppConfig;

pub async fn run(yes: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !yes {
        println!(
            "This will permanently delete the '{}' resource and every memory under it.",
            config.memory.resource_name
        );
        println!("Run with --yes to proceed:");
        println!("  memento teardown --yes");
        return Ok(());
    }

    let store = super::build_store(&config).await?;
    match super::find_resource(store.as_ref(), &config).await? {
        Some(resource) => {
            memento_store::teardown(store.as_ref(), &resource.id)
                .await
                .map_err(|e| format!("Teardown failed: {e}"))?;
            println!(
                "Deleted resource '{}' (id: {})",
                resource.name, resource.id
            );
        }
        None => {
            println!(
                "No resource named '{}' found, nothing to delete.",
                config.memory.resource_name
            );
        }
    }

    Ok(())
}
