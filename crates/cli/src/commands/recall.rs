//! `memento recall` — Query stored memories directly.

use memento_config::AppConfig;
use memento_core::identity::{ActorId, Namespace};

pub async fn run(
    query: &str,
    namespace: Option<&str>,
    limit: Option<usize>,
    wait: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let limit = limit.unwrap_or(config.memory.top_k);

    if wait {
        let secs = config.memory.consolidation_wait_secs;
        println!("Waiting {secs}s for consolidation...");
        tokio::time::sleep(std::time::Duration::from_secs(secs)).await;
    }

    let store = super::build_store(&config).await?;
    let resource = super::find_resource(store.as_ref(), &config)
        .await?
        .ok_or("No memory resource found. Run `memento setup` first.")?;

    let namespaces = match namespace {
        Some(path) => vec![Namespace::new(path)?],
        None => vec![
            Namespace::for_actor(&ActorId::new(super::FLIGHT_ACTOR)),
            Namespace::for_actor(&ActorId::new(super::HOTEL_ACTOR)),
        ],
    };

    println!("Searching memories for: \"{query}\"");
    println!();

    let mut total = 0;
    for ns in &namespaces {
        let records = store.retrieve(&resource.id, ns, query, limit).await?;
        if records.is_empty() {
            continue;
        }
        println!("  {}", ns.as_str());
        for (i, record) in records.iter().enumerate() {
            let preview: String = record.content.replace('\n', " ").chars().take(100).collect();
            println!("  {:>2}. [score: {:.2}] {preview}", i + 1, record.score);
        }
        println!();
        total += records.len();
    }

    if total == 0 {
        println!("  No memories found.");
        println!("  (Consolidation runs out-of-band; recent saves may not be visible yet.)");
    }

    Ok(())
}
