//! `memento chat` — Interactive or single-message chat mode.
//!
//! Wires the coordinator to two built-in specialists (flights and
//! hotels) with disjoint memory namespaces, the smallest arrangement
//! that exercises delegation and per-specialist recall.

use std::io::Write as _;

use memento_agent::{Coordinator, Specialist, SpecialistConfig};
use memento_config::AppConfig;
use memento_core::identity::{ActorId, SessionId};

pub async fn run(message: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for API key early, give a clear error
    if config.api_key.is_none() && config.provider != "ollama" {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    export OPENROUTER_API_KEY='sk-or-v1-...'   (recommended)");
        eprintln!("    export OPENAI_API_KEY='sk-...'             (for OpenAI direct)");
        eprintln!("    export MEMENTO_API_KEY='sk-...'            (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!(
            "    {}",
            AppConfig::config_dir().join("config.toml").display()
        );
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let store = super::build_store(&config).await?;
    let resource = super::find_resource(store.as_ref(), &config)
        .await?
        .ok_or("No memory resource found. Run `memento setup` first.")?;

    let provider = super::build_provider(&config)?;
    let session = SessionId::generate();

    let flight = Specialist::new(
        SpecialistConfig {
            name: "flight_assistant".into(),
            description: "Handles flight searches, bookings, changes, and seating preferences"
                .into(),
            system_prompt: concat!(
                "You are a flight booking assistant. Help the user search for, ",
                "book, and modify flights. Remember and honor their stated ",
                "airline and seating preferences.",
            )
            .into(),
        },
        provider.clone(),
        &config.model,
        store.clone(),
        &resource.id,
        session.clone(),
    )
    .with_actor(ActorId::new(super::FLIGHT_ACTOR))
    .with_temperature(config.temperature)
    .with_max_tokens(config.max_tokens)
    .with_top_k(config.memory.top_k);

    let hotel = Specialist::new(
        SpecialistConfig {
            name: "hotel_assistant".into(),
            description: "Handles hotel searches, reservations, and room preferences".into(),
            system_prompt: concat!(
                "You are a hotel booking assistant. Help the user find and ",
                "reserve hotels. Remember and honor their stated room and ",
                "amenity preferences.",
            )
            .into(),
        },
        provider.clone(),
        &config.model,
        store.clone(),
        &resource.id,
        session.clone(),
    )
    .with_actor(ActorId::new(super::HOTEL_ACTOR))
    .with_temperature(config.temperature)
    .with_max_tokens(config.max_tokens)
    .with_top_k(config.memory.top_k);

    let coordinator = Coordinator::new(provider, &config.model)
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens)
        .with_specialist(flight)?
        .with_specialist(hotel)?;

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let response = coordinator.handle(&msg).await?;
        eprint!("\r              \r");
        println!("{response}");
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  Memento — Interactive Mode");
    println!("  --------------------------");
    println!("  Provider:    {}", config.provider);
    println!("  Model:       {}", config.model);
    println!("  Store:       {}", store.name());
    println!("  Specialists: flight_assistant, hotel_assistant");
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let stdin = std::io::stdin();
    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        eprint!("  ...");
        match coordinator.handle(input).await {
            Ok(response) => {
                eprint!("\r     \r");
                println!();
                for line in response.lines() {
                    println!("  Assistant > {line}");
                }
                println!();
            }
            Err(e) => {
                eprint!("\r     \r");
                eprintln!("  [Error] {e}");
                println!();
            }
        }
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}
