//! Memento CLI — the main entry point.
//!
//! Commands:
//! - `setup`    — Create (or resolve) the memory resource
//! - `chat`     — Interactive chat or single-message mode
//! - `recall`   — Query stored memories directly
//! - `status`   — Show configuration and store health
//! - `teardown` — Delete the memory resource and its records

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "memento",
    about = "Memento — conversational memory for LLM agents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the memory resource (idempotent) and print its id
    Setup,

    /// Chat with the memory-backed coordinator
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Query stored memories directly (debugging aid)
    Recall {
        /// Free-text query
        query: String,

        /// Namespace to search (defaults to every known specialist namespace)
        #[arg(short, long)]
        namespace: Option<String>,

        /// Maximum records to return (defaults to the configured top_k)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Wait the configured consolidation interval before querying,
        /// so a just-finished chat's memories have time to land
        #[arg(short, long)]
        wait: bool,
    },

    /// Show configuration and store health
    Status,

    /// Delete the memory resource and everything under it
    Teardown {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Setup => commands::setup::run().await?,
        Commands::Chat { message } => commands::chat::run(message).await?,
        Commands::Recall {
            query,
            namespace,
            limit,
            wait,
        } => commands::recall::run(&query, namespace.as_deref(), limit, wait).await?,
        Commands::Status => commands::status::run().await?,
        Commands::Teardown { yes } => commands::teardown::run(yes).await?,
    }

    Ok(())
}
