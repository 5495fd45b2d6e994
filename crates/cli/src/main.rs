//! newsdesk CLI — the main entry point.
//!
//! Commands:
//! - `serve`   — Start the HTTP gateway
//! - `ask`     — One-shot question against the configured services
//! - `doctor`  — Offline self-check of the dialogue pipeline

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "newsdesk",
    about = "newsdesk — retrieval-augmented tech-news chat",
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
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a single question and print the answer
    Ask {
        /// The question to ask
        question: String,

        /// Persona for the one-shot session ("technical" or "non-technical")
        #[arg(short = 'P', long)]
        persona: Option<String>,
    },

    /// Run the offline pipeline self-check
    Doctor,
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
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Ask { question, persona } => commands::ask::run(&question, persona).await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
