//! # Tertulia CLI (`tertulia`)
//!
//! Starts the HTTP service and offers a few offline helpers.
//!
//! ## Usage
//!
//! ```bash
//! tertulia --config ./config/tertulia.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tertulia serve` | Start the HTTP server |
//! | `tertulia personas` | List the built-in personas |
//! | `tertulia prompt <id>` | Print a persona's system prompt |
//! | `tertulia rag <url>` | Run the RAG pipeline once and print the answer |
//!
//! Logs go to stderr and honour `RUST_LOG` (default `info,tertulia=debug`).

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tertulia::config::load_config;
use tertulia::rag::answer_from_page;
use tertulia::server::run_server;
use tertulia::services::Services;
use tertulia_core::persona::PersonaRegistry;
use tertulia_core::validate::parse_web_url;

/// Tertulia: news commentary from a panel of personas.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/tertulia.example.toml` for a full example.
#[derive(Parser)]
#[command(name = "tertulia", version, about)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, global = true, default_value = "./config/tertulia.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server on `[server].bind`.
    Serve,

    /// List the built-in personas.
    Personas,

    /// Print the system prompt of a persona.
    Prompt {
        /// Persona id (`lucia`, `mateo`, `mariana`).
        id: String,
    },

    /// Answer the configured question about a web page.
    Rag {
        /// Absolute URL of the page.
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tertulia=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Commands that don't require config
    match &cli.command {
        Commands::Personas => {
            for persona in PersonaRegistry::builtin().all() {
                println!(
                    "{:<8} {:<8} {}",
                    persona.id, persona.display_name, persona.descriptor
                );
            }
            return Ok(());
        }
        Commands::Prompt { id } => {
            let persona = PersonaRegistry::builtin().lookup(id)?;
            println!("{}", persona.system_prompt);
            return Ok(());
        }
        _ => {}
    }

    let cfg = load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => run_server(&cfg).await?,
        Commands::Rag { url } => {
            let url = parse_web_url(&url)?;
            let services = Services::from_config(&cfg)?;
            let answer = answer_from_page(&cfg, &services, &url).await?;
            println!("{}", answer);
        }
        Commands::Personas | Commands::Prompt { .. } => {}
    }

    Ok(())
}
