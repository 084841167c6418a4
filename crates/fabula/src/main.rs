//! Fabula CLI binary.
//!
//! This binary provides command-line access to Fabula:
//! - Play an adventure in the terminal
//! - Normalize a saved model reply
//! - Derive placeholder illustrations

use clap::Parser;
use fabula::FabulaConfig;
use fabula::observability::{ObservabilityConfig, init_observability_with_config};

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, normalize_file, play, print_placeholder};

    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut observability = ObservabilityConfig::new().with_json_logs(cli.json_logs);
    if cli.verbose {
        observability = observability.with_log_level("debug");
    }
    init_observability_with_config(observability)?;

    let config = FabulaConfig::load()?;

    match cli.command {
        Commands::Play { theme } => {
            play(&config, theme).await?;
        }

        Commands::Normalize { file } => {
            normalize_file(&file)?;
        }

        Commands::Placeholder { description } => {
            print_placeholder(&config, &description)?;
        }
    }

    Ok(())
}
