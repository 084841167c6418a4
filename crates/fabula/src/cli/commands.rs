//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fabula - AI-narrated text adventures
#[derive(Parser, Debug)]
#[command(name = "fabula")]
#[command(about = "AI-narrated text adventures driven by Gemini and Imagen", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play an adventure in the terminal
    Play {
        /// Adventure theme; asked for interactively when omitted
        #[arg(long)]
        theme: Option<String>,
    },

    /// Recover a scene from a saved raw model reply and print it as JSON
    Normalize {
        /// File holding the raw reply text
        file: PathBuf,
    },

    /// Print the placeholder illustration a description would get
    Placeholder {
        /// Scene description
        description: String,
    },
}
