//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the fabula binary.

mod commands;
mod play;
mod tools;

pub use commands::{Cli, Commands};
pub use play::play;
pub use tools::{normalize_file, print_placeholder};
