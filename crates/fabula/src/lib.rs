//! Fabula - AI-narrated text adventures
//!
//! A player supplies a theme; Gemini writes each scene and offers up to four
//! choices; Imagen illustrates the scene. Whatever the story model returns,
//! however malformed, is turned into a playable scene.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fabula::{FabulaConfig, GameController, GeminiClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FabulaConfig::load()?;
//!     let client = Arc::new(GeminiClient::new(std::env::var("GEMINI_API_KEY")?, &config)?);
//!     let game = GameController::new(client.clone(), client, &config);
//!
//!     game.start_game("a haunted lighthouse").await;
//!     println!("{:?}", game.state());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Fabula is organized as a workspace with focused crates:
//!
//! - `fabula_error` - Error types
//! - `fabula_core` - Scene, game state, transcript and configuration types
//! - `fabula_interface` - `StoryDriver` and `ImageDriver` traits
//! - `fabula_models` - Gemini and Imagen client
//! - `fabula_narrative` - Normalizer, session, illustrations and controller
//!
//! This crate (`fabula`) re-exports everything for convenience and ships the
//! `fabula` terminal binary.

pub use fabula_core::*;
pub use fabula_error::*;
pub use fabula_interface::*;
pub use fabula_models::*;
pub use fabula_narrative::*;

pub mod observability;
