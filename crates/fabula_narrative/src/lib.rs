//! Adventure engine for Fabula.
//!
//! This crate turns raw model output into a playable adventure:
//!
//! - **Normalizer**: recovers a `{description, choices}` scene from whatever
//!   text the language model returned, falling back to fixed scenes instead
//!   of failing
//! - **Session**: owns the transcript and sequences opening and
//!   continuation prompts
//! - **Illustrations**: fetches a scene image, or derives a deterministic
//!   placeholder when the image model requires billing
//! - **Controller**: the surface front-ends drive, publishing [`GameState`]
//!   snapshots on a watch channel
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fabula_core::FabulaConfig;
//! use fabula_models::GeminiClient;
//! use fabula_narrative::GameController;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FabulaConfig::load()?;
//! let client = Arc::new(GeminiClient::new("api-key", &config)?);
//! let game = GameController::new(client.clone(), client, &config);
//!
//! game.start_game("a haunted lighthouse").await;
//! if let Some(scene) = game.state().scene() {
//!     println!("{}", scene.description());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`GameState`]: fabula_core::GameState

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod controller;
mod illustration;
mod normalizer;
mod prompt;
mod session;

pub use controller::GameController;
pub use illustration::{
    IllustrationResolver, SceneFlavor, data_reference, placeholder_ref, scene_flavor,
    scene_keywords, scene_seed,
};
pub use normalizer::{
    FALLBACK_CHOICES, FALLBACK_DESCRIPTION, NormalizedScene, RAW_TEXT_CHOICES, SceneSource,
    normalize_reply,
};
pub use prompt::{FORMAT_INSTRUCTIONS, continuation_prompt, opening_prompt, with_format_instructions};
pub use session::ConversationSession;
