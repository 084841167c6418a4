//! Core data types for the Fabula text adventure engine.
//!
//! This crate provides the types shared by every other Fabula crate: the
//! conversation transcript, the scene record, the observable game state,
//! driver requests and the layered configuration.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod output;
mod request;
mod role;
mod scene;
mod state;
mod turn;

pub use config::{
    ApiConfig, FabulaConfig, IllustrationConfig, RetryConfig, SessionConfig, StoryConfig,
};
pub use output::Output;
pub use request::{
    GenerateRequest, GenerateRequestBuilder, GenerateResponse, ImageRequest, ImageRequestBuilder,
};
pub use role::Role;
pub use scene::{MAX_CHOICES, Scene};
pub use state::{GameState, GameStatus};
pub use turn::Turn;
